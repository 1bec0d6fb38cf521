//! Bar date normalization.
//!
//! Source files carry dates as `M/D/YYYY` or `M-D-YYYY`; the table stores and
//! writes them as `YYYY/MM/DD`. The year-first form is accepted as well so an
//! output file can be read back.

use crate::domain::error::FeatError;
use chrono::NaiveDate;

pub const CANONICAL_FORMAT: &str = "%Y/%m/%d";

/// Normalize a raw date string to `YYYY/MM/DD`.
pub fn normalize_date(raw: &str) -> Result<String, FeatError> {
    parse_date(raw).map(format_date)
}

/// Accepted input forms, month-first and year-first.
const INPUT_FORMATS: [&str; 4] = ["%m/%d/%Y", "%m-%d-%Y", "%Y/%m/%d", "%Y-%m-%d"];

/// Parse a raw date string in any accepted form.
pub fn parse_date(raw: &str) -> Result<NaiveDate, FeatError> {
    let trimmed = raw.trim();
    let unparsable = || FeatError::UnparsableDate {
        value: raw.to_string(),
    };

    // %Y also takes short or signed years; only a four-digit year is valid.
    let has_full_year = trimmed
        .split(['/', '-'])
        .any(|part| part.len() == 4 && part.bytes().all(|b| b.is_ascii_digit()));
    if !has_full_year {
        return Err(unparsable());
    }

    INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(unparsable)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_month_first() {
        assert_eq!(normalize_date("1/2/2020").unwrap(), "2020/01/02");
    }

    #[test]
    fn dash_month_first() {
        assert_eq!(normalize_date("12-31-1999").unwrap(), "1999/12/31");
    }

    #[test]
    fn already_canonical() {
        assert_eq!(normalize_date("2021/07/04").unwrap(), "2021/07/04");
        assert_eq!(normalize_date("2021-7-4").unwrap(), "2021/07/04");
    }

    #[test]
    fn surrounding_whitespace_ignored() {
        assert_eq!(normalize_date(" 3/9/2015 ").unwrap(), "2015/03/09");
    }

    #[test]
    fn mixed_separators_rejected() {
        assert!(matches!(
            normalize_date("1/2-2020"),
            Err(FeatError::UnparsableDate { .. })
        ));
    }

    #[test]
    fn wrong_separator_rejected() {
        assert!(normalize_date("1.2.2020").is_err());
        assert!(normalize_date("20200102").is_err());
    }

    #[test]
    fn impossible_date_rejected() {
        assert!(normalize_date("2/30/2020").is_err());
        assert!(normalize_date("13/1/2020").is_err());
    }

    #[test]
    fn two_digit_year_rejected() {
        assert!(normalize_date("1/2/20").is_err());
        assert!(normalize_date("20/1/2").is_err());
    }

    #[test]
    fn five_digit_year_rejected() {
        assert!(normalize_date("1/2/20200").is_err());
    }

    #[test]
    fn error_keeps_raw_value() {
        match normalize_date("not a date") {
            Err(FeatError::UnparsableDate { value }) => assert_eq!(value, "not a date"),
            other => panic!("expected UnparsableDate, got {:?}", other),
        }
    }
}
