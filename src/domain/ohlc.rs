//! Daily OHLC bar representation and raw-row loading.

use crate::domain::date::parse_date;
use crate::domain::error::FeatError;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl OhlcBar {
    /// high - low
    pub fn day_range(&self) -> f64 {
        self.high - self.low
    }

    /// high >= max(open, close, low) and low <= min(open, close, high)
    pub fn is_consistent(&self) -> bool {
        self.high >= self.open.max(self.close).max(self.low)
            && self.low <= self.open.min(self.close).min(self.high)
    }

    /// All four prices strictly above zero.
    pub fn has_positive_prices(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| *p > 0.0)
    }
}

/// One unparsed input row as read from the source file.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    /// 1-based line number in the source file, header included.
    pub line: usize,
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
}

#[derive(Debug)]
pub struct LoadReport {
    pub bars: Vec<OhlcBar>,
    pub original_rows: usize,
    pub cleaned_rows: usize,
    /// Non-fatal problems (duplicate dates).
    pub warnings: Vec<FeatError>,
    /// Kept bars with a zero or negative price.
    pub non_positive_rows: usize,
}

/// Validate and clean raw rows into date-ordered bars.
///
/// Rows with a blank field are dropped. A non-numeric price or an unparsable
/// date aborts the load. Repeated dates keep the first row and are reported
/// as warnings. Bars with a zero or negative price are kept and logged.
pub fn load_bars(rows: Vec<RawRow>) -> Result<LoadReport, FeatError> {
    let original_rows = rows.len();
    let mut parsed = Vec::with_capacity(rows.len());

    for row in rows {
        let fields = [&row.date, &row.open, &row.high, &row.low, &row.close];
        if fields.iter().any(|f| f.trim().is_empty()) {
            debug!(line = row.line, "dropping row with missing field");
            continue;
        }

        let date = parse_date(&row.date)?;
        let bar = OhlcBar {
            date,
            open: parse_price(&row.open, "Open", row.line)?,
            high: parse_price(&row.high, "High", row.line)?,
            low: parse_price(&row.low, "Low", row.line)?,
            close: parse_price(&row.close, "Close", row.line)?,
        };
        parsed.push((row.line, bar));
    }

    parsed.sort_by_key(|(_, bar)| bar.date);

    let mut seen = HashSet::with_capacity(parsed.len());
    let mut bars = Vec::with_capacity(parsed.len());
    let mut warnings = Vec::new();
    let mut non_positive_rows = 0;

    for (line, bar) in parsed {
        if !seen.insert(bar.date) {
            let dup = FeatError::DuplicateDate {
                date: bar.date,
                line,
            };
            warn!("{dup}");
            warnings.push(dup);
            continue;
        }
        if !bar.is_consistent() {
            warn!(line, date = %bar.date, "bar high/low do not bracket open/close");
        }
        if !bar.has_positive_prices() {
            warn!(line, date = %bar.date, "bar has a zero or negative price");
            non_positive_rows += 1;
        }
        bars.push(bar);
    }

    let cleaned_rows = bars.len();
    Ok(LoadReport {
        bars,
        original_rows,
        cleaned_rows,
        warnings,
        non_positive_rows,
    })
}

fn parse_price(value: &str, field: &str, line: usize) -> Result<f64, FeatError> {
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FeatError::MalformedRow {
            line,
            field: field.to_string(),
            value: trimmed.to_string(),
        }),
    }
}
