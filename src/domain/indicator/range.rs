//! Average day range.
//!
//! AVG_RANGE(n)[i] = mean(high - low) over bars i-n .. i-1.
//! Shifted one bar so today's value only sees yesterday's close.
//! Warmup: first n values missing.

use super::{Series, shift, sma};

pub fn avg_day_range(high: &[Option<f64>], low: &[Option<f64>], window: usize) -> Series {
    let ranges: Series = high
        .iter()
        .zip(low)
        .map(|(h, l)| Some((*h)? - (*l)?))
        .collect();
    shift(&sma(&ranges, window), 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::to_series;
    use approx::assert_relative_eq;

    #[test]
    fn range_is_lagged_one_bar() {
        let high = to_series(&[105.0, 110.0, 109.0, 120.0]);
        let low = to_series(&[95.0, 100.0, 104.0, 100.0]);
        let out = avg_day_range(&high, &low, 2);

        assert_eq!(&out[..2], &[None, None]);
        // ranges 10, 10, 5: index 2 sees bars 0..=1
        assert_relative_eq!(out[2].unwrap(), 10.0);
        assert_relative_eq!(out[3].unwrap(), 7.5);
    }

    #[test]
    fn range_ignores_todays_bar() {
        let high = to_series(&[105.0, 110.0, 109.0]);
        let low = to_series(&[95.0, 100.0, 104.0]);
        let before = avg_day_range(&high, &low, 2);

        let mut high2 = high.clone();
        high2[2] = Some(500.0);
        let after = avg_day_range(&high2, &low, 2);
        assert_eq!(before[2], after[2]);
    }

    #[test]
    fn range_missing_input() {
        let high = vec![Some(5.0), None, Some(6.0), Some(7.0)];
        let low = to_series(&[4.0, 4.0, 4.0, 4.0]);
        let out = avg_day_range(&high, &low, 1);
        assert_eq!(out, vec![None, Some(1.0), None, Some(2.0)]);
    }
}
