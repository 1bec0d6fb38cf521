//! Rolling volatility and downside (Sortino) volatility.
//!
//! Both use the sample standard deviation (N-1 denominator) over the trailing
//! n values. Warmup: first (n-1) values missing.

use super::{Series, rolling_apply, sample_std};

pub fn rolling_volatility(series: &[Option<f64>], window: usize) -> Series {
    rolling_apply(series, window, sample_std)
}

/// Standard deviation of the strictly negative values in each window; missing
/// when the window holds fewer than two of them.
pub fn downside_volatility(series: &[Option<f64>], window: usize) -> Series {
    rolling_apply(series, window, |w| {
        let negatives: Vec<f64> = w.iter().copied().filter(|v| *v < 0.0).collect();
        sample_std(&negatives)
    })
}
