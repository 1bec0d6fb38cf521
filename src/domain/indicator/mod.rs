//! Moving statistics over aligned columns.
//!
//! Every function takes a column as `&[Option<f64>]` and returns a column of
//! the same length. `None` marks a position without enough history; a window
//! that contains a missing input yields a missing output.

pub mod ema;
pub mod range;
pub mod sma;
pub mod stddev;

pub use ema::ema;
pub use range::avg_day_range;
pub use sma::sma;
pub use stddev::{downside_volatility, rolling_volatility};

pub type Series = Vec<Option<f64>>;

/// Lift a dense price slice into a column.
pub fn to_series(values: &[f64]) -> Series {
    values.iter().copied().map(Some).collect()
}

/// Apply `f` to each complete trailing window of `window` values.
///
/// The first `window - 1` positions, and any window holding a missing value,
/// are `None`. A zero window yields an all-missing column.
pub fn rolling_apply<F>(series: &[Option<f64>], window: usize, f: F) -> Series
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut out = vec![None; series.len()];
    if window == 0 || series.len() < window {
        return out;
    }

    let mut buf = Vec::with_capacity(window);
    for end in (window - 1)..series.len() {
        buf.clear();
        buf.extend(series[end + 1 - window..=end].iter().map_while(|v| *v));
        if buf.len() == window {
            out[end] = f(&buf);
        }
    }
    out
}

/// Lag a column by `n` bars: `out[t] = series[t - n]`.
pub fn shift(series: &[Option<f64>], n: usize) -> Series {
    let len = series.len();
    let mut out = vec![None; len];
    if n < len {
        out[n..].copy_from_slice(&series[..len - n]);
    }
    out
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (N-1 denominator). `None` below two points.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}
