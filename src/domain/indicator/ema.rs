//! Exponential Moving Average.
//!
//! k = smoothing/(n+1), seed with the SMA of the first n defined values, then
//! EMA[i] = EMA[i-1]*(1-k) + x[i]*k. Each value depends on the previous one, so
//! this runs strictly in index order.
//! Warmup: everything before the n-th defined value is missing.

use super::Series;

pub const DEFAULT_SMOOTHING: f64 = 2.0;

pub fn ema(series: &[Option<f64>], window: usize, smoothing: f64) -> Series {
    let mut values = vec![None; series.len()];
    if window == 0 {
        return values;
    }

    let k = smoothing / (window as f64 + 1.0);
    let mut seen = 0usize;
    let mut sum = 0.0;
    let mut prev: Option<f64> = None;

    for (i, x) in series.iter().enumerate() {
        let Some(x) = *x else {
            continue;
        };
        match prev {
            None => {
                seen += 1;
                sum += x;
                if seen == window {
                    let seed = sum / window as f64;
                    prev = Some(seed);
                    values[i] = Some(seed);
                }
            }
            Some(p) => {
                let e = p * (1.0 - k) + x * k;
                prev = Some(e);
                values[i] = Some(e);
            }
        }
    }

    values
}
