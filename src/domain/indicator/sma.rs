//! Simple Moving Average.
//!
//! SMA(n)[i] = (x[i-n+1] + ... + x[i]) / n
//! Sliding sum, O(n). Warmup: first (n-1) values missing.

use super::Series;

pub fn sma(series: &[Option<f64>], window: usize) -> Series {
    let mut out = vec![None; series.len()];
    if window == 0 {
        return out;
    }

    let mut sum = 0.0;
    let mut missing = 0usize;

    for i in 0..series.len() {
        match series[i] {
            Some(v) => sum += v,
            None => missing += 1,
        }
        if i >= window {
            match series[i - window] {
                Some(v) => sum -= v,
                None => missing -= 1,
            }
        }
        // `sum` only ever holds the present values of the window.
        if missing == 0 && i + 1 >= window {
            out[i] = Some(sum / window as f64);
        }
    }
    out
}
