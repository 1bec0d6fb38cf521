//! Historical and forward returns from the Close column.

use crate::domain::indicator::Series;

fn simple_return(to: Option<f64>, from: Option<f64>) -> Option<f64> {
    match (to, from) {
        (Some(to), Some(from)) if from != 0.0 => Some(to / from - 1.0),
        _ => None,
    }
}

/// close[t] / close[t-1] - 1. First value missing.
pub fn end_of_day_return(close: &[Option<f64>]) -> Series {
    (0..close.len())
        .map(|t| {
            if t == 0 {
                None
            } else {
                simple_return(close[t], close[t - 1])
            }
        })
        .collect()
}

/// Return over the `period` bars ending yesterday:
/// close[t-1] / close[t-1-period] - 1. First `period + 1` values missing.
pub fn past_return(close: &[Option<f64>], period: usize) -> Series {
    (0..close.len())
        .map(|t| {
            if period == 0 || t < period + 1 {
                None
            } else {
                simple_return(close[t - 1], close[t - 1 - period])
            }
        })
        .collect()
}

/// Forward return close[t+period] / close[t] - 1. Last `period` values missing.
///
/// Looks ahead by construction; only produced when explicitly configured and
/// never fed to the strategy generators.
pub fn future_return(close: &[Option<f64>], period: usize) -> Series {
    (0..close.len())
        .map(|t| {
            if period == 0 || t + period >= close.len() {
                None
            } else {
                simple_return(close[t + period], close[t])
            }
        })
        .collect()
}
