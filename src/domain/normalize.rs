//! Rolling z-score normalization of indicator columns.

use crate::domain::column::ColumnKey;
use crate::domain::error::FeatError;
use crate::domain::indicator::{Series, rolling_volatility, shift, sma};
use crate::domain::table::SeriesTable;
use tracing::debug;

/// The three window scales every indicator is normalized at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZScales {
    pub short: usize,
    pub medium: usize,
    pub long: usize,
}

impl Default for ZScales {
    fn default() -> Self {
        Self {
            short: 20,
            medium: 60,
            long: 120,
        }
    }
}

impl ZScales {
    pub fn windows(&self) -> [usize; 3] {
        [self.short, self.medium, self.long]
    }
}

/// z[t] = (x[t] - mean) / std, with mean and sample std taken over the `window`
/// values ending at t-1. A zero or non-finite std gives a missing value.
pub fn z_score(series: &[Option<f64>], window: usize) -> Series {
    let mean = shift(&sma(series, window), 1);
    let std = shift(&rolling_volatility(series, window), 1);

    series
        .iter()
        .zip(mean.iter().zip(&std))
        .map(|(x, (m, s))| match (*x, *m, *s) {
            (Some(x), Some(m), Some(s)) if s > 0.0 && s.is_finite() => Some((x - m) / s),
            _ => None,
        })
        .collect()
}

/// Add z-score columns for every indicator column at each scale.
///
/// Z-score, signal and strategy columns are never inputs, and existing z-score
/// columns are not recomputed, so running this twice leaves the table unchanged.
/// Returns the number of columns added.
pub fn normalize_table(table: &mut SeriesTable, scales: &ZScales) -> Result<usize, FeatError> {
    let sources: Vec<ColumnKey> = table
        .keys()
        .iter()
        .filter(|k| k.is_indicator())
        .cloned()
        .collect();

    let mut added = 0;
    for source in sources {
        for window in scales.windows() {
            let key = ColumnKey::z_score(source.clone(), window);
            let computed = table.get_or_insert_with(key, |t| {
                Ok(z_score(&t.column(&source)?, window))
            })?;
            if computed {
                added += 1;
            }
        }
    }
    debug!(added, "normalized indicator columns");
    Ok(added)
}
