//! Moving-average crossover trend-following strategies.
//!
//! For each (fast, slow, MA type) the position is +1 while the fast average is
//! above the slow one and -1 otherwise, decided on yesterday's values. The
//! strategy return is that position times today's close-to-close return.

use crate::domain::column::{ColumnKey, MaType};
use crate::domain::error::FeatError;
use crate::domain::indicator::{Series, ema, shift, sma};
use crate::domain::returns::end_of_day_return;
use crate::domain::table::SeriesTable;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct TrendSweep {
    pub windows: Vec<usize>,
    pub ma_types: Vec<MaType>,
}

impl Default for TrendSweep {
    fn default() -> Self {
        Self {
            windows: vec![10, 30, 60, 100, 150, 260],
            ma_types: vec![MaType::Sma, MaType::Ema],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendCombo {
    pub ma: MaType,
    pub fast: usize,
    pub slow: usize,
}

impl TrendCombo {
    pub fn signal_key(&self) -> ColumnKey {
        ColumnKey::Signal {
            ma: self.ma,
            fast: self.fast,
            slow: self.slow,
        }
    }

    pub fn return_key(&self) -> ColumnKey {
        ColumnKey::StrategyReturn {
            ma: self.ma,
            fast: self.fast,
            slow: self.slow,
        }
    }
}

impl TrendSweep {
    /// Every (fast, slow) pair with fast < slow, for each MA type.
    pub fn combos(&self) -> Vec<TrendCombo> {
        let mut windows = self.windows.clone();
        windows.sort_unstable();
        windows.dedup();

        let mut combos = Vec::new();
        for &ma in &self.ma_types {
            for (i, &fast) in windows.iter().enumerate() {
                for &slow in &windows[i + 1..] {
                    combos.push(TrendCombo { ma, fast, slow });
                }
            }
        }
        combos
    }
}

pub fn moving_average(series: &[Option<f64>], ma: MaType, window: usize, smoothing: f64) -> Series {
    match ma {
        MaType::Sma => sma(series, window),
        MaType::Ema => ema(series, window, smoothing),
    }
}

/// +1 if fast > slow else -1, lagged one bar. Missing while either average is.
pub fn crossover_signal(fast: &[Option<f64>], slow: &[Option<f64>]) -> Series {
    let raw: Series = fast
        .iter()
        .zip(slow)
        .map(|(f, s)| match (*f, *s) {
            (Some(f), Some(s)) => Some(if f > s { 1.0 } else { -1.0 }),
            _ => None,
        })
        .collect();
    shift(&raw, 1)
}

/// signal[t] * return[t]
pub fn strategy_return(signal: &[Option<f64>], eod_return: &[Option<f64>]) -> Series {
    signal
        .iter()
        .zip(eod_return)
        .map(|(s, r)| Some((*s)? * (*r)?))
        .collect()
}

/// Ensure the moving average column exists, computing it from Close if absent.
pub fn ensure_moving_average(
    table: &mut SeriesTable,
    ma: MaType,
    window: usize,
    smoothing: f64,
) -> Result<ColumnKey, FeatError> {
    let key = ColumnKey::moving_average(ma, window);
    table.get_or_insert_with(key.clone(), |t| {
        Ok(moving_average(
            &t.column(&ColumnKey::Close)?,
            ma,
            window,
            smoothing,
        ))
    })?;
    Ok(key)
}

/// Add a signal and a return column per combination. Returns the number of
/// strategies generated.
pub fn generate(
    table: &mut SeriesTable,
    sweep: &TrendSweep,
    smoothing: f64,
) -> Result<usize, FeatError> {
    table.get_or_insert_with(ColumnKey::EodReturn, |t| {
        Ok(end_of_day_return(&t.column(&ColumnKey::Close)?))
    })?;

    let combos = sweep.combos();
    for combo in &combos {
        let fast_key = ensure_moving_average(table, combo.ma, combo.fast, smoothing)?;
        let slow_key = ensure_moving_average(table, combo.ma, combo.slow, smoothing)?;

        let signal = crossover_signal(&table.column(&fast_key)?, &table.column(&slow_key)?);
        let returns = strategy_return(&signal, &table.column(&ColumnKey::EodReturn)?);

        table.add_column(combo.signal_key(), signal)?;
        table.add_column(combo.return_key(), returns)?;
    }

    debug!(strategies = combos.len(), "trend-following sweep complete");
    Ok(combos.len())
}
