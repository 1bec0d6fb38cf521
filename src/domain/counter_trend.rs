//! Range-retracement counter-trend strategies.
//!
//! A long trade is placed as a limit below yesterday's high at a multiple of
//! the average day range; a short trade as a limit above yesterday's low. If
//! today's bar trades through the level the position is filled at the level,
//! or at the open when the market gaps through it, and closed at today's close.

use crate::domain::column::{ColumnKey, Direction, Retracement};
use crate::domain::error::FeatError;
use crate::domain::indicator::{Series, avg_day_range};
use crate::domain::ohlc::OhlcBar;
use crate::domain::table::SeriesTable;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct CounterTrendSweep {
    pub periods: Vec<usize>,
    pub retracements: Vec<Retracement>,
}

impl Default for CounterTrendSweep {
    fn default() -> Self {
        Self {
            periods: vec![10, 20, 30],
            retracements: [60, 100, 140, 180, 220, 260]
                .into_iter()
                .map(Retracement::from_hundredths)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterCombo {
    pub direction: Direction,
    pub period: usize,
    pub retracement: Retracement,
}

impl CounterCombo {
    pub fn hit_key(&self) -> ColumnKey {
        ColumnKey::CounterHit {
            direction: self.direction,
            period: self.period,
            retracement: self.retracement,
        }
    }

    pub fn return_key(&self) -> ColumnKey {
        ColumnKey::CounterReturn {
            direction: self.direction,
            period: self.period,
            retracement: self.retracement,
        }
    }
}

impl CounterTrendSweep {
    pub fn combos(&self) -> Vec<CounterCombo> {
        let mut combos = Vec::new();
        for &period in &self.periods {
            for &retracement in &self.retracements {
                for direction in Direction::BOTH {
                    combos.push(CounterCombo {
                        direction,
                        period,
                        retracement,
                    });
                }
            }
        }
        combos
    }
}

/// Outcome of one bar for one parameter pair and direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterTrade {
    pub hit: bool,
    pub level: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    /// exit / entry - 1 when hit, exactly 0 otherwise.
    pub realized_return: f64,
}

pub fn hit_level(direction: Direction, prev: &OhlcBar, avg_range: f64, retracement: f64) -> f64 {
    match direction {
        Direction::Long => prev.high - avg_range * retracement,
        Direction::Short => prev.low + avg_range * retracement,
    }
}

/// Evaluate today's bar against the level derived from yesterday's bar.
/// `avg_range` must already be lagged (computed through yesterday).
pub fn evaluate(
    direction: Direction,
    prev: &OhlcBar,
    today: &OhlcBar,
    avg_range: f64,
    retracement: f64,
) -> CounterTrade {
    let level = hit_level(direction, prev, avg_range, retracement);
    let (hit, gapped) = match direction {
        Direction::Long => (today.low < level, today.open < level),
        Direction::Short => (today.high > level, today.open > level),
    };
    let entry_price = if gapped { today.open } else { level };
    let exit_price = today.close;
    let realized_return = if hit {
        exit_price / entry_price - 1.0
    } else {
        0.0
    };

    CounterTrade {
        hit,
        level,
        entry_price,
        exit_price,
        realized_return,
    }
}

/// Hit-flag (1.0 / 0.0) and return columns for one direction and multiple.
/// Both are missing on the first bar and wherever the average range is.
pub fn counter_trend_columns(
    bars: &[OhlcBar],
    avg_range: &[Option<f64>],
    direction: Direction,
    retracement: f64,
) -> (Series, Series) {
    let mut hits = vec![None; bars.len()];
    let mut returns = vec![None; bars.len()];

    for t in 1..bars.len() {
        let Some(range) = avg_range[t] else {
            continue;
        };
        let trade = evaluate(direction, &bars[t - 1], &bars[t], range, retracement);
        hits[t] = Some(if trade.hit { 1.0 } else { 0.0 });
        returns[t] = trade.realized_return.is_finite().then_some(trade.realized_return);
    }

    (hits, returns)
}

/// Add hit and return columns for every combination, computing average range
/// columns that are not present yet. Returns the number of strategies.
pub fn generate(table: &mut SeriesTable, sweep: &CounterTrendSweep) -> Result<usize, FeatError> {
    let combos = sweep.combos();

    for combo in &combos {
        let range_key = ColumnKey::AvgRange(combo.period);
        table.get_or_insert_with(range_key.clone(), |t| {
            Ok(avg_day_range(
                &t.column(&ColumnKey::High)?,
                &t.column(&ColumnKey::Low)?,
                combo.period,
            ))
        })?;

        let (hits, returns) = counter_trend_columns(
            table.bars(),
            &table.column(&range_key)?,
            combo.direction,
            combo.retracement.multiple(),
        );
        table.add_column(combo.hit_key(), hits)?;
        table.add_column(combo.return_key(), returns)?;
    }

    debug!(strategies = combos.len(), "counter-trend sweep complete");
    Ok(combos.len())
}
