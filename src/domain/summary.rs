//! Per-strategy summary of the generated return columns.

use crate::domain::column::ColumnKey;
use crate::domain::table::SeriesTable;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategySummary {
    pub column: ColumnKey,
    /// Bars with a defined return.
    pub observations: usize,
    /// Bars with a non-zero return.
    pub active_days: usize,
    pub mean_return: f64,
    /// Sum of daily returns.
    pub total_return: f64,
    /// Share of defined bars flagged as hits; counter-trend columns only.
    pub hit_rate: Option<f64>,
}

impl StrategySummary {
    /// Summaries for every strategy return column, in table order.
    pub fn compute_all(table: &SeriesTable) -> Vec<StrategySummary> {
        table
            .keys()
            .iter()
            .filter(|k| k.is_strategy_return())
            .filter_map(|k| Self::compute(table, k))
            .collect()
    }

    pub fn compute(table: &SeriesTable, key: &ColumnKey) -> Option<StrategySummary> {
        let values = table.column(key).ok()?;
        let defined: Vec<f64> = values.iter().flatten().copied().collect();

        let observations = defined.len();
        let active_days = defined.iter().filter(|r| **r != 0.0).count();
        let total_return: f64 = defined.iter().sum();
        let mean_return = if observations > 0 {
            total_return / observations as f64
        } else {
            0.0
        };

        let hit_rate = match key {
            ColumnKey::CounterReturn {
                direction,
                period,
                retracement,
            } => {
                let hit_key = ColumnKey::CounterHit {
                    direction: *direction,
                    period: *period,
                    retracement: *retracement,
                };
                table.column(&hit_key).ok().and_then(|hits| {
                    let flags: Vec<f64> = hits.iter().flatten().copied().collect();
                    if flags.is_empty() {
                        None
                    } else {
                        Some(flags.iter().sum::<f64>() / flags.len() as f64)
                    }
                })
            }
            _ => None,
        };

        Some(StrategySummary {
            column: key.clone(),
            observations,
            active_days,
            mean_return,
            total_return,
            hit_rate,
        })
    }
}
