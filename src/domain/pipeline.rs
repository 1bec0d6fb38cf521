//! Feature pipeline: returns, moving statistics, normalization, then the two
//! strategy sweeps, each stage reading only columns produced before it.

use crate::domain::column::{ColumnKey, MaType};
use crate::domain::counter_trend::{self, CounterTrendSweep};
use crate::domain::error::FeatError;
use crate::domain::indicator::ema::DEFAULT_SMOOTHING;
use crate::domain::indicator::{avg_day_range, downside_volatility, rolling_volatility};
use crate::domain::normalize::{ZScales, normalize_table};
use crate::domain::ohlc::OhlcBar;
use crate::domain::returns::{end_of_day_return, future_return, past_return};
use crate::domain::table::SeriesTable;
use crate::domain::trend::{self, TrendSweep, ensure_moving_average};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub past_periods: Vec<usize>,
    /// Forward returns look ahead; empty unless explicitly configured.
    pub future_periods: Vec<usize>,
    pub ma_windows: Vec<usize>,
    pub vol_windows: Vec<usize>,
    pub range_windows: Vec<usize>,
    pub ema_smoothing: f64,
    pub z_scales: ZScales,
    pub trend: TrendSweep,
    pub counter_trend: CounterTrendSweep,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let trend = TrendSweep::default();
        let counter_trend = CounterTrendSweep::default();
        Self {
            past_periods: vec![1, 5, 20],
            future_periods: Vec::new(),
            ma_windows: trend.windows.clone(),
            vol_windows: vec![20, 60],
            range_windows: counter_trend.periods.clone(),
            ema_smoothing: DEFAULT_SMOOTHING,
            z_scales: ZScales::default(),
            trend,
            counter_trend,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCounts {
    pub indicators: usize,
    pub normalized: usize,
    pub trend_strategies: usize,
    pub counter_strategies: usize,
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub table: SeriesTable,
    /// Leading rows dropped for lack of history.
    pub warmup_rows: usize,
    pub counts: StageCounts,
}

pub fn add_return_columns(table: &mut SeriesTable, config: &PipelineConfig) -> Result<(), FeatError> {
    let close = table.column(&ColumnKey::Close)?.into_owned();

    table.get_or_insert_with(ColumnKey::EodReturn, |_| Ok(end_of_day_return(&close)))?;
    for &p in &config.past_periods {
        table.get_or_insert_with(ColumnKey::PastReturn(p), |_| Ok(past_return(&close, p)))?;
    }
    for &p in &config.future_periods {
        table.get_or_insert_with(ColumnKey::FutureReturn(p), |_| Ok(future_return(&close, p)))?;
    }
    Ok(())
}

pub fn add_moving_statistics(
    table: &mut SeriesTable,
    config: &PipelineConfig,
) -> Result<(), FeatError> {
    for &w in &config.ma_windows {
        ensure_moving_average(table, MaType::Sma, w, config.ema_smoothing)?;
        ensure_moving_average(table, MaType::Ema, w, config.ema_smoothing)?;
    }
    // sweep inputs are built here so normalization sees them
    for &w in &config.trend.windows {
        for &ma in &config.trend.ma_types {
            ensure_moving_average(table, ma, w, config.ema_smoothing)?;
        }
    }

    for &w in &config.vol_windows {
        table.get_or_insert_with(ColumnKey::Volatility(w), |t| {
            Ok(rolling_volatility(&t.column(&ColumnKey::EodReturn)?, w))
        })?;
        table.get_or_insert_with(ColumnKey::SortinoVolatility(w), |t| {
            Ok(downside_volatility(&t.column(&ColumnKey::EodReturn)?, w))
        })?;
    }

    for &w in config.range_windows.iter().chain(&config.counter_trend.periods) {
        table.get_or_insert_with(ColumnKey::AvgRange(w), |t| {
            Ok(avg_day_range(
                &t.column(&ColumnKey::High)?,
                &t.column(&ColumnKey::Low)?,
                w,
            ))
        })?;
    }
    Ok(())
}

/// Run every stage on a fresh table. Does not trim warm-up rows.
pub fn build_table(bars: Vec<OhlcBar>, config: &PipelineConfig) -> Result<(SeriesTable, StageCounts), FeatError> {
    let mut table = SeriesTable::new(bars);
    let mut counts = StageCounts::default();

    add_return_columns(&mut table, config)?;
    add_moving_statistics(&mut table, config)?;
    counts.indicators = table.keys().len();

    counts.normalized = normalize_table(&mut table, &config.z_scales)?;
    counts.trend_strategies = trend::generate(&mut table, &config.trend, config.ema_smoothing)?;
    counts.counter_strategies = counter_trend::generate(&mut table, &config.counter_trend)?;

    Ok((table, counts))
}

/// Column keys the pipeline produces for `config`, in output order.
pub fn planned_columns(config: &PipelineConfig) -> Result<Vec<ColumnKey>, FeatError> {
    let (table, _) = build_table(Vec::new(), config)?;
    Ok(table.keys().to_vec())
}

/// Build all features and drop leading rows lacking history for any of them.
pub fn run_pipeline(bars: Vec<OhlcBar>, config: &PipelineConfig) -> Result<PipelineOutput, FeatError> {
    let bar_count = bars.len();
    let (mut table, counts) = build_table(bars, config)?;

    info!(
        indicators = counts.indicators,
        normalized = counts.normalized,
        trend = counts.trend_strategies,
        counter_trend = counts.counter_strategies,
        columns = table.keys().len(),
        "features computed"
    );

    let warmup_rows = table.warmup_rows();
    table.trim_leading(warmup_rows);
    if table.is_empty() && bar_count > 0 {
        warn!(
            bars = bar_count,
            warmup_rows, "no bar has full feature history; output will be empty"
        );
    } else {
        info!(warmup_rows, remaining = table.len(), "dropped warm-up rows");
    }

    Ok(PipelineOutput {
        table,
        warmup_rows,
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            past_periods: vec![1],
            future_periods: vec![],
            ma_windows: vec![2, 4],
            vol_windows: vec![3],
            range_windows: vec![2],
            ema_smoothing: 2.0,
            z_scales: ZScales {
                short: 2,
                medium: 3,
                long: 4,
            },
            trend: TrendSweep {
                windows: vec![2, 4],
                ma_types: vec![MaType::Sma, MaType::Ema],
            },
            counter_trend: CounterTrendSweep {
                periods: vec![2],
                retracements: vec![crate::domain::column::Retracement::from_hundredths(100)],
            },
        }
    }

    fn make_bars(n: usize) -> Vec<OhlcBar> {
        (0..n)
            .map(|i| {
                let c = 100.0 + ((i * 7) % 11) as f64 - (i % 2) as f64 * 3.0;
                OhlcBar {
                    date: NaiveDate::from_ymd_opt(2022, 1, 3).unwrap() + chrono::Duration::days(i as i64),
                    open: c + 0.5,
                    high: c + 2.0,
                    low: c - 2.0,
                    close: c,
                }
            })
            .collect()
    }

    #[test]
    fn default_config_matches_reference_sweep() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.trend.combos().len(), 30);
        assert_eq!(cfg.counter_trend.combos().len(), 36);
        assert!(cfg.future_periods.is_empty());
    }

    #[test]
    fn planned_columns_match_built_columns() {
        let cfg = small_config();
        let planned = planned_columns(&cfg).unwrap();
        let out = run_pipeline(make_bars(40), &cfg).unwrap();
        assert_eq!(planned, out.table.keys());
    }

    #[test]
    fn stage_counts() {
        let cfg = small_config();
        let out = run_pipeline(make_bars(40), &cfg).unwrap();
        // EOD, Past_Return_1, SMA/EMA x2, MV, Sortino_MV, Avg_Range
        assert_eq!(out.counts.indicators, 9);
        assert_eq!(out.counts.normalized, 27);
        assert_eq!(out.counts.trend_strategies, 2);
        assert_eq!(out.counts.counter_strategies, 2);
    }

    #[test]
    fn trimmed_table_has_no_leading_missing() {
        let out = run_pipeline(make_bars(40), &small_config()).unwrap();
        assert!(out.warmup_rows > 0);
        assert_eq!(out.table.len(), 40 - out.warmup_rows);
        assert_eq!(out.table.warmup_rows(), 0);
    }

    #[test]
    fn too_short_history_empties_table() {
        let out = run_pipeline(make_bars(3), &small_config()).unwrap();
        assert!(out.table.is_empty());
    }

    #[test]
    fn future_returns_only_when_configured() {
        let mut cfg = small_config();
        assert!(!planned_columns(&cfg).unwrap().contains(&ColumnKey::FutureReturn(1)));
        cfg.future_periods = vec![1];
        assert!(planned_columns(&cfg).unwrap().contains(&ColumnKey::FutureReturn(1)));
    }

    #[test]
    fn sweep_windows_outside_moving_windows_are_normalized() {
        let mut cfg = small_config();
        cfg.ma_windows = vec![2];
        cfg.range_windows = vec![2];
        cfg.trend.windows = vec![3, 5];
        cfg.trend.ma_types = vec![MaType::Sma];
        cfg.counter_trend.periods = vec![3];

        let (mut table, counts) = build_table(make_bars(40), &cfg).unwrap();
        for source in [ColumnKey::Sma(3), ColumnKey::Sma(5), ColumnKey::AvgRange(3)] {
            assert!(table.contains(&ColumnKey::z_score(source.clone(), 2)), "{source}");
        }
        assert!(!table.contains(&ColumnKey::Ema(3)));
        // EOD, Past_Return_1, SMA/EMA 2, SMA 3, SMA 5, MV, Sortino_MV, Avg_Range x2
        assert_eq!(counts.indicators, 10);
        assert_eq!(normalize_table(&mut table, &cfg.z_scales).unwrap(), 0);
    }
}
