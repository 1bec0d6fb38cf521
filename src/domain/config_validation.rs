//! Pipeline configuration: building from a [`ConfigPort`] and validation.
//!
//! Every key is optional; an absent key keeps the reference value from
//! [`PipelineConfig::default`].

use crate::domain::column::{MaType, Retracement};
use crate::domain::error::FeatError;
use crate::domain::normalize::ZScales;
use crate::domain::pipeline::PipelineConfig;
use crate::ports::config_port::ConfigPort;

pub fn build_pipeline_config(config: &dyn ConfigPort) -> Result<PipelineConfig, FeatError> {
    let mut cfg = PipelineConfig::default();

    if let Some(v) = config.get_usize_list("returns", "past_periods")? {
        cfg.past_periods = v;
    }
    if let Some(v) = config.get_usize_list("returns", "future_periods")? {
        cfg.future_periods = v;
    }
    if let Some(v) = config.get_usize_list("moving", "ma_windows")? {
        cfg.ma_windows = v;
    }
    if let Some(v) = config.get_usize_list("moving", "vol_windows")? {
        cfg.vol_windows = v;
    }
    if let Some(v) = config.get_usize_list("moving", "range_windows")? {
        cfg.range_windows = v;
    }
    if let Some(v) = config.get_double("moving", "ema_smoothing")? {
        cfg.ema_smoothing = v;
    }

    if let Some(v) = config.get_usize_list("normalize", "scales")? {
        cfg.z_scales = parse_scales(&v)?;
    }

    if let Some(v) = config.get_usize_list("trend", "windows")? {
        cfg.trend.windows = v;
    }
    if let Some(names) = config.get_string_list("trend", "ma_types") {
        cfg.trend.ma_types = names
            .iter()
            .map(|n| {
                n.parse::<MaType>()
                    .map_err(|reason| invalid("trend", "ma_types", reason))
            })
            .collect::<Result<Vec<_>, _>>()?;
    }

    if let Some(v) = config.get_usize_list("counter_trend", "periods")? {
        cfg.counter_trend.periods = v;
    }
    if let Some(v) = config.get_double_list("counter_trend", "retracements")? {
        cfg.counter_trend.retracements = v
            .iter()
            .map(|&m| {
                Retracement::from_multiple(m).ok_or_else(|| {
                    invalid(
                        "counter_trend",
                        "retracements",
                        format!("retracement {m} must be a positive multiple"),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
    }

    validate_pipeline_config(&cfg)?;
    Ok(cfg)
}

pub fn validate_pipeline_config(cfg: &PipelineConfig) -> Result<(), FeatError> {
    validate_windows("returns", "past_periods", &cfg.past_periods)?;
    validate_windows("returns", "future_periods", &cfg.future_periods)?;
    validate_windows("moving", "ma_windows", &cfg.ma_windows)?;
    validate_windows("moving", "vol_windows", &cfg.vol_windows)?;
    validate_windows("moving", "range_windows", &cfg.range_windows)?;
    validate_smoothing(cfg.ema_smoothing)?;
    validate_scales(&cfg.z_scales)?;
    validate_trend(cfg)?;
    validate_counter_trend(cfg)?;
    Ok(())
}

fn validate_windows(section: &str, key: &str, windows: &[usize]) -> Result<(), FeatError> {
    if windows.contains(&0) {
        return Err(invalid(section, key, format!("{key} must be positive")));
    }
    Ok(())
}

fn validate_smoothing(value: f64) -> Result<(), FeatError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "moving",
            "ema_smoothing",
            "ema_smoothing must be positive",
        ));
    }
    Ok(())
}

fn parse_scales(values: &[usize]) -> Result<ZScales, FeatError> {
    match values {
        [short, medium, long] => Ok(ZScales {
            short: *short,
            medium: *medium,
            long: *long,
        }),
        _ => Err(invalid(
            "normalize",
            "scales",
            format!("expected exactly three scales, got {}", values.len()),
        )),
    }
}

fn validate_scales(scales: &ZScales) -> Result<(), FeatError> {
    if scales.short == 0 || scales.short >= scales.medium || scales.medium >= scales.long {
        return Err(invalid(
            "normalize",
            "scales",
            "scales must be positive and strictly increasing",
        ));
    }
    Ok(())
}

fn validate_trend(cfg: &PipelineConfig) -> Result<(), FeatError> {
    validate_windows("trend", "windows", &cfg.trend.windows)?;
    let mut distinct = cfg.trend.windows.clone();
    distinct.sort_unstable();
    distinct.dedup();
    if distinct.len() < 2 {
        return Err(invalid(
            "trend",
            "windows",
            "at least two distinct windows are required",
        ));
    }
    if cfg.trend.ma_types.is_empty() {
        return Err(FeatError::ConfigMissing {
            section: "trend".to_string(),
            key: "ma_types".to_string(),
        });
    }
    Ok(())
}

fn validate_counter_trend(cfg: &PipelineConfig) -> Result<(), FeatError> {
    validate_windows("counter_trend", "periods", &cfg.counter_trend.periods)?;
    if cfg.counter_trend.periods.is_empty() {
        return Err(FeatError::ConfigMissing {
            section: "counter_trend".to_string(),
            key: "periods".to_string(),
        });
    }
    if cfg.counter_trend.retracements.is_empty() {
        return Err(FeatError::ConfigMissing {
            section: "counter_trend".to_string(),
            key: "retracements".to_string(),
        });
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> FeatError {
    FeatError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}
