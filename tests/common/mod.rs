#![allow(dead_code)]

use chrono::NaiveDate;
use futfeat::domain::column::{MaType, Retracement};
use futfeat::domain::counter_trend::CounterTrendSweep;
use futfeat::domain::error::FeatError;
use futfeat::domain::normalize::ZScales;
pub use futfeat::domain::ohlc::{OhlcBar, RawRow};
use futfeat::domain::pipeline::PipelineConfig;
use futfeat::domain::trend::TrendSweep;
use futfeat::ports::data_port::BarSource;
use std::io::Write;
use std::path::Path;

/// In-memory bar source returning canned rows.
pub struct MockBarSource {
    pub rows: Vec<RawRow>,
}

impl MockBarSource {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn with_row(mut self, date: &str, open: &str, high: &str, low: &str, close: &str) -> Self {
        let line = self.rows.len() + 2;
        self.rows.push(RawRow {
            line,
            date: date.to_string(),
            open: open.to_string(),
            high: high.to_string(),
            low: low.to_string(),
            close: close.to_string(),
        });
        self
    }
}

impl BarSource for MockBarSource {
    fn read_rows(&self) -> Result<Vec<RawRow>, FeatError> {
        Ok(self.rows.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> OhlcBar {
    OhlcBar {
        date,
        open,
        high,
        low,
        close,
    }
}

/// Oscillating consistent bars on consecutive days starting 2022-01-03.
pub fn generate_bars(count: usize, start_price: f64) -> Vec<OhlcBar> {
    let start = date(2022, 1, 3);
    (0..count)
        .map(|i| {
            let x = i as f64;
            let close = start_price + 0.2 * x + 4.0 * (x / 5.0).sin() + 1.5 * (x * 1.7).cos();
            let open = close - 0.8 * (x * 0.9).sin();
            OhlcBar {
                date: start + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0 + 0.5 * (x * 0.3).cos().abs(),
                low: open.min(close) - 1.0 - 0.5 * (x * 0.7).sin().abs(),
                close,
            }
        })
        .collect()
}

/// A sweep small enough that 60 bars leave rows after warm-up trimming.
pub fn small_config() -> PipelineConfig {
    PipelineConfig {
        past_periods: vec![1, 3],
        future_periods: vec![],
        ma_windows: vec![3, 6],
        vol_windows: vec![5],
        range_windows: vec![3],
        ema_smoothing: 2.0,
        z_scales: ZScales {
            short: 3,
            medium: 5,
            long: 8,
        },
        trend: TrendSweep {
            windows: vec![3, 6, 10],
            ma_types: vec![MaType::Sma, MaType::Ema],
        },
        counter_trend: CounterTrendSweep {
            periods: vec![3, 5],
            retracements: vec![
                Retracement::from_hundredths(60),
                Retracement::from_hundredths(100),
            ],
        },
    }
}

pub const SMALL_INI: &str = r#"
[returns]
past_periods = 1,3

[moving]
ma_windows = 3,6
vol_windows = 5
range_windows = 3

[normalize]
scales = 3,5,8

[trend]
windows = 3,6,10
ma_types = SMA,EMA

[counter_trend]
periods = 3,5
retracements = 0.6,1.0
"#;

/// Input CSV in M/D/YYYY form, as the raw data files carry it.
pub fn bars_to_csv(bars: &[OhlcBar]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            b.date.format("%-m/%-d/%Y"),
            b.open,
            b.high,
            b.low,
            b.close
        ));
    }
    out
}

pub fn write_file(path: &Path, content: &str) {
    let mut file = std::fs::File::create(path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
}
