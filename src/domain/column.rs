//! Strongly typed column identity.
//!
//! Every column of the series table is keyed by a [`ColumnKey`]. The key's
//! `Display` form is the CSV header name and parses back through `FromStr`,
//! so a written table can be read again without a side schema.

use crate::domain::error::FeatError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaType {
    Sma,
    Ema,
}

impl fmt::Display for MaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaType::Sma => write!(f, "SMA"),
            MaType::Ema => write!(f, "EMA"),
        }
    }
}

impl FromStr for MaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SMA" => Ok(MaType::Sma),
            "EMA" => Ok(MaType::Ema),
            other => Err(format!("unknown moving average type {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Long, Direction::Short];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "Long"),
            Direction::Short => write!(f, "Short"),
        }
    }
}

/// Retracement multiple of the average day range, held in hundredths so the
/// key stays `Eq + Hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Retracement(u32);

impl Retracement {
    pub fn from_hundredths(value: u32) -> Self {
        Retracement(value)
    }

    /// Rounds to the nearest hundredth. `None` for non-positive or non-finite input.
    pub fn from_multiple(multiple: f64) -> Option<Self> {
        if !multiple.is_finite() || multiple <= 0.0 {
            return None;
        }
        let hundredths = (multiple * 100.0).round();
        if hundredths < 1.0 || hundredths > u32::MAX as f64 {
            return None;
        }
        Some(Retracement(hundredths as u32))
    }

    pub fn hundredths(self) -> u32 {
        self.0
    }

    pub fn multiple(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Retracement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frac = format!("{:02}", self.0 % 100);
        let frac = frac.trim_end_matches('0');
        let frac = if frac.is_empty() { "0" } else { frac };
        write!(f, "{}.{}", self.0 / 100, frac)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Open,
    High,
    Low,
    Close,
    EodReturn,
    PastReturn(usize),
    FutureReturn(usize),
    Sma(usize),
    Ema(usize),
    Volatility(usize),
    SortinoVolatility(usize),
    AvgRange(usize),
    ZScore {
        source: Box<ColumnKey>,
        window: usize,
    },
    Signal {
        ma: MaType,
        fast: usize,
        slow: usize,
    },
    StrategyReturn {
        ma: MaType,
        fast: usize,
        slow: usize,
    },
    CounterHit {
        direction: Direction,
        period: usize,
        retracement: Retracement,
    },
    CounterReturn {
        direction: Direction,
        period: usize,
        retracement: Retracement,
    },
}

impl ColumnKey {
    pub const BASE: [ColumnKey; 4] = [
        ColumnKey::Open,
        ColumnKey::High,
        ColumnKey::Low,
        ColumnKey::Close,
    ];

    pub fn z_score(source: ColumnKey, window: usize) -> Self {
        ColumnKey::ZScore {
            source: Box::new(source),
            window,
        }
    }

    pub fn moving_average(ma: MaType, window: usize) -> Self {
        match ma {
            MaType::Sma => ColumnKey::Sma(window),
            MaType::Ema => ColumnKey::Ema(window),
        }
    }

    /// Raw OHLC price columns backed by the bars themselves.
    pub fn is_base(&self) -> bool {
        matches!(
            self,
            ColumnKey::Open | ColumnKey::High | ColumnKey::Low | ColumnKey::Close
        )
    }

    /// Return and moving-statistic columns, the inputs of normalization.
    pub fn is_indicator(&self) -> bool {
        matches!(
            self,
            ColumnKey::EodReturn
                | ColumnKey::PastReturn(_)
                | ColumnKey::FutureReturn(_)
                | ColumnKey::Sma(_)
                | ColumnKey::Ema(_)
                | ColumnKey::Volatility(_)
                | ColumnKey::SortinoVolatility(_)
                | ColumnKey::AvgRange(_)
        )
    }

    pub fn is_z_score(&self) -> bool {
        matches!(self, ColumnKey::ZScore { .. })
    }

    pub fn is_strategy_return(&self) -> bool {
        matches!(
            self,
            ColumnKey::StrategyReturn { .. } | ColumnKey::CounterReturn { .. }
        )
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Open => write!(f, "Open"),
            ColumnKey::High => write!(f, "High"),
            ColumnKey::Low => write!(f, "Low"),
            ColumnKey::Close => write!(f, "Close"),
            ColumnKey::EodReturn => write!(f, "EOD_Return"),
            ColumnKey::PastReturn(p) => write!(f, "Past_Return_{}", p),
            ColumnKey::FutureReturn(p) => write!(f, "Future_Return_{}", p),
            ColumnKey::Sma(w) => write!(f, "SMA_{}", w),
            ColumnKey::Ema(w) => write!(f, "EMA_{}", w),
            ColumnKey::Volatility(w) => write!(f, "MV_{}", w),
            ColumnKey::SortinoVolatility(w) => write!(f, "Sortino_MV_{}", w),
            ColumnKey::AvgRange(w) => write!(f, "Avg_Range_{}", w),
            ColumnKey::ZScore { source, window } => write!(f, "Z{}_{}", window, source),
            ColumnKey::Signal { ma, fast, slow } => write!(f, "Signal_{}_{}_{}", ma, fast, slow),
            ColumnKey::StrategyReturn { ma, fast, slow } => {
                write!(f, "Return_{}_{}_{}", ma, fast, slow)
            }
            ColumnKey::CounterHit {
                direction,
                period,
                retracement,
            } => write!(f, "CT_{}_Hit_{}_{}", direction, period, retracement),
            ColumnKey::CounterReturn {
                direction,
                period,
                retracement,
            } => write!(f, "CT_{}_Return_{}_{}", direction, period, retracement),
        }
    }
}

impl FromStr for ColumnKey {
    type Err = FeatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(s).ok_or_else(|| FeatError::UnknownColumn {
            name: s.to_string(),
        })
    }
}

fn parse_key(s: &str) -> Option<ColumnKey> {
    let s = s.trim();
    match s {
        "Open" => return Some(ColumnKey::Open),
        "High" => return Some(ColumnKey::High),
        "Low" => return Some(ColumnKey::Low),
        "Close" => return Some(ColumnKey::Close),
        "EOD_Return" => return Some(ColumnKey::EodReturn),
        _ => {}
    }

    let windowed: [(&str, fn(usize) -> ColumnKey); 7] = [
        ("Past_Return_", ColumnKey::PastReturn),
        ("Future_Return_", ColumnKey::FutureReturn),
        ("SMA_", ColumnKey::Sma),
        ("EMA_", ColumnKey::Ema),
        ("MV_", ColumnKey::Volatility),
        ("Sortino_MV_", ColumnKey::SortinoVolatility),
        ("Avg_Range_", ColumnKey::AvgRange),
    ];
    for (prefix, build) in windowed {
        if let Some(rest) = s.strip_prefix(prefix) {
            return rest.parse().ok().map(build);
        }
    }

    if let Some(rest) = s.strip_prefix("Signal_") {
        let (ma, fast, slow) = parse_crossover(rest)?;
        return Some(ColumnKey::Signal { ma, fast, slow });
    }
    if let Some(rest) = s.strip_prefix("Return_") {
        let (ma, fast, slow) = parse_crossover(rest)?;
        return Some(ColumnKey::StrategyReturn { ma, fast, slow });
    }
    if let Some(rest) = s.strip_prefix("CT_") {
        return parse_counter(rest);
    }
    if let Some(rest) = s.strip_prefix('Z') {
        let (window, source) = rest.split_once('_')?;
        let window = window.parse().ok()?;
        return Some(ColumnKey::z_score(parse_key(source)?, window));
    }
    None
}

fn parse_crossover(rest: &str) -> Option<(MaType, usize, usize)> {
    let mut parts = rest.split('_');
    let ma = parts.next()?.parse().ok()?;
    let fast = parts.next()?.parse().ok()?;
    let slow = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((ma, fast, slow))
}

fn parse_counter(rest: &str) -> Option<ColumnKey> {
    let mut parts = rest.split('_');
    let direction = match parts.next()? {
        "Long" => Direction::Long,
        "Short" => Direction::Short,
        _ => return None,
    };
    let kind = parts.next()?;
    let period = parts.next()?.parse().ok()?;
    let retracement = Retracement::from_multiple(parts.next()?.parse().ok()?)?;
    if parts.next().is_some() {
        return None;
    }
    match kind {
        "Hit" => Some(ColumnKey::CounterHit {
            direction,
            period,
            retracement,
        }),
        "Return" => Some(ColumnKey::CounterReturn {
            direction,
            period,
            retracement,
        }),
        _ => None,
    }
}
