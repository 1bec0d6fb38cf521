//! Core domain types and logic.

pub mod column;
pub mod config_validation;
pub mod counter_trend;
pub mod date;
pub mod error;
pub mod indicator;
pub mod normalize;
pub mod ohlc;
pub mod pipeline;
pub mod returns;
pub mod summary;
pub mod table;
pub mod trend;
