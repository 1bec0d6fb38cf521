//! Date-ordered series table: the bars plus every derived column.

use crate::domain::column::ColumnKey;
use crate::domain::error::FeatError;
use crate::domain::indicator::{Series, rolling_apply};
use crate::domain::ohlc::OhlcBar;
use chrono::NaiveDate;
use std::borrow::Cow;
use std::collections::HashMap;

/// Daily bars with derived columns aligned 1:1 by position.
///
/// Derived columns keep their insertion order, which is also the output order.
/// Raw price columns (`Open`, `High`, `Low`, `Close`) read straight from the
/// bars and cannot be replaced, dropped or renamed.
#[derive(Debug, Clone, Default)]
pub struct SeriesTable {
    bars: Vec<OhlcBar>,
    order: Vec<ColumnKey>,
    columns: HashMap<ColumnKey, Series>,
    date_index: HashMap<NaiveDate, usize>,
}

impl SeriesTable {
    pub fn new(bars: Vec<OhlcBar>) -> Self {
        let date_index = index_dates(&bars);
        Self {
            bars,
            order: Vec::new(),
            columns: HashMap::new(),
            date_index,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[OhlcBar] {
        &self.bars
    }

    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.date_index.get(&date).copied()
    }

    /// Derived column keys in creation order.
    pub fn keys(&self) -> &[ColumnKey] {
        &self.order
    }

    pub fn contains(&self, key: &ColumnKey) -> bool {
        key.is_base() || self.columns.contains_key(key)
    }

    pub fn column(&self, key: &ColumnKey) -> Result<Cow<'_, [Option<f64>]>, FeatError> {
        match key {
            ColumnKey::Open => Ok(Cow::Owned(self.prices(|b| b.open))),
            ColumnKey::High => Ok(Cow::Owned(self.prices(|b| b.high))),
            ColumnKey::Low => Ok(Cow::Owned(self.prices(|b| b.low))),
            ColumnKey::Close => Ok(Cow::Owned(self.prices(|b| b.close))),
            _ => self
                .columns
                .get(key)
                .map(|v| Cow::Borrowed(v.as_slice()))
                .ok_or_else(|| unknown(key)),
        }
    }

    fn prices(&self, field: fn(&OhlcBar) -> f64) -> Series {
        self.bars.iter().map(|b| Some(field(b))).collect()
    }

    /// Insert or replace a derived column. Replacing keeps its position.
    pub fn add_column(&mut self, key: ColumnKey, values: Series) -> Result<(), FeatError> {
        if key.is_base() {
            return Err(read_only(&key));
        }
        if values.len() != self.len() {
            return Err(FeatError::LengthMismatch {
                column: key.to_string(),
                expected: self.len(),
                actual: values.len(),
            });
        }
        if !self.columns.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.columns.insert(key, values);
        Ok(())
    }

    /// Compute and insert `key` only when it is not present yet.
    /// Returns whether the column was computed.
    pub fn get_or_insert_with<F>(&mut self, key: ColumnKey, build: F) -> Result<bool, FeatError>
    where
        F: FnOnce(&Self) -> Result<Series, FeatError>,
    {
        if self.contains(&key) {
            return Ok(false);
        }
        let values = build(self)?;
        self.add_column(key, values)?;
        Ok(true)
    }

    pub fn drop_column(&mut self, key: &ColumnKey) -> Result<Series, FeatError> {
        if key.is_base() {
            return Err(read_only(key));
        }
        let values = self.columns.remove(key).ok_or_else(|| unknown(key))?;
        self.order.retain(|k| k != key);
        Ok(values)
    }

    /// Rename a derived column in place. An existing column named `to` is replaced.
    pub fn rename_column(&mut self, from: &ColumnKey, to: ColumnKey) -> Result<(), FeatError> {
        if from.is_base() {
            return Err(read_only(from));
        }
        if to.is_base() {
            return Err(read_only(&to));
        }
        if *from == to {
            return if self.columns.contains_key(from) {
                Ok(())
            } else {
                Err(unknown(from))
            };
        }
        let values = self.columns.remove(from).ok_or_else(|| unknown(from))?;
        if self.columns.remove(&to).is_some() {
            self.order.retain(|k| *k != to);
        }
        if let Some(slot) = self.order.iter_mut().find(|k| **k == *from) {
            *slot = to.clone();
        }
        self.columns.insert(to, values);
        Ok(())
    }

    /// Apply `f` over trailing windows of any column.
    pub fn rolling<F>(&self, key: &ColumnKey, window: usize, f: F) -> Result<Series, FeatError>
    where
        F: Fn(&[f64]) -> Option<f64>,
    {
        Ok(rolling_apply(&self.column(key)?, window, f))
    }

    /// Longest run of leading missing values across derived columns; the rows
    /// that lack history for at least one feature.
    pub fn warmup_rows(&self) -> usize {
        self.columns
            .values()
            .map(|col| col.iter().take_while(|v| v.is_none()).count())
            .max()
            .unwrap_or(0)
    }

    /// Drop the first `n` rows from the bars and every column.
    pub fn trim_leading(&mut self, n: usize) {
        let n = n.min(self.len());
        self.bars.drain(..n);
        for col in self.columns.values_mut() {
            col.drain(..n);
        }
        self.date_index = index_dates(&self.bars);
    }
}

fn index_dates(bars: &[OhlcBar]) -> HashMap<NaiveDate, usize> {
    bars.iter().enumerate().map(|(i, b)| (b.date, i)).collect()
}

fn unknown(key: &ColumnKey) -> FeatError {
    FeatError::UnknownColumn {
        name: key.to_string(),
    }
}

fn read_only(key: &ColumnKey) -> FeatError {
    FeatError::ReadOnlyColumn {
        name: key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bars(closes: &[f64]) -> Vec<OhlcBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcBar {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
            })
            .collect()
    }

    fn table() -> SeriesTable {
        SeriesTable::new(make_bars(&[10.0, 20.0, 30.0, 40.0]))
    }

    #[test]
    fn base_columns_read_from_bars() {
        let t = table();
        let close = t.column(&ColumnKey::Close).unwrap();
        assert_eq!(&*close, &[Some(10.0), Some(20.0), Some(30.0), Some(40.0)]);
        let high = t.column(&ColumnKey::High).unwrap();
        assert_eq!(high[0], Some(11.0));
    }

    #[test]
    fn add_column_checks_length() {
        let mut t = table();
        let err = t.add_column(ColumnKey::Sma(2), vec![None; 3]).unwrap_err();
        assert!(matches!(
            err,
            FeatError::LengthMismatch {
                expected: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn add_column_overwrite_keeps_position() {
        let mut t = table();
        t.add_column(ColumnKey::Sma(2), vec![None; 4]).unwrap();
        t.add_column(ColumnKey::Ema(2), vec![None; 4]).unwrap();
        t.add_column(ColumnKey::Sma(2), vec![Some(1.0); 4]).unwrap();

        assert_eq!(t.keys(), &[ColumnKey::Sma(2), ColumnKey::Ema(2)]);
        assert_eq!(t.column(&ColumnKey::Sma(2)).unwrap()[0], Some(1.0));
    }

    #[test]
    fn base_columns_are_read_only() {
        let mut t = table();
        assert!(matches!(
            t.add_column(ColumnKey::Close, vec![None; 4]),
            Err(FeatError::ReadOnlyColumn { .. })
        ));
        assert!(t.drop_column(&ColumnKey::Open).is_err());
    }

    #[test]
    fn drop_unknown_column_fails() {
        let mut t = table();
        let err = t.drop_column(&ColumnKey::Sma(5)).unwrap_err();
        assert!(matches!(err, FeatError::UnknownColumn { name } if name == "SMA_5"));
    }

    #[test]
    fn drop_column_removes_from_order() {
        let mut t = table();
        t.add_column(ColumnKey::Sma(2), vec![None; 4]).unwrap();
        t.drop_column(&ColumnKey::Sma(2)).unwrap();
        assert!(t.keys().is_empty());
        assert!(!t.contains(&ColumnKey::Sma(2)));
    }

    #[test]
    fn rename_column_in_place() {
        let mut t = table();
        t.add_column(ColumnKey::Sma(2), vec![Some(1.0); 4]).unwrap();
        t.add_column(ColumnKey::Ema(2), vec![None; 4]).unwrap();
        t.rename_column(&ColumnKey::Sma(2), ColumnKey::Sma(3)).unwrap();

        assert_eq!(t.keys(), &[ColumnKey::Sma(3), ColumnKey::Ema(2)]);
        assert!(t.column(&ColumnKey::Sma(2)).is_err());
        assert!(t.rename_column(&ColumnKey::Sma(9), ColumnKey::Sma(10)).is_err());
    }

    #[test]
    fn get_or_insert_with_memoizes() {
        let mut t = table();
        let first = t
            .get_or_insert_with(ColumnKey::Sma(2), |t| Ok(vec![Some(1.0); t.len()]))
            .unwrap();
        let second = t
            .get_or_insert_with(ColumnKey::Sma(2), |_| panic!("must not recompute"))
            .unwrap();
        assert!(first);
        assert!(!second);
    }

    #[test]
    fn rolling_over_close() {
        let t = table();
        let sums = t
            .rolling(&ColumnKey::Close, 2, |w| Some(w.iter().sum()))
            .unwrap();
        assert_eq!(sums, vec![None, Some(30.0), Some(50.0), Some(70.0)]);
    }

    #[test]
    fn warmup_and_trim() {
        let mut t = table();
        t.add_column(ColumnKey::Sma(2), vec![None, Some(1.0), Some(2.0), Some(3.0)])
            .unwrap();
        t.add_column(ColumnKey::Sma(3), vec![None, None, Some(1.0), Some(2.0)])
            .unwrap();
        assert_eq!(t.warmup_rows(), 2);

        t.trim_leading(2);
        assert_eq!(t.len(), 2);
        assert_eq!(t.column(&ColumnKey::Close).unwrap()[0], Some(30.0));
        assert_eq!(&*t.column(&ColumnKey::Sma(2)).unwrap(), &[Some(2.0), Some(3.0)]);
        assert_eq!(t.position(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()), Some(0));
    }
}
