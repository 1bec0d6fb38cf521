//! CSV file adapters: raw bar input and feature table output.

use crate::domain::column::ColumnKey;
use crate::domain::date::{format_date, parse_date};
use crate::domain::error::FeatError;
use crate::domain::indicator::Series;
use crate::domain::ohlc::{OhlcBar, RawRow};
use crate::domain::table::SeriesTable;
use crate::ports::data_port::BarSource;
use crate::ports::table_port::TableSink;
use csv::StringRecord;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

const PRICE_HEADERS: [&str; 4] = ["Open", "High", "Low", "Close"];

/// Reads `Date,Open,High,Low,Close` rows. Header names match case-insensitively,
/// in any order; extra columns are ignored.
pub struct CsvBarReader {
    path: PathBuf,
}

impl CsvBarReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BarSource for CsvBarReader {
    fn read_rows(&self) -> Result<Vec<RawRow>, FeatError> {
        let mut rdr = open_reader(&self.path)?;
        let headers = rdr.headers()?.clone();

        let date_idx = header_index(&headers, "Date", &self.path)?;
        let mut price_idx = [0usize; 4];
        for (slot, name) in price_idx.iter_mut().zip(PRICE_HEADERS) {
            *slot = header_index(&headers, name, &self.path)?;
        }

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let field = |i: usize| record.get(i).unwrap_or("").to_string();
            rows.push(RawRow {
                line: record_line(&record),
                date: field(date_idx),
                open: field(price_idx[0]),
                high: field(price_idx[1]),
                low: field(price_idx[2]),
                close: field(price_idx[3]),
            });
        }

        debug!(path = %self.path.display(), rows = rows.len(), "read input rows");
        Ok(rows)
    }
}

/// Writes the feature table: `Date` as YYYY/MM/DD, the four price columns,
/// then derived columns in creation order. Missing values are empty cells.
pub struct CsvTableWriter {
    path: PathBuf,
}

impl CsvTableWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CsvTableWriter {
    /// Sibling file the table is staged in before the rename.
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_records(path: &Path, table: &SeriesTable) -> Result<usize, FeatError> {
        let mut wtr = csv::Writer::from_path(path).map_err(|e| FeatError::Csv {
            reason: format!("failed to create {}: {}", path.display(), e),
        })?;

        let mut header = vec!["Date".to_string()];
        header.extend(ColumnKey::BASE.iter().map(|k| k.to_string()));
        header.extend(table.keys().iter().map(|k| k.to_string()));
        wtr.write_record(&header)?;

        let derived = table
            .keys()
            .iter()
            .map(|k| table.column(k))
            .collect::<Result<Vec<_>, _>>()?;

        for (i, bar) in table.bars().iter().enumerate() {
            let mut record = Vec::with_capacity(header.len());
            record.push(format_date(bar.date));
            for price in [bar.open, bar.high, bar.low, bar.close] {
                record.push(price.to_string());
            }
            for col in &derived {
                record.push(col[i].map(|v| v.to_string()).unwrap_or_default());
            }
            wtr.write_record(&record)?;
        }

        let file = wtr.into_inner().map_err(|e| FeatError::Csv {
            reason: format!("failed to flush {}: {}", path.display(), e.error()),
        })?;
        file.sync_all()?;
        Ok(header.len())
    }
}

impl TableSink for CsvTableWriter {
    /// The table is written to a staging file and renamed into place, so a
    /// failed write never leaves a truncated table at the output path.
    fn write_table(&self, table: &SeriesTable) -> Result<(), FeatError> {
        let staging = self.staging_path();
        let written = Self::write_records(&staging, table).and_then(|columns| {
            std::fs::rename(&staging, &self.path)?;
            Ok(columns)
        });
        let columns = match written {
            Ok(columns) => columns,
            Err(e) => {
                let _ = std::fs::remove_file(&staging);
                return Err(e);
            }
        };

        debug!(
            path = %self.path.display(),
            rows = table.len(),
            columns,
            "wrote feature table"
        );
        Ok(())
    }
}

/// Read a feature table previously written by [`CsvTableWriter`].
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<SeriesTable, FeatError> {
    let path = path.as_ref();
    let mut rdr = open_reader(path)?;
    let headers = rdr.headers()?.clone();

    let date_idx = header_index(&headers, "Date", path)?;
    let mut price_idx = [0usize; 4];
    for (slot, name) in price_idx.iter_mut().zip(PRICE_HEADERS) {
        *slot = header_index(&headers, name, path)?;
    }

    let mut derived: Vec<(usize, ColumnKey)> = Vec::new();
    for (i, name) in headers.iter().enumerate() {
        if i == date_idx || price_idx.contains(&i) {
            continue;
        }
        derived.push((i, name.parse()?));
    }

    let mut bars = Vec::new();
    let mut values: Vec<Series> = vec![Vec::new(); derived.len()];
    for result in rdr.records() {
        let record = result?;
        let line = record_line(&record);
        let cell = |i: usize| record.get(i).unwrap_or("").trim();

        let mut prices = [0.0; 4];
        for ((slot, &idx), name) in prices.iter_mut().zip(&price_idx).zip(PRICE_HEADERS) {
            *slot = parse_cell(cell(idx), line, name)?.ok_or_else(|| FeatError::MalformedRow {
                line,
                field: name.to_string(),
                value: String::new(),
            })?;
        }
        bars.push(OhlcBar {
            date: parse_date(cell(date_idx))?,
            open: prices[0],
            high: prices[1],
            low: prices[2],
            close: prices[3],
        });

        for ((idx, key), column) in derived.iter().zip(values.iter_mut()) {
            column.push(parse_cell(cell(*idx), line, &key.to_string())?);
        }
    }

    let mut table = SeriesTable::new(bars);
    for ((_, key), column) in derived.into_iter().zip(values) {
        table.add_column(key, column)?;
    }
    Ok(table)
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>, FeatError> {
    let file = File::open(path).map_err(|e| FeatError::Csv {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;
    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn header_index(headers: &StringRecord, name: &str, path: &Path) -> Result<usize, FeatError> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
        .ok_or_else(|| FeatError::Csv {
            reason: format!("{}: missing required column {}", path.display(), name),
        })
}

fn record_line(record: &StringRecord) -> usize {
    record.position().map(|p| p.line() as usize).unwrap_or(0)
}

fn parse_cell(raw: &str, line: usize, field: &str) -> Result<Option<f64>, FeatError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| FeatError::MalformedRow {
            line,
            field: field.to_string(),
            value: raw.to_string(),
        })
}
