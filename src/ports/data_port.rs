//! Bar source port trait.

use crate::domain::error::FeatError;
use crate::domain::ohlc::{LoadReport, RawRow, load_bars};

pub trait BarSource {
    /// Raw rows in file order, header excluded.
    fn read_rows(&self) -> Result<Vec<RawRow>, FeatError>;

    /// Read and validate: rows with blank fields dropped, bars date-ordered.
    fn load(&self) -> Result<LoadReport, FeatError> {
        load_bars(self.read_rows()?)
    }
}
