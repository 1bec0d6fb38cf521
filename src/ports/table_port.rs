//! Output port for the augmented series table.

use crate::domain::error::FeatError;
use crate::domain::table::SeriesTable;

pub trait TableSink {
    fn write_table(&self, table: &SeriesTable) -> Result<(), FeatError>;
}
