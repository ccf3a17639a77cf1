//! Source-row ingestion: a table's JSON rows converted to typed records.
//!
//! One bad cell aborts only its own row. Failures accumulate across the
//! whole table so an operator sees every broken cell in one pass instead of
//! fixing them one export at a time.

use crate::codec::{Codec, Schema};
use crate::field::Row;

/// One failed row, pinned to human-readable coordinates. Row numbers are
/// 1-based to match how spreadsheets display them.
#[derive(Debug, Clone, serde::Serialize, thiserror::Error)]
#[error("table '{table}' row {row}, column '{column}': {detail}")]
pub struct ColumnConversionError {
    pub table: String,
    pub row: usize,
    pub column: String,
    pub detail: String,
}

/// Outcome of converting one table's rows.
#[derive(Debug, Default)]
pub struct IngestReport<T> {
    pub records: Vec<T>,
    pub errors: Vec<ColumnConversionError>,
}

impl<T> IngestReport<T> {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Convert every row of `table`. Rows that fail conversion are skipped and
/// recorded; the surviving records keep their source order.
pub fn records_from_rows<T: Schema>(
    codec: &Codec<T>,
    table: &str,
    rows: &[Row],
) -> IngestReport<T> {
    let mut report = IngestReport {
        records: Vec::with_capacity(rows.len()),
        errors: Vec::new(),
    };
    for (index, row) in rows.iter().enumerate() {
        match codec.from_row(row) {
            Ok(record) => report.records.push(record),
            Err(e) => report.errors.push(ColumnConversionError {
                table: table.to_string(),
                row: index + 1,
                column: e.column,
                detail: e.detail,
            }),
        }
    }
    report
}
