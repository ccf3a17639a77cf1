//! Import path: a sheet's rows become a stored binary artifact.
//!
//! This is the editor-side half of the pipeline. Conversion failures do not
//! abort the import; the artifact is written from the surviving rows and
//! every broken cell is reported so an operator can fix the sheet in one
//! pass.

use tabula_core::{artifact, ingest, Codec, ColumnConversionError, Row, Schema};
use tracing::{info, warn};

use crate::storage::BlobStore;

/// A named sheet of source rows, as delivered by an external reader.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("blob write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// What one import produced.
#[derive(Debug)]
pub struct ImportOutcome {
    /// Records written into the artifact.
    pub records: usize,
    /// Rows dropped, one entry per broken cell's row.
    pub errors: Vec<ColumnConversionError>,
}

impl ImportOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Convert `sheet` with `codec`, encode the list artifact, and write it as
/// `<sheet name>.bin`.
pub fn import_sheet<T: Schema>(
    codec: &Codec<T>,
    store: &dyn BlobStore,
    sheet: &Sheet,
) -> Result<ImportOutcome, ImportError> {
    let report = ingest::records_from_rows(codec, &sheet.name, &sheet.rows);
    for error in &report.errors {
        warn!(%error, "row dropped");
    }
    let bytes = artifact::encode_list(codec, &report.records);
    store.write_blob(&format!("{}.bin", sheet.name), &bytes)?;
    info!(
        sheet = %sheet.name,
        records = report.records.len(),
        dropped = report.errors.len(),
        bytes = bytes.len(),
        "sheet imported"
    );
    Ok(ImportOutcome {
        records: report.records.len(),
        errors: report.errors,
    })
}
