//! Tabula Load -- the runtime loading pipeline.
//!
//! Builds on `tabula-core`: blobs come out of a [`storage::BlobStore`],
//! decode on background threads via per-table [`loader::ThreadedLoader`]s,
//! and land as queryable tables after the [`manager::TableManager`] has
//! joined every worker. The [`import`] module is the opposite direction:
//! sheet rows in, stored artifact out.
//!
//! # Startup Sequence
//!
//! 1. Build the `CodecRegistry` with every record type.
//! 2. `TableManager::register::<M>()` each table mapper.
//! 3. `load_preloadable()` during startup, `load_all()` or individual
//!    follow-up passes on demand.
//! 4. Query with `manager.table::<M>()`.

pub mod import;
pub mod loader;
pub mod manager;
pub mod storage;

pub use import::{import_sheet, ImportError, ImportOutcome, Sheet};
pub use loader::{LoadError, LoadState, TableLoader, TableMapper, ThreadedLoader};
pub use manager::{LoadSummary, TableFailure, TableManager};
pub use storage::{BlobStore, DirStore, MemStore};
