//! Table manager: startup orchestration across every registered loader.
//!
//! The manager reads each table's `<name>.bin` blob, starts every load,
//! waits at a join-all barrier, then post-processes the successes on the
//! caller's thread. A failed table is recorded and skipped; its siblings
//! load normally.

use std::sync::Arc;

use tabula_core::{Codec, CodecRegistry, RegistryError};
use tracing::{info, info_span, warn};

use crate::loader::{LoadError, TableLoader, TableMapper, ThreadedLoader};
use crate::storage::BlobStore;

/// One table that failed to load.
#[derive(Debug)]
pub struct TableFailure {
    pub table: &'static str,
    pub error: LoadError,
}

/// Outcome of one load pass.
#[derive(Debug, Default)]
pub struct LoadSummary {
    pub loaded: Vec<&'static str>,
    pub failures: Vec<TableFailure>,
}

impl LoadSummary {
    pub fn all_loaded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Owns the boxed loaders and drives their shared lifecycle.
pub struct TableManager {
    store: Arc<dyn BlobStore>,
    loaders: Vec<Box<dyn TableLoader>>,
}

impl TableManager {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            loaders: Vec::new(),
        }
    }

    /// Register a table. The codec comes from the shared registry, so an
    /// unregistered record type fails here, at wiring time.
    pub fn register<M: TableMapper>(
        &mut self,
        registry: &CodecRegistry,
    ) -> Result<(), RegistryError> {
        let codec: Arc<Codec<M::Row>> = registry.get::<M::Row>()?;
        self.loaders
            .push(Box::new(ThreadedLoader::<M>::new(codec)));
        Ok(())
    }

    pub fn tables(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.loaders.iter().map(|l| l.table())
    }

    /// The built table for `M`, once its loader has post-processed.
    pub fn table<M: TableMapper>(&self) -> Option<&M> {
        self.loaders.iter().find_map(|loader| {
            loader
                .as_any()
                .downcast_ref::<ThreadedLoader<M>>()
                .and_then(ThreadedLoader::mapper)
        })
    }

    /// Load every preloadable table.
    pub fn load_preloadable(&mut self) -> LoadSummary {
        self.load_where(|loader| loader.preloadable())
    }

    /// Load every registered table.
    pub fn load_all(&mut self) -> LoadSummary {
        self.load_where(|_| true)
    }

    fn load_where(&mut self, select: impl Fn(&dyn TableLoader) -> bool) -> LoadSummary {
        let span = info_span!("table_load");
        let _guard = span.enter();

        let mut summary = LoadSummary::default();
        let mut started = vec![false; self.loaders.len()];

        for (i, loader) in self.loaders.iter_mut().enumerate() {
            if !select(loader.as_ref()) {
                continue;
            }
            let blob = format!("{}.bin", loader.table());
            match self.store.read_blob(&blob) {
                Ok(bytes) => {
                    loader.start_loading(bytes);
                    started[i] = true;
                }
                Err(e) => {
                    warn!(table = loader.table(), error = %e, "blob read failed");
                    summary.failures.push(TableFailure {
                        table: loader.table(),
                        error: LoadError::Io(e),
                    });
                }
            }
        }

        // Join-all barrier. Every worker finishes before any table is
        // post-processed.
        let mut completed = vec![false; self.loaders.len()];
        for (i, loader) in self.loaders.iter_mut().enumerate() {
            if !started[i] {
                continue;
            }
            match loader.await_completion() {
                Ok(()) => completed[i] = true,
                Err(error) => {
                    warn!(table = loader.table(), error = %error, "load failed");
                    summary.failures.push(TableFailure {
                        table: loader.table(),
                        error,
                    });
                }
            }
        }

        // Post-processing stays on the caller's thread.
        for (i, loader) in self.loaders.iter_mut().enumerate() {
            if completed[i] {
                loader.post_process();
                summary.loaded.push(loader.table());
            }
        }

        info!(
            loaded = summary.loaded.len(),
            failed = summary.failures.len(),
            "load pass finished"
        );
        summary
    }
}
