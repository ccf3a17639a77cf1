//! Per-table threaded loading state machine.
//!
//! Each table owns one [`ThreadedLoader`]: decode runs on a background
//! `std::thread`, progress is published through an atomic as a fraction,
//! and post-processing always happens on the caller's thread after the
//! worker has been joined.
//!
//! State machine: `Idle -> Loading -> Complete -> Idle` (post-processing
//! releases the decoded list and readies the loader for a fresh cycle).
//! `start_loading` while a load is in flight is a no-op.

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tabula_core::{artifact, Codec, DecodeError, Record};
use tracing::{debug, warn};

/// How a single table load failed. Isolated per table; one bad artifact
/// never aborts its siblings.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("blob read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("artifact decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("decode worker panicked")]
    WorkerPanicked,
}

/// Consumes a decoded record list and becomes the queryable table.
pub trait TableMapper: Send + Sync + 'static {
    type Row: Record;

    /// Logical table name; the manager reads `<TABLE>.bin`.
    const TABLE: &'static str;

    /// Preloadable tables load during startup; the rest load on demand.
    const PRELOADABLE: bool = true;

    fn from_records(records: Vec<Self::Row>) -> Self;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Complete,
}

/// Object-safe loader surface the manager drives.
pub trait TableLoader: Send {
    fn table(&self) -> &'static str;
    fn preloadable(&self) -> bool;
    fn state(&self) -> LoadState;
    fn start_loading(&mut self, bytes: Vec<u8>);
    fn progress(&self) -> f32;
    fn await_completion(&mut self) -> Result<(), LoadError>;
    fn post_process(&mut self);
    fn as_any(&self) -> &dyn Any;
}

/// The concrete loader for one mapper type.
pub struct ThreadedLoader<M: TableMapper> {
    codec: Arc<Codec<M::Row>>,
    running: Arc<AtomicBool>,
    progress: Arc<AtomicU32>,
    worker: Option<JoinHandle<Result<Vec<M::Row>, DecodeError>>>,
    decoded: Option<Vec<M::Row>>,
    mapper: Option<M>,
}

impl<M: TableMapper> ThreadedLoader<M> {
    pub fn new(codec: Arc<Codec<M::Row>>) -> Self {
        Self {
            codec,
            running: Arc::new(AtomicBool::new(false)),
            progress: Arc::new(AtomicU32::new(0)),
            worker: None,
            decoded: None,
            mapper: None,
        }
    }

    /// The built table, once a cycle has been post-processed.
    pub fn mapper(&self) -> Option<&M> {
        self.mapper.as_ref()
    }

    /// Await with a progress callback invoked each poll iteration.
    pub fn await_with_progress(
        &mut self,
        mut on_progress: impl FnMut(f32),
    ) -> Result<(), LoadError> {
        while self.running.load(Ordering::Acquire) {
            on_progress(self.progress());
            thread::yield_now();
        }
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        let records = worker
            .join()
            .map_err(|_| LoadError::WorkerPanicked)??;
        on_progress(1.0);
        self.decoded = Some(records);
        Ok(())
    }
}

impl<M: TableMapper> TableLoader for ThreadedLoader<M> {
    fn table(&self) -> &'static str {
        M::TABLE
    }

    fn preloadable(&self) -> bool {
        M::PRELOADABLE
    }

    fn state(&self) -> LoadState {
        if self.worker.is_some() || self.running.load(Ordering::Acquire) {
            LoadState::Loading
        } else if self.decoded.is_some() {
            LoadState::Complete
        } else {
            LoadState::Idle
        }
    }

    fn start_loading(&mut self, bytes: Vec<u8>) {
        if self.state() == LoadState::Loading {
            warn!(table = M::TABLE, "load already in flight, ignoring");
            return;
        }
        debug!(table = M::TABLE, bytes = bytes.len(), "starting decode");
        self.decoded = None;
        self.progress.store(0.0f32.to_bits(), Ordering::Release);
        self.running.store(true, Ordering::Release);

        let codec = Arc::clone(&self.codec);
        let running = Arc::clone(&self.running);
        let progress = Arc::clone(&self.progress);
        self.worker = Some(thread::spawn(move || {
            let result = artifact::peek_list_len(&codec, &bytes).and_then(|total| {
                // The count prefix is clear text; trust it for the progress
                // fraction only, never for allocation.
                let mut records = Vec::new();
                artifact::decode_list_with(&codec, &bytes, |record| {
                    records.push(record);
                    let fraction = records.len() as f32 / total.max(1) as f32;
                    progress.store(fraction.to_bits(), Ordering::Release);
                })?;
                Ok(records)
            });
            running.store(false, Ordering::Release);
            result
        }));
    }

    fn progress(&self) -> f32 {
        f32::from_bits(self.progress.load(Ordering::Acquire))
    }

    fn await_completion(&mut self) -> Result<(), LoadError> {
        self.await_with_progress(|_| {})
    }

    fn post_process(&mut self) {
        if let Some(records) = self.decoded.take() {
            self.mapper = Some(M::from_records(records));
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tabula_core::test_utils::{sample_items, ItemRow};

    struct ItemTable {
        by_id: HashMap<i32, ItemRow>,
    }

    impl TableMapper for ItemTable {
        type Row = ItemRow;
        const TABLE: &'static str = "Item";

        fn from_records(records: Vec<ItemRow>) -> Self {
            Self {
                by_id: records.into_iter().map(|r| (r.id, r)).collect(),
            }
        }
    }

    fn loader() -> ThreadedLoader<ItemTable> {
        ThreadedLoader::new(Arc::new(Codec::new()))
    }

    fn item_blob() -> Vec<u8> {
        artifact::encode_list(&Codec::<ItemRow>::new(), &sample_items())
    }

    #[test]
    fn full_cycle_builds_the_mapper() {
        let mut loader = loader();
        assert_eq!(loader.state(), LoadState::Idle);

        loader.start_loading(item_blob());
        loader.await_completion().unwrap();
        assert_eq!(loader.state(), LoadState::Complete);
        assert!(loader.mapper().is_none());

        loader.post_process();
        assert_eq!(loader.state(), LoadState::Idle);
        let table = loader.mapper().unwrap();
        assert_eq!(table.by_id.len(), sample_items().len());
        assert_eq!(table.by_id[&2].name, "Elven Bow");
    }

    #[test]
    fn progress_reaches_one_and_callback_fires() {
        let mut loader = loader();
        loader.start_loading(item_blob());
        let mut last = -1.0f32;
        loader.await_with_progress(|p| last = p).unwrap();
        assert_eq!(last, 1.0);
        assert_eq!(loader.progress(), 1.0);
    }

    #[test]
    fn double_start_is_a_no_op() {
        let mut loader = loader();
        loader.start_loading(item_blob());
        // Second start while in flight must not replace the worker.
        loader.start_loading(Vec::new());
        loader.await_completion().unwrap();
        loader.post_process();
        assert_eq!(
            loader.mapper().unwrap().by_id.len(),
            sample_items().len()
        );
    }

    #[test]
    fn await_re_raises_decode_failure() {
        let mut loader = loader();
        let mut blob = item_blob();
        blob[2] ^= 0x01; // corrupt the fingerprint header
        loader.start_loading(blob);
        let err = loader.await_completion().unwrap_err();
        assert!(matches!(
            err,
            LoadError::Decode(DecodeError::IncompatibleSchema(_))
        ));
        loader.post_process();
        assert!(loader.mapper().is_none());
        assert_eq!(loader.state(), LoadState::Idle);
    }

    #[test]
    fn oversized_count_prefix_fails_only_this_table() {
        // A stale or hand-edited blob can carry a valid header with an
        // absurd record count. That must come back as a decode error, not
        // take the process down.
        let codec = Codec::<ItemRow>::new();
        let mut blob = tabula_core::ByteBuffer::new();
        tabula_core::scheme::write_scheme(&mut blob, codec.scheme());
        blob.write_varint(1u64 << 45);

        let mut loader = loader();
        loader.start_loading(blob.into_vec());
        let err = loader.await_completion().unwrap_err();
        assert!(matches!(err, LoadError::Decode(DecodeError::Payload(_))));
        loader.post_process();
        assert!(loader.mapper().is_none());
        assert_eq!(loader.state(), LoadState::Idle);
    }

    #[test]
    fn completed_loader_can_start_a_fresh_cycle() {
        let mut loader = loader();
        loader.start_loading(item_blob());
        loader.await_completion().unwrap();
        loader.post_process();

        let one = vec![sample_items().remove(0)];
        let blob = artifact::encode_list(&Codec::<ItemRow>::new(), &one);
        loader.start_loading(blob);
        loader.await_completion().unwrap();
        loader.post_process();
        assert_eq!(loader.mapper().unwrap().by_id.len(), 1);
    }

    #[test]
    fn await_without_start_is_ok() {
        let mut loader = loader();
        loader.await_completion().unwrap();
        assert_eq!(loader.state(), LoadState::Idle);
    }
}
