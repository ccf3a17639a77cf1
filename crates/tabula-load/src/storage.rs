//! Blob storage behind the loading pipeline.
//!
//! A [`BlobStore`] reads and writes whole artifacts by logical name. The
//! pipeline never streams partial blobs; a failure is an `io::Error` and is
//! fatal for the one table involved.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

/// Whole-blob storage keyed by logical name (e.g. `"Item.bin"`).
pub trait BlobStore: Send + Sync {
    fn read_blob(&self, name: &str) -> io::Result<Vec<u8>>;
    fn write_blob(&self, name: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Blobs as files under one directory.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BlobStore for DirStore {
    fn read_blob(&self, name: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.root.join(name))
    }

    fn write_blob(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.root.join(name), bytes)
    }
}

/// In-memory store for tests and tooling.
#[derive(Default)]
pub struct MemStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemStore {
    fn read_blob(&self, name: &str) -> io::Result<Vec<u8>> {
        self.blobs
            .lock()
            .map_err(|_| io::Error::other("blob map poisoned"))?
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no blob '{name}'")))
    }

    fn write_blob(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        self.blobs
            .lock()
            .map_err(|_| io::Error::other("blob map poisoned"))?
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_store_round_trips() {
        let store = MemStore::new();
        store.write_blob("Item.bin", &[1, 2, 3]).unwrap();
        assert_eq!(store.read_blob("Item.bin").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn missing_blob_is_not_found() {
        let store = MemStore::new();
        let err = store.read_blob("Ghost.bin").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn dir_store_round_trips() {
        let dir = std::env::temp_dir().join(format!("tabula-store-{}", std::process::id()));
        let store = DirStore::new(&dir);
        store.write_blob("Item.bin", &[9, 8]).unwrap();
        assert_eq!(store.read_blob("Item.bin").unwrap(), vec![9, 8]);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
