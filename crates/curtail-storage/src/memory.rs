use async_trait::async_trait;
use curtail_core::{Backend, Code, Digest, IdAllocator, Result, StorageError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
struct KeySpaces {
    codes_by_digest: HashMap<String, Code>,
    urls_by_code: HashMap<String, String>,
}

/// In-process implementation of the backend contract.
///
/// Both key spaces live behind a single reader/writer lock, so the two
/// sub-writes of `add` become visible to readers together. The counter
/// is a lock-free atomic. Suitable for single-instance deployments and
/// tests; nothing is persisted.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    spaces: RwLock<KeySpaces>,
    counter: AtomicU64,
}

impl MemoryBackend {
    /// Creates an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn add(&self, long_url: &str, digest: &Digest, code: &Code) -> Result<()> {
        let mut spaces = self.spaces.write();

        if spaces.codes_by_digest.contains_key(digest.as_str()) {
            return Err(StorageError::DigestExists(digest.to_string()));
        }
        if spaces.urls_by_code.contains_key(code.as_str()) {
            return Err(StorageError::CodeExists(code.to_string()));
        }

        spaces
            .codes_by_digest
            .insert(digest.as_str().to_owned(), code.clone());
        spaces
            .urls_by_code
            .insert(code.as_str().to_owned(), long_url.to_owned());
        Ok(())
    }

    async fn get_code(&self, digest: &Digest) -> Result<Code> {
        self.spaces
            .read()
            .codes_by_digest
            .get(digest.as_str())
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn get_url(&self, code: &Code) -> Result<String> {
        self.spaces
            .read()
            .urls_by_code
            .get(code.as_str())
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn next_id(&self) -> Result<u64> {
        Ok(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl IdAllocator for MemoryBackend {
    async fn next_id(&self) -> Result<u64> {
        Ok(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
