//! Retrieval handles for finished results.
//!
//! A [`BlobStore`] publishes encoded bytes and hands back a [`RetrievalHandle`],
//! the equivalent of an object URL. Handles are not `Clone` and revoking one
//! consumes it, so a handle can be released at most once.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::utils::{ReducerError, ReducerResult};

/// Opaque reference to published bytes.
#[derive(Debug, PartialEq, Eq)]
pub struct RetrievalHandle {
    id: u64,
    uri: String,
}

impl RetrievalHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// Issues and revokes retrieval handles.
pub trait BlobStore {
    /// Publishes `bytes` under `filename` and returns the only handle to them.
    fn publish(&mut self, bytes: Arc<[u8]>, filename: &str) -> ReducerResult<RetrievalHandle>;

    /// Fetches published bytes.
    fn fetch(&self, handle: &RetrievalHandle) -> ReducerResult<Arc<[u8]>>;

    /// Releases the bytes behind `handle`.
    fn revoke(&mut self, handle: RetrievalHandle) -> ReducerResult<()>;

    /// Number of handles issued and not yet revoked.
    fn live_handles(&self) -> usize;
}

#[derive(Debug)]
struct StoredBlob {
    bytes: Arc<[u8]>,
    filename: String,
}

/// In-process store issuing `blob:` URIs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: u64,
    blobs: HashMap<u64, StoredBlob>,
    revoked: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total handles revoked over the store's lifetime.
    pub fn revoked_count(&self) -> u64 {
        self.revoked
    }

    /// Filename a live handle was published under.
    pub fn filename(&self, handle: &RetrievalHandle) -> Option<&str> {
        self.blobs.get(&handle.id).map(|b| b.filename.as_str())
    }
}

impl BlobStore for MemoryStore {
    fn publish(&mut self, bytes: Arc<[u8]>, filename: &str) -> ReducerResult<RetrievalHandle> {
        self.next_id += 1;
        let id = self.next_id;
        let uri = format!("blob:image-reducer/{id}/{filename}");

        debug!("Published {} bytes as {}", bytes.len(), uri);
        self.blobs.insert(
            id,
            StoredBlob {
                bytes,
                filename: filename.to_string(),
            },
        );

        Ok(RetrievalHandle { id, uri })
    }

    fn fetch(&self, handle: &RetrievalHandle) -> ReducerResult<Arc<[u8]>> {
        self.blobs
            .get(&handle.id)
            .map(|b| Arc::clone(&b.bytes))
            .ok_or_else(|| ReducerError::IO(format!("Unknown retrieval handle: {}", handle.uri)))
    }

    fn revoke(&mut self, handle: RetrievalHandle) -> ReducerResult<()> {
        match self.blobs.remove(&handle.id) {
            Some(_) => {
                self.revoked += 1;
                debug!("Revoked {}", handle.uri);
                Ok(())
            }
            None => Err(ReducerError::IO(format!(
                "Unknown retrieval handle: {}",
                handle.uri
            ))),
        }
    }

    fn live_handles(&self) -> usize {
        self.blobs.len()
    }
}
