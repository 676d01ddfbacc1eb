//! In-memory record store.
//!
//! Backs the [`RecordStore`] seam for a single process: concurrent lookups go
//! through `DashMap`, the audit log is an append-only vector. Payloads can be
//! seeded from a directory at startup (file name = lookup key).

use std::path::Path;
use std::sync::Mutex;

use bytes::Bytes;
use dashmap::DashMap;

use super::{RecordStore, StoreError};
use crate::pipeline::normalizer::IncomingRequest;

#[derive(Default)]
pub struct MemoryStore {
    requests: Mutex<Vec<IncomingRequest>>,
    honeypots: DashMap<String, Bytes>,
    connect_targets: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a honeypot payload under its file key.
    pub fn insert_honeypot(&self, file: impl Into<String>, payload: impl Into<Bytes>) {
        self.honeypots.insert(file.into(), payload.into());
    }

    /// Seed honeypot payloads from a directory: each regular file becomes one
    /// payload keyed by its file name. Returns the number of payloads loaded.
    pub fn load_payload_dir(&self, dir: &Path) -> Result<usize, StoreError> {
        let mut loaded = 0;
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let content = std::fs::read(entry.path())?;
            tracing::debug!(file = %name, bytes = content.len(), "Honeypot payload loaded");
            self.honeypots.insert(name, Bytes::from(content));
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Number of audit records held (test and introspection hook).
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|log| log.len()).unwrap_or(0)
    }

    /// Snapshot of the audit log.
    pub fn requests(&self) -> Vec<IncomingRequest> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

impl RecordStore for MemoryStore {
    fn insert_request(&self, req: &IncomingRequest) -> Result<(), StoreError> {
        let mut log = self
            .requests
            .lock()
            .map_err(|_| StoreError::Unavailable("request log poisoned".into()))?;
        log.push(req.clone());
        Ok(())
    }

    fn get_honeypot_payload(&self, file: &str) -> Result<Option<Bytes>, StoreError> {
        Ok(self.honeypots.get(file).map(|entry| entry.value().clone()))
    }

    fn connect_target_exists(&self, target: &str) -> Result<bool, StoreError> {
        Ok(self.connect_targets.contains_key(target))
    }

    fn get_connect_target(&self, target: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .connect_targets
            .get(target)
            .map(|entry| entry.value().clone()))
    }

    fn put_connect_target(&self, target: &str, response: &str) -> Result<(), StoreError> {
        self.connect_targets
            .insert(target.to_string(), response.to_string());
        Ok(())
    }
}
