//! Record store seam.
//!
//! # Data Flow
//! ```text
//! pipeline
//!     → insert_request (audit record, before any decision)
//!     → get_honeypot_payload (decoy lookup by file key)
//!     → connect cache (prior CONNECT resolutions)
//! ```
//!
//! # Design Decisions
//! - The store is an injected trait object so the pipeline never couples to a
//!   concrete persistence layer
//! - All methods are fallible: an unreachable store is a hard per-request
//!   failure, never silently classified as an acceptable request
//! - Concurrent callers need no client-side locking; implementations carry
//!   their own synchronization

use bytes::Bytes;
use thiserror::Error;

use crate::pipeline::normalizer::IncomingRequest;

pub mod memory;

pub use memory::MemoryStore;

/// Error type for record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io: {0}")]
    Io(#[from] std::io::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable store of audit records, honeypot payloads, and prior CONNECT
/// resolutions.
pub trait RecordStore: Send + Sync {
    /// Persist an audit record. Accepts any well-formed request without
    /// rejecting on content.
    fn insert_request(&self, req: &IncomingRequest) -> Result<(), StoreError>;

    /// Look up a honeypot payload by its file key (the last path segment of
    /// the requested URI; the empty string is a legal key).
    fn get_honeypot_payload(&self, file: &str) -> Result<Option<Bytes>, StoreError>;

    /// Whether a prior CONNECT resolution exists for this canonical target.
    fn connect_target_exists(&self, target: &str) -> Result<bool, StoreError>;

    /// The stored response for a previously resolved CONNECT target.
    fn get_connect_target(&self, target: &str) -> Result<Option<String>, StoreError>;

    /// Persist a CONNECT resolution for later replay.
    fn put_connect_target(&self, target: &str, response: &str) -> Result<(), StoreError>;
}
