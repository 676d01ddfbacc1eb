//! External CONNECT resolution seam.
//!
//! The pipeline validates CONNECT targets purely (`pipeline::connect`); what
//! a validated-but-unknown target actually answers is resolved out-of-band by
//! a collaborator behind this trait. `None` means "could not resolve", which
//! the listener surfaces as 400.

use async_trait::async_trait;
use thiserror::Error;

use crate::pipeline::connect::ConnectTarget;
use crate::store::StoreError;

pub mod prober;

pub use prober::HttpProber;

/// Error type for CONNECT resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("probe client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves what a CONNECT target answers, persisting the result for replay.
#[async_trait]
pub trait ConnectResolver: Send + Sync {
    async fn resolve(&self, target: &ConnectTarget) -> Result<Option<String>, ResolveError>;
}

/// Resolver used when out-of-band probing is switched off: every unknown
/// target stays unresolved.
pub struct Disabled;

#[async_trait]
impl ConnectResolver for Disabled {
    async fn resolve(&self, _target: &ConnectTarget) -> Result<Option<String>, ResolveError> {
        Ok(None)
    }
}
