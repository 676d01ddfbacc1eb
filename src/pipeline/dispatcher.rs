//! Honeypot dispatch: the per-request decision.
//!
//! # Data Flow
//! ```text
//! IncomingRequest
//!     → store.insert_request (audit, unconditional, before any branch)
//!     → acceptable?          → Reject404
//!     → payload for file key → Honeypot(payload)
//!     → tarpit enabled?      → Tarpit, else Reject404
//! ```
//!
//! # Design Decisions
//! - Audit-before-decide: no decision is computed before the audit record is
//!   written; a store failure propagates instead of producing a decision
//! - The file key is the substring after the final `/`; a URI with no slash
//!   is its own key and a trailing slash yields the empty key, which is a
//!   legal (normally unmatched) lookup

use std::sync::Arc;

use bytes::Bytes;

use crate::pipeline::normalizer::IncomingRequest;
use crate::store::{RecordStore, StoreError};

/// Outcome of dispatching one inbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Acceptable request, or nothing defensive applies: bare 404.
    Reject404,
    /// A cached decoy payload exists for the requested file.
    Honeypot(Bytes),
    /// Neither acceptable nor honeypot-matched: stall the client.
    Tarpit,
}

/// Decides how a recorded request is answered.
#[derive(Clone)]
pub struct HoneypotDispatcher {
    store: Arc<dyn RecordStore>,
    tarpit_enabled: bool,
}

impl HoneypotDispatcher {
    pub fn new(store: Arc<dyn RecordStore>, tarpit_enabled: bool) -> Self {
        Self {
            store,
            tarpit_enabled,
        }
    }

    pub fn dispatch(&self, req: &IncomingRequest) -> Result<Decision, StoreError> {
        self.store.insert_request(req)?;

        if req.is_acceptable {
            return Ok(Decision::Reject404);
        }

        let file = payload_file(&req.uri);
        if let Some(payload) = self.store.get_honeypot_payload(file)? {
            return Ok(Decision::Honeypot(payload));
        }

        if self.tarpit_enabled {
            Ok(Decision::Tarpit)
        } else {
            Ok(Decision::Reject404)
        }
    }
}

/// The honeypot lookup key for a request URI: everything after the final `/`.
pub fn payload_file(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalizer::normalize;
    use crate::store::MemoryStore;
    use std::collections::HashMap;

    fn request(uri: &str, acceptable: bool) -> IncomingRequest {
        let mut req = normalize(80, "1.2.3.4", "GET", HashMap::new(), uri, &[], None, b"");
        req.is_acceptable = acceptable;
        req
    }

    #[test]
    fn payload_file_takes_last_segment() {
        assert_eq!(payload_file("/a/b/payload.php"), "payload.php");
        assert_eq!(payload_file("bare"), "bare");
        assert_eq!(payload_file("/trailing/"), "");
        assert_eq!(payload_file(""), "");
    }

    #[test]
    fn acceptable_requests_get_404_regardless_of_uri() {
        let store = Arc::new(MemoryStore::new());
        store.insert_honeypot("payload.php", &b"decoy"[..]);
        let dispatcher = HoneypotDispatcher::new(store.clone(), true);

        for uri in ["/", "/a/b/payload.php", "/anything"] {
            let decision = dispatcher.dispatch(&request(uri, true)).unwrap();
            assert_eq!(decision, Decision::Reject404, "uri = {uri}");
        }
        // Every dispatch was still recorded.
        assert_eq!(store.request_count(), 3);
    }

    #[test]
    fn honeypot_hit_returns_exact_payload() {
        let store = Arc::new(MemoryStore::new());
        store.insert_honeypot("payload.php", &b"<?php decoy ?>"[..]);
        let dispatcher = HoneypotDispatcher::new(store, true);

        match dispatcher.dispatch(&request("/a/b/payload.php", false)).unwrap() {
            Decision::Honeypot(payload) => assert_eq!(&payload[..], b"<?php decoy ?>"),
            other => panic!("expected honeypot, got {other:?}"),
        }
    }

    #[test]
    fn unmatched_hostile_request_is_tarpitted() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = HoneypotDispatcher::new(store, true);
        let decision = dispatcher.dispatch(&request("/unknownpath", false)).unwrap();
        assert_eq!(decision, Decision::Tarpit);
    }

    #[test]
    fn tarpit_disabled_falls_back_to_404() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = HoneypotDispatcher::new(store, false);
        let decision = dispatcher.dispatch(&request("/unknownpath", false)).unwrap();
        assert_eq!(decision, Decision::Reject404);
    }

    #[test]
    fn trailing_slash_uri_is_a_legal_empty_key() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = HoneypotDispatcher::new(store, true);
        // Must not error; the empty key simply never matches.
        let decision = dispatcher.dispatch(&request("/scan/", false)).unwrap();
        assert_eq!(decision, Decision::Tarpit);
    }
}
