//! HTTP probing of CONNECT targets.
//!
//! Fetches the canonical target URL once, snapshots status line, headers, and
//! a truncated body, and persists the snapshot through the record store so
//! later CONNECTs for the same target replay it without another probe.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{ConnectResolver, ResolveError};
use crate::pipeline::connect::ConnectTarget;
use crate::store::RecordStore;

pub struct HttpProber {
    client: reqwest::Client,
    store: Arc<dyn RecordStore>,
    max_bytes: usize,
}

impl HttpProber {
    pub fn new(
        store: Arc<dyn RecordStore>,
        timeout: Duration,
        max_bytes: usize,
    ) -> Result<Self, ResolveError> {
        // Decoy targets routinely present broken TLS; the probe is
        // reconnaissance, not a trust decision.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            store,
            max_bytes,
        })
    }
}

#[async_trait]
impl ConnectResolver for HttpProber {
    async fn resolve(&self, target: &ConnectTarget) -> Result<Option<String>, ResolveError> {
        // A failed or timed-out probe means "could not resolve", not a fault:
        // the target is attacker-supplied and often bogus.
        let response = match self.client.get(target.as_str()).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(target = %target, error = %e, "CONNECT probe failed");
                return Ok(None);
            }
        };

        let status = response.status();
        let version = response.version();
        let header_pairs: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        // Body read failures degrade to an empty body snapshot.
        let body = response.text().await.unwrap_or_default();

        let mut snapshot = String::new();
        let _ = writeln!(snapshot, "{:?} {}", version, status);
        for (name, value) in header_pairs {
            let _ = writeln!(snapshot, "{}: {}", name, value);
        }
        snapshot.push('\n');
        let mut cut = body.len().min(self.max_bytes);
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        snapshot.push_str(&body[..cut]);

        self.store.put_connect_target(target.as_str(), &snapshot)?;
        tracing::info!(
            target = %target,
            status = %status,
            bytes = snapshot.len(),
            "CONNECT target resolved and cached"
        );
        Ok(Some(snapshot))
    }
}
