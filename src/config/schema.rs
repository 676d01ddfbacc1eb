//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the listener.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the recon listener.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ReconConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Tarpit (slow-stream) response discipline.
    pub tarpit: TarpitConfig,

    /// Honeypot payload seeding.
    pub honeypot: HoneypotConfig,

    /// Acceptability classification.
    pub classifier: ClassifierConfig,

    /// CONNECT tunnel handling.
    pub connect: ConnectConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Port recorded on audit records when the listener sits behind a
    /// redirect (e.g., bound on 8080 but exposed on 80). Defaults to the
    /// port parsed from `bind_address`.
    pub public_port: Option<u16>,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,

    /// Maximum request body bytes read from a probe; anything beyond is
    /// dropped, not an error.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            public_port: None,
            tls: None,
            max_body_bytes: 64 * 1024,
        }
    }
}

impl ListenerConfig {
    /// The port attackers observe, for protocol context on audit records.
    pub fn effective_port(&self) -> u16 {
        self.public_port.unwrap_or_else(|| {
            self.bind_address
                .rsplit(':')
                .next()
                .and_then(|p| p.parse().ok())
                .unwrap_or(80)
        })
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Tarpit configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TarpitConfig {
    /// Enable the tarpit branch. When disabled, unmatched hostile requests
    /// get a bare 404 instead.
    pub enabled: bool,

    /// Hard ceiling on chunks per connection. Bounds resource use even
    /// against clients that never disconnect.
    pub max_chunks: u64,

    /// Padding bytes per chunk.
    pub chunk_bytes: usize,

    /// Pause between chunks in milliseconds.
    pub chunk_interval_ms: u64,

    /// Random extra delay added to each pause so the cadence is not a fixed
    /// fingerprint. Zero disables jitter.
    pub jitter_ms: u64,

    /// Maximum tarpit streams held open concurrently. At capacity, hostile
    /// requests fall back to a bare 404.
    pub max_concurrent: usize,
}

impl Default for TarpitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_chunks: 100_000,
            chunk_bytes: 1024 * 1024,
            chunk_interval_ms: 1_000,
            jitter_ms: 250,
            max_concurrent: 256,
        }
    }
}

/// Honeypot payload seeding.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HoneypotConfig {
    /// Directory of decoy payload files, keyed by file name. Unset means no
    /// seeded payloads.
    pub payload_dir: Option<String>,
}

/// Acceptability classification.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Paths a benign visitor may request with GET/HEAD. Everything else is
    /// classified hostile.
    pub allow_paths: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            allow_paths: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/favicon.ico".to_string(),
            ],
        }
    }
}

/// CONNECT tunnel handling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectConfig {
    /// Probe unknown CONNECT targets out-of-band. When disabled, unknown
    /// targets always get 400.
    pub probe_enabled: bool,

    /// Probe request timeout in seconds.
    pub probe_timeout_secs: u64,

    /// Maximum probed response bytes retained per target.
    pub probe_max_bytes: usize,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            probe_enabled: false,
            probe_timeout_secs: 5,
            probe_max_bytes: 16 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
