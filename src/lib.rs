//! Recon/honeypot HTTP listener library.
//!
//! Records every inbound probe, serves decoy payloads for known attack
//! paths, stalls automated scanners with a tarpit stream, and answers
//! CONNECT tunnel requests from a resolution cache.

pub mod classify;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod pipeline;
pub mod resolve;
pub mod store;

pub use config::ReconConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
