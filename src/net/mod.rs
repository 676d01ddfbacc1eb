//! Network layer subsystem.
//!
//! TLS certificate loading for the port-443 persona. Plain TCP listening is
//! handled directly by `tokio::net::TcpListener` in main.

pub mod tls;
