//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, one pipeline entry point + fallback)
//!     → pipeline (normalize, classify, record, decide)
//!     → response.rs (404 / honeypot payload / tarpit stream / CONNECT)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer, SetupError};
