//! Request-handling decision pipeline.
//!
//! # Data Flow
//! ```text
//! transport (http::server)
//!     → normalizer.rs (raw data → IncomingRequest)
//!     → [classifier marks is_acceptable]
//!     → dispatcher.rs (record, then decide: 404 / honeypot / tarpit)
//!     → tarpit.rs (slow-stream discipline for unmatched hostile requests)
//!
//! CONNECT method instead:
//!     → connect.rs (target normalization, pure)
//!     → store cache / external resolver
//! ```

pub mod connect;
pub mod dispatcher;
pub mod normalizer;
pub mod tarpit;

pub use connect::ConnectTarget;
pub use dispatcher::{Decision, HoneypotDispatcher};
pub use normalizer::{normalize, IncomingRequest, RequestMethod};
pub use tarpit::{TarpitGuard, TarpitStreamer};
