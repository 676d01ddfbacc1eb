//! Request normalization.
//!
//! # Responsibilities
//! - Turn raw transport-level request data into a canonical [`IncomingRequest`]
//! - Absorb malformed attacker input into safe defaults (never error upward)
//! - Reconstruct the decoded query string in original parameter order
//!
//! # Design Decisions
//! - Unrecognized method tokens map to `Unknown`, not an error
//! - The body map is populated only for JSON object payloads; anything else
//!   (parse failure, wrong content type, non-object JSON) yields an empty map
//! - Timestamp is assigned here, at record construction, not by the transport

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// HTTP method as observed on the wire.
///
/// Scanners routinely send garbage method tokens; those become `Unknown`
/// rather than failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    Trace,
    Connect,
    Unknown,
}

impl RequestMethod {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "PATCH" => Self::Patch,
            "TRACE" => Self::Trace,
            "CONNECT" => Self::Connect,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for RequestMethod {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of a single inbound HTTP request.
///
/// Constructed once by [`normalize`], immutable thereafter (the listener sets
/// `is_acceptable` from the injected classifier immediately after
/// construction), then handed to the record store for audit logging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomingRequest {
    /// Listening port that received the request (protocol context).
    pub port: u16,
    /// Remote peer address.
    pub host: String,
    pub method: RequestMethod,
    /// At most one value per header name, as received.
    pub headers: HashMap<String, String>,
    /// Request path component only (no query string). For CONNECT this
    /// carries the raw tunnel target instead.
    pub uri: String,
    /// Reconstructed `key=value&key=value` form of the decoded query
    /// parameters, original order preserved.
    pub query_string: String,
    /// Key/value pairs from a JSON object body; empty otherwise.
    pub body: HashMap<String, String>,
    /// Unix milliseconds at record construction.
    pub timestamp: u64,
    /// Supplied by the external classifier; the pipeline treats this as an
    /// opaque predicate result.
    pub is_acceptable: bool,
}

/// Build a canonical [`IncomingRequest`] from raw transport data.
///
/// Never fails: every malformed input shape collapses into a safe default.
#[allow(clippy::too_many_arguments)]
pub fn normalize(
    port: u16,
    host: &str,
    raw_method: &str,
    headers: HashMap<String, String>,
    uri: &str,
    query_params: &[(String, String)],
    content_type: Option<&str>,
    raw_body: &[u8],
) -> IncomingRequest {
    IncomingRequest {
        port,
        host: host.to_string(),
        method: RequestMethod::parse(raw_method),
        headers,
        uri: uri.to_string(),
        query_string: join_query(query_params),
        body: parse_json_body(content_type, raw_body),
        timestamp: unix_millis(),
        is_acceptable: false,
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn join_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Extract a flat string map from a JSON object body.
///
/// Only applies when the declared content type is `application/json`; parse
/// failures and non-object payloads yield an empty map. Attacker bodies are
/// expected to be malformed, so nothing here is an error.
fn parse_json_body(content_type: Option<&str>, raw_body: &[u8]) -> HashMap<String, String> {
    let is_json = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false);
    if !is_json || raw_body.is_empty() {
        return HashMap::new();
    }

    match serde_json::from_slice::<serde_json::Value>(raw_body) {
        Ok(serde_json::Value::Object(map)) => map
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, v)
            })
            .collect(),
        _ => HashMap::new(),
    }
}
