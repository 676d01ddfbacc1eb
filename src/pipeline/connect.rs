//! CONNECT tunnel target normalization.
//!
//! Pure string validation: no network access happens here. The out-of-band
//! probing of a validated target lives in the `resolve` module.

use std::fmt;

/// Fixed port-to-scheme table. Targets on any other port with no explicit
/// scheme prefix cannot be normalized.
const PORT_SCHEMES: &[(u16, &str)] = &[(80, "http"), (443, "https")];

fn scheme_for_port(port: u16) -> Option<&'static str> {
    PORT_SCHEMES
        .iter()
        .find(|(p, _)| *p == port)
        .map(|(_, scheme)| *scheme)
}

/// Canonical `scheme://host:port` form of a CONNECT request's target.
///
/// Only ever constructed by [`resolve`]; a target with a non-numeric port, an
/// empty host, or an undeterminable scheme never becomes a `ConnectTarget`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectTarget(String);

impl ConnectTarget {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ConnectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a raw CONNECT target, or `None` when it cannot be resolved.
///
/// A target that already carries a `://` scheme delimiter is trusted verbatim
/// (pre-qualified strings are a trust boundary, not re-validated). Otherwise
/// the target must be `host:port` with a numeric port present in the fixed
/// port-to-scheme table.
pub fn resolve(raw: &str) -> Option<ConnectTarget> {
    let target = raw.trim_start_matches('/');

    if target.contains("://") {
        return Some(ConnectTarget(target.to_string()));
    }

    let (host, port) = target.split_once(':')?;
    if host.is_empty() {
        return None;
    }
    // A second colon lands in `port` and fails the numeric parse.
    let port: u16 = port.parse().ok()?;
    let scheme = scheme_for_port(port)?;

    Some(ConnectTarget(format!("{scheme}://{host}:{port}")))
}
