//! Acceptability classification seam.
//!
//! `is_acceptable` originates from logic outside the decision pipeline. It is
//! modeled as an injected predicate the listener applies right after
//! normalization, so tests can substitute a stub and the pipeline's control
//! flow never couples to classification internals.

use std::collections::HashSet;

use crate::config::ClassifierConfig;
use crate::pipeline::normalizer::{IncomingRequest, RequestMethod};

/// Opaque predicate deciding whether a request is benign.
pub trait AcceptabilityClassifier: Send + Sync {
    fn is_acceptable(&self, req: &IncomingRequest) -> bool;
}

/// Default classifier: benign means a plain GET/HEAD for one of a fixed set
/// of paths. Everything else a sacrificial endpoint sees is hostile.
pub struct PathAllowlist {
    paths: HashSet<String>,
}

impl PathAllowlist {
    pub fn new(paths: impl IntoIterator<Item = String>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.allow_paths.iter().cloned())
    }
}

impl AcceptabilityClassifier for PathAllowlist {
    fn is_acceptable(&self, req: &IncomingRequest) -> bool {
        matches!(req.method, RequestMethod::Get | RequestMethod::Head)
            && self.paths.contains(&req.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalizer::normalize;
    use std::collections::HashMap;

    fn get(uri: &str) -> IncomingRequest {
        normalize(80, "1.2.3.4", "GET", HashMap::new(), uri, &[], None, b"")
    }

    #[test]
    fn allowlisted_get_is_acceptable() {
        let classifier = PathAllowlist::new(["/".to_string(), "/index.html".to_string()]);
        assert!(classifier.is_acceptable(&get("/")));
        assert!(classifier.is_acceptable(&get("/index.html")));
        assert!(!classifier.is_acceptable(&get("/wp-admin.php")));
    }

    #[test]
    fn non_get_methods_are_never_acceptable() {
        let classifier = PathAllowlist::new(["/".to_string()]);
        let mut req = get("/");
        req.method = RequestMethod::Post;
        assert!(!classifier.is_acceptable(&req));
        req.method = RequestMethod::Unknown;
        assert!(!classifier.is_acceptable(&req));
    }
}
