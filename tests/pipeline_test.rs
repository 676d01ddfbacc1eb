//! Dispatcher ordering and failure-isolation tests against stub stores.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use recon_listener::pipeline::dispatcher::{Decision, HoneypotDispatcher};
use recon_listener::pipeline::normalizer::{normalize, IncomingRequest};
use recon_listener::store::{RecordStore, StoreError};

/// Store stub that records the order of calls made against it.
#[derive(Default)]
struct RecordingStore {
    events: Mutex<Vec<String>>,
    honeypots: Mutex<HashMap<String, Bytes>>,
}

impl RecordingStore {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn log(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }
}

impl RecordStore for RecordingStore {
    fn insert_request(&self, req: &IncomingRequest) -> Result<(), StoreError> {
        self.log(format!("insert:{}", req.uri));
        Ok(())
    }

    fn get_honeypot_payload(&self, file: &str) -> Result<Option<Bytes>, StoreError> {
        self.log(format!("lookup:{file}"));
        Ok(self.honeypots.lock().unwrap().get(file).cloned())
    }

    fn connect_target_exists(&self, _target: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    fn get_connect_target(&self, _target: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn put_connect_target(&self, _target: &str, _response: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Store stub whose audit insert always fails.
struct FailingStore;

impl RecordStore for FailingStore {
    fn insert_request(&self, _req: &IncomingRequest) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("backend down".into()))
    }

    fn get_honeypot_payload(&self, _file: &str) -> Result<Option<Bytes>, StoreError> {
        panic!("no decision may precede its audit record");
    }

    fn connect_target_exists(&self, _target: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    fn get_connect_target(&self, _target: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn put_connect_target(&self, _target: &str, _response: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

fn hostile(uri: &str) -> IncomingRequest {
    normalize(80, "1.2.3.4", "GET", HashMap::new(), uri, &[], None, b"")
}

#[test]
fn audit_record_precedes_payload_lookup() {
    let store = Arc::new(RecordingStore::default());
    let dispatcher = HoneypotDispatcher::new(store.clone(), true);

    dispatcher.dispatch(&hostile("/a/b/shell.php")).unwrap();

    assert_eq!(
        store.events(),
        vec!["insert:/a/b/shell.php", "lookup:shell.php"]
    );
}

#[test]
fn acceptable_request_is_recorded_but_never_looked_up() {
    let store = Arc::new(RecordingStore::default());
    let dispatcher = HoneypotDispatcher::new(store.clone(), true);

    let mut req = hostile("/");
    req.is_acceptable = true;
    let decision = dispatcher.dispatch(&req).unwrap();

    assert_eq!(decision, Decision::Reject404);
    assert_eq!(store.events(), vec!["insert:/"]);
}

#[test]
fn each_dispatch_records_exactly_once() {
    let store = Arc::new(RecordingStore::default());
    let dispatcher = HoneypotDispatcher::new(store.clone(), false);

    dispatcher.dispatch(&hostile("/one")).unwrap();
    dispatcher.dispatch(&hostile("/two")).unwrap();

    let inserts = store
        .events()
        .iter()
        .filter(|e| e.starts_with("insert:"))
        .count();
    assert_eq!(inserts, 2);
}

#[test]
fn store_failure_is_propagated_not_masked() {
    let dispatcher = HoneypotDispatcher::new(Arc::new(FailingStore), true);

    let result = dispatcher.dispatch(&hostile("/anything"));

    // The request must fail outright rather than fall into any decision.
    assert!(matches!(result, Err(StoreError::Unavailable(_))));
}

#[test]
fn honeypot_payload_is_matched_by_file_key() {
    let store = Arc::new(RecordingStore::default());
    store
        .honeypots
        .lock()
        .unwrap()
        .insert("wp-login.php".into(), Bytes::from_static(b"decoy page"));
    let dispatcher = HoneypotDispatcher::new(store, true);

    match dispatcher.dispatch(&hostile("/blog/wp-login.php")).unwrap() {
        Decision::Honeypot(payload) => assert_eq!(&payload[..], b"decoy page"),
        other => panic!("expected honeypot, got {other:?}"),
    }
}
