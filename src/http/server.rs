//! HTTP server setup and per-request orchestration.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware (tracing, request ID)
//! - Drive each probe through one pipeline:
//!   normalize → classify → record → dispatch → respond
//! - Serve the static robots.txt / sitemap.xml decoys outside the pipeline
//! - Hand CONNECT requests to the target resolver and connect cache
//!
//! # Design Decisions
//! - The wildcard route and the router fallback both land in the same
//!   handler: framework-raised misses (authority-form URIs, unroutable
//!   paths) are logged and classified exactly like ordinary requests.
//!   There is exactly one code path that decides what a hostile client sees.
//! - A Server header decoy is set on every response; scanners fingerprint it

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Method, Request},
    response::Response,
    routing::{any, get},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Semaphore};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::classify::{AcceptabilityClassifier, PathAllowlist};
use crate::config::ReconConfig;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::http::response;
use crate::observability::metrics;
use crate::pipeline::connect;
use crate::pipeline::dispatcher::{Decision, HoneypotDispatcher};
use crate::pipeline::normalizer::{normalize, IncomingRequest, RequestMethod};
use crate::pipeline::tarpit::{TarpitGuard, TarpitStreamer};
use crate::resolve::{ConnectResolver, Disabled, HttpProber, ResolveError};
use crate::store::{MemoryStore, RecordStore, StoreError};

const SERVER_DECOY: &str = "Apache/2.4.41 (Ubuntu)";

/// Error type for server construction.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: HoneypotDispatcher,
    pub store: Arc<dyn RecordStore>,
    pub classifier: Arc<dyn AcceptabilityClassifier>,
    pub resolver: Arc<dyn ConnectResolver>,
    pub tarpit: TarpitStreamer,
    pub tarpit_permits: Arc<Semaphore>,
    pub public_port: u16,
    pub max_body_bytes: usize,
}

/// HTTP server for the recon listener.
pub struct HttpServer {
    router: Router,
    config: ReconConfig,
}

impl HttpServer {
    /// Create a server with the default collaborators: an in-memory store
    /// seeded from the configured payload directory, the path-allowlist
    /// classifier, and the CONNECT prober when enabled.
    pub fn new(config: ReconConfig) -> Result<Self, SetupError> {
        let store = Arc::new(MemoryStore::new());
        if let Some(dir) = &config.honeypot.payload_dir {
            let loaded = store.load_payload_dir(std::path::Path::new(dir))?;
            tracing::info!(dir = %dir, payloads = loaded, "Honeypot payloads seeded");
        }

        let classifier = Arc::new(PathAllowlist::from_config(&config.classifier));

        let resolver: Arc<dyn ConnectResolver> = if config.connect.probe_enabled {
            Arc::new(HttpProber::new(
                store.clone(),
                Duration::from_secs(config.connect.probe_timeout_secs),
                config.connect.probe_max_bytes,
            )?)
        } else {
            Arc::new(Disabled)
        };

        Ok(Self::with_parts(config, store, classifier, resolver))
    }

    /// Create a server with explicit collaborators (tests substitute stubs).
    pub fn with_parts(
        config: ReconConfig,
        store: Arc<dyn RecordStore>,
        classifier: Arc<dyn AcceptabilityClassifier>,
        resolver: Arc<dyn ConnectResolver>,
    ) -> Self {
        let state = AppState {
            dispatcher: HoneypotDispatcher::new(store.clone(), config.tarpit.enabled),
            store,
            classifier,
            resolver,
            tarpit: TarpitStreamer::from_config(&config.tarpit),
            tarpit_permits: Arc::new(Semaphore::new(config.tarpit.max_concurrent)),
            public_port: config.listener.effective_port(),
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/robots.txt", get(robots_handler))
            .route("/sitemap.xml", get(sitemap_handler))
            .route("/", any(probe_handler))
            .route("/{*path}", any(probe_handler))
            // Second entry point: requests the router cannot place (CONNECT
            // authority-form URIs among them) converge on the same pipeline.
            .fallback(probe_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(SetResponseHeaderLayer::overriding(
                        header::SERVER,
                        HeaderValue::from_static(SERVER_DECOY),
                    ))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Recon listener starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Recon listener stopped");
        Ok(())
    }

    /// Run the server over TLS (the port-443 persona).
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: axum_server::tls_rustls::RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "Recon listener starting (TLS)");

        let handle = axum_server::Handle::new();
        let watcher = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            watcher.graceful_shutdown(Some(Duration::from_secs(5)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(
                self.router
                    .into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await?;

        tracing::info!("Recon listener stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ReconConfig {
        &self.config
    }
}

async fn robots_handler() -> Response {
    response::robots()
}

async fn sitemap_handler() -> Response {
    response::sitemap()
}

/// Single pipeline entry point for ordinary and framework-raised requests.
async fn probe_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let (parts, body) = request.into_parts();

    let request_id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let method_raw = parts.method.as_str().to_string();
    // CONNECT carries its tunnel target in authority form, not as a path.
    let raw_target = if parts.method == Method::CONNECT {
        parts
            .uri
            .authority()
            .map(|a| a.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string())
    } else {
        parts.uri.path().to_string()
    };

    let query_pairs: Vec<(String, String)> = parts
        .uri
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let header_map: HashMap<String, String> = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or("").to_string(),
            )
        })
        .collect();

    // Oversized or broken bodies collapse to empty; attacker input never
    // fails the request.
    let body_bytes = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .unwrap_or_default();

    let mut req = normalize(
        state.public_port,
        &addr.ip().to_string(),
        &method_raw,
        header_map,
        &raw_target,
        &query_pairs,
        content_type.as_deref(),
        &body_bytes,
    );
    req.is_acceptable = state.classifier.is_acceptable(&req);

    tracing::debug!(
        request_id = %request_id,
        peer = %req.host,
        method = %req.method,
        path = %req.uri,
        acceptable = req.is_acceptable,
        "Probe received"
    );

    if req.method == RequestMethod::Connect {
        return handle_connect(&state, &req, start).await;
    }

    match state.dispatcher.dispatch(&req) {
        Ok(Decision::Reject404) => {
            let decision = if req.is_acceptable { "acceptable" } else { "reject" };
            metrics::record_request(&method_raw, 404, decision, start);
            response::not_found()
        }
        Ok(Decision::Honeypot(payload)) => {
            tracing::info!(
                request_id = %request_id,
                peer = %req.host,
                path = %req.uri,
                bytes = payload.len(),
                "Serving honeypot payload"
            );
            metrics::record_request(&method_raw, 200, "honeypot", start);
            response::honeypot(payload)
        }
        Ok(Decision::Tarpit) => match state.tarpit_permits.clone().try_acquire_owned() {
            Ok(permit) => {
                tracing::info!(
                    request_id = %request_id,
                    peer = %req.host,
                    path = %req.uri,
                    "Tarpitting scanner"
                );
                metrics::record_request(&method_raw, 200, "tarpit", start);
                response::tarpit(state.tarpit.stream(TarpitGuard::new(permit)))
            }
            Err(_) => {
                tracing::warn!(peer = %req.host, "Tarpit capacity exhausted");
                metrics::record_request(&method_raw, 404, "tarpit_full", start);
                response::not_found()
            }
        },
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Record store unavailable");
            metrics::record_request(&method_raw, 500, "store_error", start);
            response::internal_error()
        }
    }
}

/// CONNECT branch: record, normalize the target, replay a prior resolution or
/// ask the external resolver.
async fn handle_connect(state: &AppState, req: &IncomingRequest, start: Instant) -> Response {
    // CONNECT requests are still audit-logged before any decision.
    if let Err(e) = state.store.insert_request(req) {
        tracing::error!(error = %e, "Record store unavailable");
        metrics::record_request("CONNECT", 500, "store_error", start);
        return response::internal_error();
    }

    let Some(target) = connect::resolve(&req.uri) else {
        tracing::debug!(peer = %req.host, raw = %req.uri, "CONNECT target invalid");
        metrics::record_request("CONNECT", 400, "invalid_target", start);
        return response::bad_request();
    };

    match state.store.connect_target_exists(target.as_str()) {
        Ok(true) => match state.store.get_connect_target(target.as_str()) {
            Ok(Some(prior)) => {
                metrics::record_request("CONNECT", 200, "connect_cached", start);
                return response::connect_resolved(prior);
            }
            // Entry raced away between exists and get; treat as unknown.
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, "Record store unavailable");
                metrics::record_request("CONNECT", 500, "store_error", start);
                return response::internal_error();
            }
        },
        Ok(false) => {}
        Err(e) => {
            tracing::error!(error = %e, "Record store unavailable");
            metrics::record_request("CONNECT", 500, "store_error", start);
            return response::internal_error();
        }
    }

    match state.resolver.resolve(&target).await {
        Ok(Some(body)) => {
            metrics::record_request("CONNECT", 200, "connect_resolved", start);
            response::connect_resolved(body)
        }
        Ok(None) => {
            tracing::debug!(target = %target, "CONNECT target unresolved");
            metrics::record_request("CONNECT", 400, "connect_unresolved", start);
            response::bad_request()
        }
        Err(e) => {
            tracing::error!(target = %target, error = %e, "CONNECT resolver failed");
            metrics::record_request("CONNECT", 500, "resolver_error", start);
            response::internal_error()
        }
    }
}
