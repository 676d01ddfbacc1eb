//! Response construction.
//!
//! Every response a hostile client can observe is built here, so the wire
//! shape stays consistent across the ordinary and framework-fault entry
//! points. Status body texts mirror classic server error pages.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::Stream;
use std::convert::Infallible;

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 Not Found").into_response()
}

pub fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, "400 Bad Request").into_response()
}

pub fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "500 Internal Server Error",
    )
        .into_response()
}

/// Decoy payload response: exact bytes, advertised length, permissive CORS so
/// browser-driven scanners read it too.
pub fn honeypot(payload: Bytes) -> Response {
    let len = payload.len();
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain".to_string()),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
            (header::CONTENT_LENGTH, len.to_string()),
        ],
        Body::from(payload),
    )
        .into_response()
}

/// Tarpit response: the 200 status goes out immediately, the body streams
/// until the chunk ceiling or peer disconnect.
pub fn tarpit<S>(stream: S) -> Response
where
    S: Stream<Item = Result<Bytes, Infallible>> + Send + 'static,
{
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        Body::from_stream(stream),
    )
        .into_response()
}

/// Replayed CONNECT resolution.
pub fn connect_resolved(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        body,
    )
        .into_response()
}

/// `robots.txt` body served outside the pipeline: nothing here is worth
/// classifying.
pub fn robots() -> Response {
    (StatusCode::OK, "User-agent: *\nDisallow: /").into_response()
}

/// `sitemap.xml` body served outside the pipeline.
pub fn sitemap() -> Response {
    (StatusCode::OK, "<?xml version='1.0' encoding='UTF-8'?>").into_response()
}
