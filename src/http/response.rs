//! Response handling and transformation.
//!
//! # Responsibilities
//! - Transform upstream responses for the client
//! - Strip hop-by-hop headers
//! - Echo the request ID on every response, including errors
//! - Map dispatch failures to gateway status codes
//!
//! # Design Decisions
//! - Upstream bodies are streamed through, never buffered
//! - An unmatched path is a plain 404; the client cannot tell which
//!   table level declined it

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use hyper::body::Incoming;

use crate::http::request::X_REQUEST_ID;

/// Hop-by-hop headers that must not be forwarded (RFC 9110 section 7.6.1).
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Convert an upstream response into the client response, streaming the body.
pub fn from_upstream(response: hyper::Response<Incoming>, request_id: &str) -> Response {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    set_request_id(&mut parts.headers, request_id);
    Response::from_parts(parts, Body::new(body))
}

/// 404 for a path no mount claimed.
pub fn no_route(request_id: &str) -> Response {
    with_request_id(
        (StatusCode::NOT_FOUND, "no route matched").into_response(),
        request_id,
    )
}

/// 502 when the upstream could not be reached or misbehaved.
pub fn bad_gateway(request_id: &str) -> Response {
    with_request_id(
        (StatusCode::BAD_GATEWAY, "upstream request failed").into_response(),
        request_id,
    )
}

/// 500 when a resolved upstream name has no registered origin.
///
/// Config validation rejects dangling names, so reaching this means the
/// process is running with a broken table.
pub fn misconfigured(request_id: &str) -> Response {
    with_request_id(
        (StatusCode::INTERNAL_SERVER_ERROR, "gateway misconfigured").into_response(),
        request_id,
    )
}

fn with_request_id(mut response: Response, request_id: &str) -> Response {
    set_request_id(response.headers_mut(), request_id);
    response
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

fn set_request_id(headers: &mut HeaderMap, request_id: &str) {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        headers.insert(X_REQUEST_ID, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hop_by_hop_headers_removed() {
        let mut headers = HeaderMap::new();
        headers.insert("connection", HeaderValue::from_static("keep-alive"));
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        headers.insert("content-type", HeaderValue::from_static("text/html"));

        strip_hop_by_hop(&mut headers);

        assert!(headers.get("connection").is_none());
        assert!(headers.get("transfer-encoding").is_none());
        assert_eq!(headers.get("content-type").unwrap(), "text/html");
    }

    #[test]
    fn test_error_responses_carry_request_id() {
        for response in [
            no_route("req-1"),
            bad_gateway("req-1"),
            misconfigured("req-1"),
        ] {
            assert_eq!(response.headers().get(X_REQUEST_ID).unwrap(), "req-1");
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(no_route("id").status(), StatusCode::NOT_FOUND);
        assert_eq!(bad_gateway("id").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(misconfigured("id").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
