//! Request identity.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) as early as possible
//! - Preserve an ID supplied by the caller instead of overwriting it
//! - Expose the ID to handlers through request extensions
//!
//! # Design Decisions
//! - The ID rides both the header (so upstreams and clients see it)
//!   and the extensions map (so handlers avoid re-parsing headers)

use std::task::{Context, Poll};

use axum::http::{HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the request ID end to end.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Unique identifier attached to every request passing through the gateway.
#[derive(Debug, Clone)]
pub struct RequestId(String);

impl RequestId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read the request ID off a request.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Middleware layer that stamps every request with an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service that assigns the ID header and extension, then delegates.
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        let id = match request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
        {
            Some(existing) => RequestId(existing.to_string()),
            None => {
                let id = RequestId::generate();
                if let Ok(value) = HeaderValue::from_str(id.as_str()) {
                    request.headers_mut().insert(X_REQUEST_ID, value);
                }
                id
            }
        };
        request.extensions_mut().insert(id);
        self.inner.call(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::future::{ready, Ready};

    /// Inner service that hands the request straight back for inspection.
    struct Echo;

    impl<B> Service<Request<B>> for Echo {
        type Response = Request<B>;
        type Error = Infallible;
        type Future = Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, request: Request<B>) -> Self::Future {
            ready(Ok(request))
        }
    }

    #[tokio::test]
    async fn test_assigns_id_when_missing() {
        let mut service = RequestIdLayer.layer(Echo);
        let request = Request::builder().uri("/login/").body(()).unwrap();

        let seen = service.call(request).await.unwrap();

        let header = seen.headers().get(X_REQUEST_ID).unwrap().to_str().unwrap();
        let extension = seen.request_id().unwrap();
        assert_eq!(header, extension.as_str());
        assert!(!header.is_empty());
    }

    #[tokio::test]
    async fn test_preserves_caller_supplied_id() {
        let mut service = RequestIdLayer.layer(Echo);
        let request = Request::builder()
            .uri("/login/")
            .header(X_REQUEST_ID, "caller-chose-this")
            .body(())
            .unwrap();

        let seen = service.call(request).await.unwrap();

        assert_eq!(
            seen.headers().get(X_REQUEST_ID).unwrap(),
            "caller-chose-this"
        );
        assert_eq!(seen.request_id().unwrap().as_str(), "caller-chose-this");
    }
}
