//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all dispatch handler
//! - Wire up middleware (tracing, timeout, concurrency limit, request ID)
//! - Resolve each request path against the mount table
//! - Forward matched requests to the owning upstream application
//! - Map resolution failures to 404 and upstream failures to 502
//!
//! # Data Flow
//! 1. Request arrives, gets a request ID
//! 2. Path is normalized and resolved through the mount table
//! 3. URI is rewritten to the upstream origin, path and query untouched
//! 4. Upstream response is sanitized and streamed back

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::http::request::{RequestIdExt, RequestIdLayer, X_REQUEST_ID};
use crate::http::response;
use crate::http::upstream::{Upstream, UpstreamMap};
use crate::lifecycle::signals;
use crate::observability::metrics;
use crate::routing::{normalize_path, RouteTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub upstreams: Arc<UpstreamMap>,
    pub client: Client<HttpConnector, Body>,
    pub config: Arc<GatewayConfig>,
    pub started_at: Instant,
    pub request_count: Arc<AtomicU64>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// The mount table and upstream map are compiled here, once; they do
    /// not change for the life of the process.
    pub fn new(config: GatewayConfig) -> Self {
        let table = Arc::new(RouteTable::from_config(&config.mounts));
        let upstreams = Arc::new(UpstreamMap::new(&config.upstreams));

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(config.timeouts.idle_secs))
            .build(connector);

        let state = AppState {
            table,
            upstreams,
            client,
            config: Arc::new(config),
            started_at: Instant::now(),
            request_count: Arc::new(AtomicU64::new(0)),
        };

        let router = Self::build_router(&state);
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: &AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state.clone())
            .layer(TimeoutLayer::new(Duration::from_secs(
                state.config.timeouts.request_secs,
            )))
            .layer(ConcurrencyLimitLayer::new(state.config.listener.max_connections))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Shared state, for wiring up the admin API.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.state.config
    }

    /// Run the server until shutdown is signalled.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mounts = self.state.table.len(),
            upstreams = self.state.upstreams.len(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(signals::shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main dispatch handler.
/// Resolves the path through the mount table and forwards to the upstream.
async fn dispatch_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> impl IntoResponse {
    let start_time = Instant::now();
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let request_id = request
        .request_id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let method = request.method().clone();
    let raw_path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        peer = %peer,
        method = %method,
        path = %raw_path,
        "Dispatching request"
    );

    // 1. Resolve against the mount table
    let normalized = normalize_path(&raw_path);
    let (upstream_name, route_label) = match state.table.resolve(&normalized) {
        Ok(resolution) => {
            tracing::debug!(
                request_id = %request_id,
                route = %resolution.route_label(),
                upstream = %resolution.upstream(),
                remainder = %resolution.remainder(),
                "Route resolved"
            );
            (resolution.upstream().to_string(), resolution.route_label())
        }
        Err(err) => {
            tracing::warn!(request_id = %request_id, path = %raw_path, %err, "No route matched");
            metrics::record_unrouted();
            metrics::record_request("none", 404, start_time);
            return response::no_route(&request_id);
        }
    };

    // 2. Locate the upstream origin (validation guarantees it exists)
    let Some(upstream) = state.upstreams.get(&upstream_name) else {
        tracing::error!(
            request_id = %request_id,
            upstream = %upstream_name,
            "Resolved upstream has no registered origin"
        );
        metrics::record_request(&route_label, 500, start_time);
        return response::misconfigured(&request_id);
    };

    // 3. Forward, streaming the body both ways
    match forward(&state, upstream, request, &request_id).await {
        Ok(resp) => {
            metrics::record_request(&route_label, resp.status().as_u16(), start_time);
            resp
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                upstream = %upstream.name(),
                error = %e,
                "Upstream error"
            );
            metrics::record_request(&route_label, 502, start_time);
            response::bad_gateway(&request_id)
        }
    }
}

/// Rewrite the request URI to the upstream origin and send it.
///
/// Only scheme and authority change; path and query reach the upstream
/// exactly as the client sent them.
async fn forward(
    state: &AppState,
    upstream: &Upstream,
    request: Request<Body>,
    request_id: &str,
) -> Result<Response, hyper_util::client::legacy::Error> {
    let (mut parts, body) = request.into_parts();

    let original_uri = parts.uri.clone();
    let mut uri_parts = original_uri.clone().into_parts();
    uri_parts.scheme = Some(upstream.scheme().clone());
    uri_parts.authority = Some(upstream.authority().clone());
    parts.uri = Uri::from_parts(uri_parts).unwrap_or(original_uri);

    // Make sure the request ID travels with the upstream request
    if let Ok(value) = header::HeaderValue::from_str(request_id) {
        parts.headers.insert(X_REQUEST_ID, value);
    }

    let outbound = Request::from_parts(parts, body);
    let upstream_response = state.client.request(outbound).await?;

    Ok(response::from_upstream(upstream_response, request_id))
}
