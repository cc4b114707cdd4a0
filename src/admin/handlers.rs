use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;

use crate::http::server::AppState;
use crate::routing::{normalize_path, FlatRoute};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
    pub requests_total: u64,
}

#[derive(Serialize)]
pub struct UpstreamStatus {
    pub name: String,
    pub origin: String,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: state.started_at.elapsed().as_secs(),
        requests_total: state.request_count.load(Ordering::Relaxed),
    })
}

/// The mount table, flattened in declaration order.
pub async fn get_routes(State(state): State<AppState>) -> Json<Vec<FlatRoute>> {
    Json(state.table.flatten())
}

pub async fn get_upstreams(State(state): State<AppState>) -> Json<Vec<UpstreamStatus>> {
    let mut statuses: Vec<UpstreamStatus> = state
        .upstreams
        .all()
        .map(|upstream| UpstreamStatus {
            name: upstream.name().to_string(),
            origin: format!("{}://{}", upstream.scheme(), upstream.authority()),
        })
        .collect();
    // HashMap order is arbitrary; keep the output stable
    statuses.sort_by(|a, b| a.name.cmp(&b.name));
    Json(statuses)
}

#[derive(Deserialize)]
pub struct ResolveParams {
    pub path: String,
}

#[derive(Serialize)]
pub struct ResolveReport {
    pub path: String,
    pub normalized: String,
    pub outcome: ResolveOutcome,
}

#[derive(Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ResolveOutcome {
    Matched {
        route: String,
        upstream: String,
        remainder: String,
    },
    NoMatch,
}

/// Dry-run a path through the mount table without forwarding anything.
pub async fn resolve_path(
    State(state): State<AppState>,
    Query(params): Query<ResolveParams>,
) -> Json<ResolveReport> {
    let normalized = normalize_path(&params.path).into_owned();
    let outcome = match state.table.resolve(&normalized) {
        Ok(resolution) => ResolveOutcome::Matched {
            route: resolution.route_label(),
            upstream: resolution.upstream().to_string(),
            remainder: resolution.remainder().to_string(),
        },
        Err(_) => ResolveOutcome::NoMatch,
    };

    Json(ResolveReport {
        path: params.path,
        normalized,
        outcome,
    })
}
