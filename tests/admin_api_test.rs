//! Admin API tests: bearer auth, table listing, dry-run resolution.

use std::time::Duration;

use exchange_gateway::admin::setup_admin_router;
use exchange_gateway::config::{GatewayConfig, MountConfig, UpstreamConfig};
use exchange_gateway::http::HttpServer;
use serde_json::Value;

mod common;

const API_KEY: &str = "test-key-123";

fn upstream(name: &str, origin: &str) -> UpstreamConfig {
    UpstreamConfig {
        name: name.to_string(),
        origin: origin.to_string(),
    }
}

fn claim(name: &str, prefix: &str, upstream: &str) -> MountConfig {
    MountConfig {
        name: name.to_string(),
        prefix: prefix.to_string(),
        upstream: Some(upstream.to_string()),
        routes: None,
    }
}

fn delegation(name: &str, routes: Vec<MountConfig>) -> MountConfig {
    MountConfig {
        name: name.to_string(),
        prefix: String::new(),
        upstream: None,
        routes: Some(routes),
    }
}

/// Standard table with populated sub-tables, upstreams pointed at origins
/// nothing in these tests ever connects to.
fn populated_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.admin.api_key = API_KEY.to_string();
    config.upstreams = vec![
        upstream("admin", "http://127.0.0.1:9001"),
        upstream("dashboard", "http://127.0.0.1:9002"),
        upstream("users", "http://127.0.0.1:9003"),
        upstream("trading", "http://127.0.0.1:9004"),
        upstream("metrics", "http://127.0.0.1:9005"),
    ];
    config.mounts = vec![
        claim("admin", "admin/", "admin"),
        delegation(
            "dashboard",
            vec![claim("portfolio", "portfolio/", "dashboard")],
        ),
        delegation(
            "users",
            vec![
                claim("login", "login/", "users"),
                claim("signup", "signup/", "users"),
            ],
        ),
        delegation("trading", vec![claim("orders", "orders/", "trading")]),
        delegation("metrics", vec![claim("metrics", "metrics", "metrics")]),
    ];
    config
}

/// Serve only the admin router, the way main wires it onto its own listener.
async fn start_admin(config: GatewayConfig) -> String {
    let server = HttpServer::new(config);
    let router = setup_admin_router(server.state());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    format!("http://{}", addr)
}

fn bearer(key: &str) -> String {
    format!("Bearer {}", key)
}

#[tokio::test]
async fn test_admin_requires_bearer_key() {
    let url = start_admin(populated_config()).await;
    let client = common::test_client();

    let res = client
        .get(format!("{}/admin/status", url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let res = client
        .get(format!("{}/admin/status", url))
        .header("authorization", bearer("wrong-key"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let res = client
        .get(format!("{}/admin/status", url))
        .header("authorization", bearer(API_KEY))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "operational");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_routes_listing_in_match_order() {
    let url = start_admin(populated_config()).await;
    let client = common::test_client();

    let res = client
        .get(format!("{}/admin/routes", url))
        .header("authorization", bearer(API_KEY))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let routes: Vec<Value> = res.json().await.unwrap();
    let trails: Vec<&str> = routes
        .iter()
        .map(|route| route["trail"].as_str().unwrap())
        .collect();
    assert_eq!(
        trails,
        [
            "admin",
            "dashboard.portfolio",
            "users.login",
            "users.signup",
            "trading.orders",
            "metrics.metrics",
        ]
    );

    assert_eq!(routes[0]["prefix"], "admin/");
    assert_eq!(routes[0]["upstream"], "admin");
}

#[tokio::test]
async fn test_empty_delegations_listed_without_upstream() {
    // the built-in default table ships its delegations empty
    let mut config = GatewayConfig::default();
    config.admin.api_key = API_KEY.to_string();

    let url = start_admin(config).await;
    let client = common::test_client();

    let res = client
        .get(format!("{}/admin/routes", url))
        .header("authorization", bearer(API_KEY))
        .send()
        .await
        .unwrap();
    let routes: Vec<Value> = res.json().await.unwrap();

    assert_eq!(routes.len(), 5);
    assert_eq!(routes[0]["trail"], "admin");
    assert!(routes[0]["upstream"].is_string());
    for route in &routes[1..] {
        assert!(route["upstream"].is_null());
    }
}

#[tokio::test]
async fn test_resolve_dry_run() {
    let url = start_admin(populated_config()).await;
    let client = common::test_client();

    let res = client
        .get(format!("{}/admin/resolve", url))
        .query(&[("path", "//admin///orders/7/")])
        .header("authorization", bearer(API_KEY))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let report: Value = res.json().await.unwrap();
    assert_eq!(report["path"], "//admin///orders/7/");
    assert_eq!(report["normalized"], "admin/orders/7/");
    assert_eq!(report["outcome"]["result"], "matched");
    assert_eq!(report["outcome"]["route"], "admin");
    assert_eq!(report["outcome"]["upstream"], "admin");
    assert_eq!(report["outcome"]["remainder"], "orders/7/");

    let res = client
        .get(format!("{}/admin/resolve", url))
        .query(&[("path", "/nothing-here/")])
        .header("authorization", bearer(API_KEY))
        .send()
        .await
        .unwrap();
    let report: Value = res.json().await.unwrap();
    assert_eq!(report["outcome"]["result"], "no_match");
}
