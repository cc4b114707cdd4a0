//! Upstream application registry.
//!
//! # Responsibilities
//! - Compile upstream configs into ready-to-use origins
//! - Look up the origin for the upstream name a resolution produced
//!
//! # Design Decisions
//! - Origins parsed once at startup; the request path only needs its
//!   scheme/authority swapped
//! - A malformed origin is logged and skipped, not fatal (validation
//!   rejects it long before this point)

use std::collections::HashMap;

use axum::http::uri::{Authority, Scheme};
use url::Url;

use crate::config::UpstreamConfig;

/// One upstream application with its origin pre-parsed for URI rewriting.
#[derive(Debug, Clone)]
pub struct Upstream {
    name: String,
    scheme: Scheme,
    authority: Authority,
}

impl Upstream {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

/// Name → upstream map, built once from configuration.
#[derive(Debug, Default)]
pub struct UpstreamMap {
    upstreams: HashMap<String, Upstream>,
}

impl UpstreamMap {
    /// Build the map from configuration.
    pub fn new(configs: &[UpstreamConfig]) -> Self {
        let mut upstreams = HashMap::with_capacity(configs.len());
        for config in configs {
            match parse_origin(&config.origin) {
                Ok((scheme, authority)) => {
                    upstreams.insert(
                        config.name.clone(),
                        Upstream {
                            name: config.name.clone(),
                            scheme,
                            authority,
                        },
                    );
                }
                Err(reason) => {
                    tracing::warn!(
                        upstream = %config.name,
                        origin = %config.origin,
                        %reason,
                        "Invalid upstream origin, skipping"
                    );
                }
            }
        }
        Self { upstreams }
    }

    /// Look up an upstream by name.
    pub fn get(&self, name: &str) -> Option<&Upstream> {
        let found = self.upstreams.get(name);
        if found.is_none() {
            tracing::debug!(upstream = %name, "Upstream not found in map");
        }
        found
    }

    pub fn len(&self) -> usize {
        self.upstreams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upstreams.is_empty()
    }

    /// All registered upstreams, for the admin API.
    pub fn all(&self) -> impl Iterator<Item = &Upstream> {
        self.upstreams.values()
    }
}

fn parse_origin(origin: &str) -> Result<(Scheme, Authority), String> {
    let url = Url::parse(origin).map_err(|e| e.to_string())?;

    let scheme: Scheme = url
        .scheme()
        .parse()
        .map_err(|_| format!("unsupported scheme {:?}", url.scheme()))?;
    let host = url.host_str().ok_or_else(|| "missing host".to_string())?;
    let rendered = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    let authority: Authority = rendered.parse().map_err(|e| format!("{}", e))?;

    Ok((scheme, authority))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: &str, origin: &str) -> UpstreamConfig {
        UpstreamConfig {
            name: name.to_string(),
            origin: origin.to_string(),
        }
    }

    #[test]
    fn test_lookup_by_name() {
        let map = UpstreamMap::new(&[
            config("admin", "http://127.0.0.1:9001"),
            config("users", "http://users.internal:8000"),
        ]);

        let admin = map.get("admin").unwrap();
        assert_eq!(admin.scheme().as_str(), "http");
        assert_eq!(admin.authority().as_str(), "127.0.0.1:9001");
        assert!(map.get("nope").is_none());
    }

    #[test]
    fn test_default_port_left_implicit() {
        let map = UpstreamMap::new(&[config("users", "http://users.internal")]);
        assert_eq!(map.get("users").unwrap().authority().as_str(), "users.internal");
    }

    #[test]
    fn test_malformed_origin_skipped() {
        let map = UpstreamMap::new(&[
            config("good", "http://127.0.0.1:9001"),
            config("bad", "not a url"),
        ]);

        assert_eq!(map.len(), 1);
        assert!(map.get("bad").is_none());
    }
}
