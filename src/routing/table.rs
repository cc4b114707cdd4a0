//! Route table and lookup.
//!
//! # Responsibilities
//! - Store the compiled mount table
//! - Resolve a request path to its destination upstream
//! - Return the resolution or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Entries tested in declaration order; first match wins
//! - A sub-table miss falls through to the next entry at the same level
//! - Explicit `NoRouteMatched` rather than a silent default destination

use serde::Serialize;
use thiserror::Error;

use crate::config::schema::MountConfig;
use crate::routing::matcher::PathPrefix;

/// Where a matched request goes.
#[derive(Debug, Clone)]
pub enum Destination {
    /// Forward to the named upstream application. Its internal routing is
    /// opaque to the gateway.
    Upstream(String),
    /// Delegate to a nested table owned by another application. A miss in
    /// the nested table falls through to the next mount.
    Table(RouteTable),
}

/// One ordered entry of a route table.
#[derive(Debug, Clone)]
pub struct Mount {
    name: String,
    prefix: PathPrefix,
    destination: Destination,
}

impl Mount {
    /// Mount an upstream application at a prefix.
    pub fn upstream(
        name: impl Into<String>,
        prefix: impl Into<String>,
        upstream: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prefix: PathPrefix::new(prefix.into()),
            destination: Destination::Upstream(upstream.into()),
        }
    }

    /// Mount a nested sub-table at a prefix.
    pub fn table(name: impl Into<String>, prefix: impl Into<String>, table: RouteTable) -> Self {
        Self {
            name: name.into(),
            prefix: PathPrefix::new(prefix.into()),
            destination: Destination::Table(table),
        }
    }

    /// Mount identifier, used in logs and metrics labels.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &PathPrefix {
        &self.prefix
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }
}

/// Error type for route lookup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    /// Every entry (and every nested sub-table) was exhausted without a
    /// match. The HTTP layer maps this to 404.
    #[error("no route matched path {path:?}")]
    NoRouteMatched { path: String },
}

/// A successful lookup.
///
/// Borrows from the table and the looked-up path; callers that need to keep
/// it pull out the pieces they want.
#[derive(Debug, PartialEq, Eq)]
pub struct Resolution<'a> {
    upstream: &'a str,
    trail: Vec<&'a str>,
    remainder: &'a str,
}

impl<'a> Resolution<'a> {
    /// Name of the upstream application the request forwards to.
    pub fn upstream(&self) -> &'a str {
        self.upstream
    }

    /// Mount names traversed to reach the destination, outermost first.
    pub fn trail(&self) -> &[&'a str] {
        &self.trail
    }

    /// What is left of the path after the matched literal prefixes.
    pub fn remainder(&self) -> &'a str {
        self.remainder
    }

    /// Dotted trail, e.g. `users.login`, used as the route label.
    pub fn route_label(&self) -> String {
        self.trail.join(".")
    }
}

/// The ordered, process-wide mount table.
///
/// Built once at startup from validated configuration and shared read-only
/// for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    mounts: Vec<Mount>,
}

impl RouteTable {
    /// Build a table from already-compiled mounts, preserving order.
    pub fn new(mounts: Vec<Mount>) -> Self {
        Self { mounts }
    }

    /// Compile a table from configuration.
    ///
    /// Assumes the config passed validation; a malformed entry that slipped
    /// through is logged and skipped rather than panicking the process.
    pub fn from_config(mounts: &[MountConfig]) -> Self {
        let mut compiled = Vec::with_capacity(mounts.len());
        for mount in mounts {
            let destination = match (&mount.upstream, &mount.routes) {
                (Some(upstream), None) => Destination::Upstream(upstream.clone()),
                (None, Some(routes)) => Destination::Table(RouteTable::from_config(routes)),
                (Some(upstream), Some(_)) => {
                    tracing::warn!(
                        mount = %mount.name,
                        "mount declares both an upstream and a sub-table; using the upstream"
                    );
                    Destination::Upstream(upstream.clone())
                }
                (None, None) => {
                    tracing::warn!(
                        mount = %mount.name,
                        "mount declares neither an upstream nor a sub-table; skipping"
                    );
                    continue;
                }
            };
            compiled.push(Mount {
                name: mount.name.clone(),
                prefix: PathPrefix::new(mount.prefix.as_str()),
                destination,
            });
        }
        Self { mounts: compiled }
    }

    /// The ordered entries of this table.
    pub fn mounts(&self) -> &[Mount] {
        &self.mounts
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    /// Resolve a normalized path to its destination.
    ///
    /// Pure lookup: no side effects, and the same path always resolves to
    /// the same destination.
    pub fn resolve<'a>(&'a self, path: &'a str) -> Result<Resolution<'a>, RouteError> {
        self.lookup(path).ok_or_else(|| RouteError::NoRouteMatched {
            path: path.to_string(),
        })
    }

    fn lookup<'a>(&'a self, path: &'a str) -> Option<Resolution<'a>> {
        for mount in &self.mounts {
            let Some(rest) = mount.prefix.strip(path) else {
                continue;
            };
            match &mount.destination {
                Destination::Upstream(upstream) => {
                    return Some(Resolution {
                        upstream: upstream.as_str(),
                        trail: vec![mount.name.as_str()],
                        remainder: rest,
                    });
                }
                Destination::Table(table) => {
                    if let Some(mut hit) = table.lookup(rest) {
                        hit.trail.insert(0, mount.name.as_str());
                        return Some(hit);
                    }
                    // Sub-table reported no match: keep scanning.
                }
            }
        }
        None
    }

    /// Flatten the table into displayable lines for the admin API and CLI.
    ///
    /// Each routable endpoint becomes one line; a delegation whose sub-table
    /// is still empty is listed with no upstream so it stays visible.
    pub fn flatten(&self) -> Vec<FlatRoute> {
        let mut out = Vec::new();
        self.flatten_into("", "", &mut out);
        out
    }

    fn flatten_into(&self, trail: &str, prefix: &str, out: &mut Vec<FlatRoute>) {
        for mount in &self.mounts {
            let full_trail = if trail.is_empty() {
                mount.name.clone()
            } else {
                format!("{}.{}", trail, mount.name)
            };
            let full_prefix = format!("{}{}", prefix, mount.prefix.as_str());
            match &mount.destination {
                Destination::Upstream(upstream) => out.push(FlatRoute {
                    trail: full_trail,
                    prefix: full_prefix,
                    upstream: Some(upstream.clone()),
                }),
                Destination::Table(table) if table.is_empty() => out.push(FlatRoute {
                    trail: full_trail,
                    prefix: full_prefix,
                    upstream: None,
                }),
                Destination::Table(table) => {
                    table.flatten_into(&full_trail, &full_prefix, out);
                }
            }
        }
    }
}

/// One line of the flattened table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatRoute {
    /// Dotted mount trail, e.g. `users.login`.
    pub trail: String,
    /// Accumulated literal prefix from the root.
    pub prefix: String,
    /// Destination upstream; `None` for an empty delegation.
    pub upstream: Option<String>,
}
