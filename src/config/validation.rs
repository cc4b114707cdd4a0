//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (mounts reference existing upstreams)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect unreachable mounts
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{GatewayConfig, MountConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("duplicate upstream name {name:?}")]
    DuplicateUpstream { name: String },

    #[error("upstream {name:?} has invalid origin {origin:?}: {reason}")]
    InvalidOrigin {
        name: String,
        origin: String,
        reason: String,
    },

    #[error("duplicate mount name {name:?} in table {table:?}")]
    DuplicateMount { table: String, name: String },

    #[error("mount {name:?} must declare exactly one of `upstream` or `routes`")]
    AmbiguousDestination { name: String },

    #[error("mount {name:?} references unknown upstream {upstream:?}")]
    UnknownUpstream { name: String, upstream: String },

    #[error("mount {name:?} has absolute prefix {prefix:?}; prefixes are matched without a leading '/'")]
    AbsolutePrefix { name: String, prefix: String },

    #[error("mount {shadowed:?} is unreachable: upstream mount {earlier:?} already matches every path it could")]
    ShadowedMount { earlier: String, shadowed: String },

    #[error("invalid {field} address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("admin API is enabled but api_key is empty")]
    EmptyAdminKey,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut upstream_names: HashSet<&str> = HashSet::new();
    for upstream in &config.upstreams {
        if !upstream_names.insert(upstream.name.as_str()) {
            errors.push(ValidationError::DuplicateUpstream {
                name: upstream.name.clone(),
            });
        }
        if let Err(reason) = check_origin(&upstream.origin) {
            errors.push(ValidationError::InvalidOrigin {
                name: upstream.name.clone(),
                origin: upstream.origin.clone(),
                reason,
            });
        }
    }

    validate_table("mounts", &config.mounts, &upstream_names, &mut errors);

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroValue {
            field: "listener.max_connections",
        });
    }

    for (field, value) in [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.idle_secs", config.timeouts.idle_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroValue { field });
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.admin.enabled {
        if config.admin.api_key.trim().is_empty() {
            errors.push(ValidationError::EmptyAdminKey);
        }
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field: "admin.bind_address",
                value: config.admin.bind_address.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check one table level, then recurse into sub-tables.
fn validate_table(
    table: &str,
    mounts: &[MountConfig],
    upstreams: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for mount in mounts {
        if !seen.insert(mount.name.as_str()) {
            errors.push(ValidationError::DuplicateMount {
                table: table.to_string(),
                name: mount.name.clone(),
            });
        }

        if mount.prefix.starts_with('/') {
            errors.push(ValidationError::AbsolutePrefix {
                name: mount.name.clone(),
                prefix: mount.prefix.clone(),
            });
        }

        match (&mount.upstream, &mount.routes) {
            (Some(upstream), None) => {
                if !upstreams.contains(upstream.as_str()) {
                    errors.push(ValidationError::UnknownUpstream {
                        name: mount.name.clone(),
                        upstream: upstream.clone(),
                    });
                }
            }
            (None, Some(routes)) => {
                validate_table(&mount.name, routes, upstreams, errors);
            }
            _ => {
                errors.push(ValidationError::AmbiguousDestination {
                    name: mount.name.clone(),
                });
            }
        }
    }

    // An upstream entry terminates the scan for every path it matches, so a
    // later entry whose prefix extends it can never be reached. Delegations
    // do not shadow: their sub-table misses fall through.
    for (i, earlier) in mounts.iter().enumerate() {
        if earlier.upstream.is_none() {
            continue;
        }
        for later in &mounts[i + 1..] {
            if later.prefix.starts_with(&earlier.prefix) {
                errors.push(ValidationError::ShadowedMount {
                    earlier: earlier.name.clone(),
                    shadowed: later.name.clone(),
                });
            }
        }
    }
}

/// An origin is scheme + authority only.
fn check_origin(origin: &str) -> Result<(), String> {
    let url = Url::parse(origin).map_err(|e| e.to_string())?;

    if url.scheme() != "http" {
        // Forwarding uses a plain HTTP client; TLS to upstreams is not supported
        return Err(format!("scheme must be http, got {:?}", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if !url.path().is_empty() && url.path() != "/" {
        return Err("origin must not carry a path".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("origin must not carry a query or fragment".to_string());
    }
    Ok(())
}
