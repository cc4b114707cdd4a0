//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatch path produces:
//!     → tracing events (request ID on every line)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The request ID flows through every log line and upstream hop
//! - Metric updates are cheap (atomic increments)
//! - The subscriber itself is configured at startup in main

pub mod metrics;
