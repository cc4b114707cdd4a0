//! HTTP dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch handler)
//!     → request.rs (add request ID)
//!     → [mount table resolves the owning upstream]
//!     → upstream.rs (name → origin)
//!     → response.rs (sanitize, echo request ID)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod upstream;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
pub use upstream::{Upstream, UpstreamMap};
