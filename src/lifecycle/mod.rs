//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Compile table → Bind listeners → Serve
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast on startup: a config or bind error is fatal
//! - One shutdown coordinator fans out to every server task
//! - No reload path: route changes require a restart

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
