//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → matcher.rs (normalize, prefix match, strip remainder)
//!     → table.rs (ordered walk, sub-table fallthrough)
//!     → Return: Resolution or NoRouteMatched
//!
//! Table compilation (at startup):
//!     MountConfig[]
//!     → Compile prefixes and nested tables in declared order
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Table compiled at startup, immutable at runtime
//! - No regex in the hot path (literal prefix matching only)
//! - Deterministic: same path always resolves to the same destination
//! - First match wins; order is the only priority mechanism

pub mod matcher;
pub mod table;

pub use matcher::{normalize_path, PathPrefix};
pub use table::{Destination, FlatRoute, Mount, Resolution, RouteError, RouteTable};
