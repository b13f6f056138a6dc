//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (route selection)
//!     → matcher.rs (static segment check)
//!     → Return: Preflight | StaticFile | Upstream
//! ```
//!
//! # Design Decisions
//! - Router built at startup, immutable at runtime
//! - Deterministic: same input always yields the same route

pub mod matcher;
pub mod router;

pub use router::{Route, Router};
