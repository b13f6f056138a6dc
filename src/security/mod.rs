//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound headers  → headers.rs (request whitelist) → upstream
//! Upstream headers → headers.rs (response whitelist + CORS) → client
//! Static path      → paths.rs (decode, confine to root) → file system
//! ```
//!
//! # Design Decisions
//! - Whitelists, never blacklists: unknown headers never cross the relay
//! - Path confinement happens before any file system access

pub mod headers;
pub mod paths;
