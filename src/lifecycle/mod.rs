//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Parse CLI → Load config → Validate → Init tracing → Build relay → Bind → Serve
//!
//! Shutdown (signals.rs → http::RelayServer::run):
//!     SIGTERM/SIGINT → Stop accepting → Drain in-flight requests → Exit
//! ```
//!
//! The server takes any future as its shutdown trigger, so tests stop it
//! with a oneshot channel instead of a signal.

pub mod signals;
