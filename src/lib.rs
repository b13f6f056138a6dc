//! OpenAI API relay library.
//!
//! Answers CORS preflights, serves files from a static root and forwards
//! everything else to a fixed upstream API with whitelisted headers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod routing;
pub mod security;

pub use config::schema::RelayConfig;
pub use http::RelayServer;
pub use relay::RequestRelay;
