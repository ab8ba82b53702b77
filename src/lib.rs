//! Logging HTTP proxy library.
//!
//! Every request is fetched from the URL in its request target and
//! relayed back, and every exchange produces one JSON log line.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::ProxyConfig;
pub use http::{with_logging, HttpServer, LoggingDecorator, ResponseObserver};
pub use lifecycle::Shutdown;
pub use observability::Logger;
