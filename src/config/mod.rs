//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → optional TOML file (loader.rs)
//!     → environment overrides (PORT, LOG_LEVEL, ...)
//!     → CLI flag overrides (main.rs)
//!     → ProxyConfig (immutable for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an empty environment is a valid config
//! - Loading is separated from the process environment for testability

pub mod loader;
pub mod schema;

pub use loader::{load, ConfigError};
pub use schema::{ListenerConfig, ObservabilityConfig, ProxyConfig, UpstreamConfig};
