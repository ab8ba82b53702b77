//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Build logger → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     SIGINT / SIGTERM → Shutdown::trigger → server drains → Exit
//! ```
//!
//! # Design Decisions
//! - A failed bind is fatal; nothing is served half-configured
//! - Shutdown is a broadcast so any number of tasks can observe it

pub mod shutdown;

pub use shutdown::{wait_for_signal, Shutdown};
