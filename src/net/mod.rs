//! Network layer subsystem.
//!
//! Binds the TCP listener the HTTP server accepts on. Per-connection
//! handling belongs to Axum; no extra connection limits are applied here.

pub mod listener;

pub use listener::{bind, ListenerError};
