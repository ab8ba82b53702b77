//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http::logging (request completed) ─┐
//! http::proxy   (upstream warnings) ─┼─▶ Logger (tracing Dispatch)
//! main          (bootstrap events)  ─┘       → JsonLineFormat
//!                                            → MakeWriter (stdout in production)
//! ```
//!
//! # Design Decisions
//! - The logger is an explicit handle, not a process-global singleton
//! - One JSON object per line, keys sorted, `msg`/`level`/`time` reserved

pub mod logging;

pub use logging::{level_or_default, parse_level, JsonLineFormat, Logger};
