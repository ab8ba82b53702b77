//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum catch-all, body buffering)
//!     → logging.rs (LoggingDecorator: timer + ResponseObserver)
//!     → proxy.rs (GET the request target, relay status and body)
//!     → writer.rs (BufferedResponse → axum Response)
//!     → Send to client
//! ```

pub mod handler;
pub mod logging;
pub mod observer;
pub mod proxy;
pub mod server;
pub mod writer;

pub use handler::{handler_fn, Handler, HandlerFn, HandlerFuture};
pub use logging::{with_logging, LoggingDecorator};
pub use observer::{ResponseObserver, ResponseRecord};
pub use proxy::ProxyHandler;
pub use server::{AppState, HttpServer, ServerError};
pub use writer::{BufferedResponse, ResponseWriter};
