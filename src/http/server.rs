//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with a catch-all route
//! - Buffer each inbound request body
//! - Run every request, accepted or rejected, through the logging decorator
//! - Hand the request and a fresh [`BufferedResponse`] to the handler
//! - Serve until shutdown is signalled

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Request, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::ProxyConfig;
use crate::http::handler::{Handler, HandlerFuture};
use crate::http::logging::{with_logging, LoggingDecorator};
use crate::http::proxy::ProxyHandler;
use crate::http::writer::{BufferedResponse, ResponseWriter};
use crate::observability::Logger;

/// Error type for server operations.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Request extension marking a body that could not be buffered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectedBody {
    pub status: StatusCode,
}

/// Answers requests carrying [`RejectedBody`] with its status, and passes
/// everything else to the wrapped handler.
pub struct BodyGuard {
    inner: Arc<dyn Handler>,
}

impl BodyGuard {
    pub fn new(inner: Arc<dyn Handler>) -> Self {
        Self { inner }
    }
}

impl Handler for BodyGuard {
    fn serve<'a>(
        &'a self,
        request: &'a Request<Bytes>,
        writer: &'a mut dyn ResponseWriter,
    ) -> HandlerFuture<'a> {
        match request.extensions().get::<RejectedBody>() {
            Some(rejected) => {
                let status = rejected.status;
                Box::pin(async move { writer.write_status(status) })
            }
            None => self.inner.serve(request, writer),
        }
    }
}

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<LoggingDecorator<BodyGuard>>,
    pub max_body_bytes: usize,
    pub logger: Logger,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    logger: Logger,
}

impl HttpServer {
    /// Create a server running the proxy handler.
    pub fn new(config: &ProxyConfig, logger: Logger) -> Result<Self, ServerError> {
        let proxy = ProxyHandler::new(&config.upstream, logger.clone())?;
        Ok(Self::with_handler(config, Arc::new(proxy), logger))
    }

    /// Create a server running `handler` behind the logging decorator.
    pub fn with_handler(config: &ProxyConfig, handler: Arc<dyn Handler>, logger: Logger) -> Self {
        let state = AppState {
            handler: Arc::new(with_logging(BodyGuard::new(handler), logger.clone())),
            max_body_bytes: config.listener.max_body_bytes,
            logger: logger.clone(),
        };
        Self {
            router: Self::build_router(state),
            logger,
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(dispatch))
            .route("/{*path}", any(dispatch))
            .with_state(state)
    }

    /// The router, for serving or driving directly.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        self.logger
            .in_scope(|| tracing::info!(address = %addr, "HTTP server starting"));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        self.logger.in_scope(|| tracing::info!("HTTP server stopped"));
        Ok(())
    }
}

/// Buffer the request, run the handler, and return what it wrote.
///
/// A body over the limit is answered `413`, any other read failure `400`.
/// Both still pass through the decorator so they are logged.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (mut parts, body) = request.into_parts();
    let body = match Limited::new(body, state.max_body_bytes).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            let status = if err.downcast_ref::<LengthLimitError>().is_some() {
                StatusCode::PAYLOAD_TOO_LARGE
            } else {
                StatusCode::BAD_REQUEST
            };
            state.logger.in_scope(|| {
                tracing::warn!(
                    uri = %parts.uri,
                    limit = state.max_body_bytes,
                    error = %err,
                    "Failed to buffer request body"
                );
            });
            parts.extensions.insert(RejectedBody { status });
            Bytes::new()
        }
    };
    let request = Request::from_parts(parts, body);

    let mut writer = BufferedResponse::with_logger(state.logger.clone());
    state.handler.serve(&request, &mut writer).await;
    writer.into_response()
}
