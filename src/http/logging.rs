//! Request logging decorator.
//!
//! # Responsibilities
//! - Time each invocation of the wrapped handler
//! - Observe status and size through a [`ResponseObserver`]
//! - Emit exactly one `request completed` record per invocation
//!
//! # Design Decisions
//! - The record is emitted after the wrapped handler returns
//! - The request and the response pass through untouched
//! - Log delivery is best-effort; nothing is propagated to the caller

use std::time::{Duration, Instant};

use axum::{body::Bytes, http::Request};

use crate::http::handler::{Handler, HandlerFuture};
use crate::http::observer::{ResponseObserver, ResponseRecord};
use crate::http::writer::ResponseWriter;
use crate::observability::Logger;

/// Wrap `handler` so every invocation is logged through `logger`.
pub fn with_logging<H: Handler>(handler: H, logger: Logger) -> LoggingDecorator<H> {
    LoggingDecorator::new(handler, logger)
}

/// A [`Handler`] that logs one structured record per request.
#[derive(Debug, Clone)]
pub struct LoggingDecorator<H> {
    inner: H,
    logger: Logger,
}

impl<H> LoggingDecorator<H> {
    pub fn new(inner: H, logger: Logger) -> Self {
        Self { inner, logger }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    fn emit(&self, request: &Request<Bytes>, record: ResponseRecord, elapsed: Duration) {
        let duration_ns = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.logger.in_scope(|| {
            tracing::info!(
                uri = %request.uri(),
                method = %request.method(),
                status = record.status_code(),
                duration_ns,
                size = record.bytes_written(),
                "request completed"
            );
        });
    }
}

impl<H: Handler> Handler for LoggingDecorator<H> {
    fn serve<'a>(
        &'a self,
        request: &'a Request<Bytes>,
        writer: &'a mut dyn ResponseWriter,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let start = Instant::now();
            let mut observer = ResponseObserver::new(writer);

            self.inner.serve(request, &mut observer).await;

            let elapsed = start.elapsed();
            self.emit(request, observer.into_record(), elapsed);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handler::handler_fn;
    use crate::http::writer::BufferedResponse;
    use crate::observability::logging::testing::{capture, Captured};
    use axum::http::{Method, StatusCode};
    use tracing_subscriber::filter::LevelFilter;

    fn request(method: Method, uri: &str) -> Request<Bytes> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())
            .unwrap()
    }

    /// Sleeps before answering, and checks nothing was logged while it ran.
    struct SlowHandler {
        delay: Duration,
        captured: Captured,
    }

    impl Handler for SlowHandler {
        fn serve<'a>(
            &'a self,
            _request: &'a Request<Bytes>,
            writer: &'a mut dyn ResponseWriter,
        ) -> HandlerFuture<'a> {
            Box::pin(async move {
                tokio::time::sleep(self.delay).await;
                assert!(self.captured.records().is_empty());
                writer.write_status(StatusCode::NO_CONTENT);
            })
        }
    }

    #[tokio::test]
    async fn test_success_is_logged() {
        let (logger, captured) = capture(LevelFilter::INFO);
        let handler = with_logging(
            handler_fn(|_req, w| {
                w.write_status(StatusCode::OK);
                w.write_all(b"hello").unwrap();
            }),
            logger,
        );

        let req = request(Method::GET, "http://example.com/greeting?lang=en");
        let mut writer = BufferedResponse::new();
        handler.serve(&req, &mut writer).await;

        assert_eq!(writer.status(), Some(StatusCode::OK));
        assert_eq!(writer.body(), b"hello");

        let records = captured.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["msg"], "request completed");
        assert_eq!(record["level"], "info");
        assert_eq!(record["uri"], "http://example.com/greeting?lang=en");
        assert_eq!(record["method"], "GET");
        assert_eq!(record["status"], 200);
        assert_eq!(record["size"], 5);
        assert!(record["duration_ns"].is_u64());
    }

    #[tokio::test]
    async fn test_missing_status_is_logged_as_zero() {
        let (logger, captured) = capture(LevelFilter::INFO);
        let handler = with_logging(
            handler_fn(|_req, w| {
                w.write_all(b"abc").unwrap();
                w.write_all(b"de").unwrap();
            }),
            logger,
        );

        let req = request(Method::PUT, "/upload");
        let mut writer = BufferedResponse::new();
        handler.serve(&req, &mut writer).await;

        let record = &captured.records()[0];
        assert_eq!(record["status"], 0);
        assert_eq!(record["size"], 5);
        assert_eq!(record["method"], "PUT");
        assert_eq!(writer.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_response() {
        let (logger, captured) = capture(LevelFilter::INFO);
        let handler = with_logging(handler_fn(|_req, _w| {}), logger);

        let req = request(Method::DELETE, "/thing/1");
        handler.serve(&req, &mut BufferedResponse::new()).await;

        let record = &captured.records()[0];
        assert_eq!(record["status"], 0);
        assert_eq!(record["size"], 0);
        assert_eq!(record["uri"], "/thing/1");
    }

    #[tokio::test]
    async fn test_uri_is_logged_in_normalized_form() {
        let (logger, captured) = capture(LevelFilter::INFO);
        let handler = with_logging(handler_fn(|_req, _w| {}), logger);

        let req = request(Method::GET, "http://example.com?q=1");
        handler.serve(&req, &mut BufferedResponse::new()).await;

        assert_eq!(captured.records()[0]["uri"], "http://example.com/?q=1");
    }

    #[tokio::test]
    async fn test_logged_after_handler_returns_with_duration() {
        let (logger, captured) = capture(LevelFilter::INFO);
        let delay = Duration::from_millis(20);
        let handler = with_logging(
            SlowHandler {
                delay,
                captured: captured.clone(),
            },
            logger,
        );

        let req = request(Method::GET, "/slow");
        handler.serve(&req, &mut BufferedResponse::new()).await;

        let records = captured.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["status"], 204);
        let duration_ns = records[0]["duration_ns"].as_u64().unwrap();
        assert!(duration_ns >= delay.as_nanos() as u64);
    }

    #[tokio::test]
    async fn test_one_record_per_invocation() {
        let (logger, captured) = capture(LevelFilter::INFO);
        let handler = with_logging(handler_fn(|_req, w| w.write_status(StatusCode::OK)), logger);

        for i in 0..3 {
            let req = request(Method::GET, &format!("/n/{i}"));
            handler.serve(&req, &mut BufferedResponse::new()).await;
        }

        let uris: Vec<_> = captured
            .records()
            .iter()
            .map(|r| r["uri"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(uris, ["/n/0", "/n/1", "/n/2"]);
    }

    #[tokio::test]
    async fn test_request_passes_through_unmodified() {
        let (logger, _captured) = capture(LevelFilter::INFO);
        let handler = with_logging(
            handler_fn(|req, w| {
                let line = format!("{} {} {}", req.method(), req.uri(), req.body().len());
                w.write_all(line.as_bytes()).unwrap();
            }),
            logger,
        );

        let req = Request::builder()
            .method(Method::POST)
            .uri("http://example.com/echo")
            .body(Bytes::from_static(b"payload"))
            .unwrap();
        let mut writer = BufferedResponse::new();
        handler.serve(&req, &mut writer).await;

        assert_eq!(writer.body(), b"POST http://example.com/echo 7");
    }

    #[tokio::test]
    async fn test_decorators_nest() {
        let (outer_logger, outer) = capture(LevelFilter::INFO);
        let (inner_logger, inner) = capture(LevelFilter::INFO);
        let handler = with_logging(
            with_logging(
                handler_fn(|_req, w| {
                    w.write_status(StatusCode::ACCEPTED);
                    w.write_all(b"queued").unwrap();
                }),
                inner_logger,
            ),
            outer_logger,
        );

        let req = request(Method::POST, "/jobs");
        handler.serve(&req, &mut BufferedResponse::new()).await;

        for captured in [inner, outer] {
            let records = captured.records();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0]["status"], 202);
            assert_eq!(records[0]["size"], 6);
        }
    }

    #[tokio::test]
    async fn test_silenced_logger_does_not_affect_response() {
        let (logger, captured) = capture(LevelFilter::OFF);
        let handler = with_logging(
            handler_fn(|_req, w| {
                w.write_status(StatusCode::OK);
                w.write_all(b"still served").unwrap();
            }),
            logger,
        );

        let req = request(Method::GET, "/quiet");
        let mut writer = BufferedResponse::new();
        handler.serve(&req, &mut writer).await;

        assert!(captured.records().is_empty());
        assert_eq!(writer.body(), b"still served");
    }
}
