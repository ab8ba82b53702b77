//! The response-writing capability handed to handlers.
//!
//! # Responsibilities
//! - Define [`ResponseWriter`], the seam every handler writes through
//! - Provide [`BufferedResponse`], the writer the server uses per request
//!
//! # Design Decisions
//! - The status is committed by the first `write_status` or the first body
//!   write (implicit `200 OK`); later status writes are ignored
//! - The full body is buffered and turned into one `Response`
//! - Ignored status writes are reported at debug level through the attached
//!   [`Logger`], or the current dispatcher when none is attached

use std::io;

use axum::{
    body::Body,
    http::{HeaderMap, Response, StatusCode},
    response::IntoResponse,
};

use crate::observability::Logger;

/// Writes one HTTP response.
pub trait ResponseWriter: Send {
    /// Response headers. Not observed by wrappers.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Set the response status.
    fn write_status(&mut self, status: StatusCode);

    /// Write body bytes, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Write the whole buffer through repeated [`write`](Self::write) calls.
    fn write_all(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.write(buf) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => buf = &buf[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// In-memory response with commit-once status semantics.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
    logger: Option<Logger>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// A response that reports ignored status writes to `logger`.
    pub fn with_logger(logger: Logger) -> Self {
        Self {
            logger: Some(logger),
            ..Self::default()
        }
    }

    /// The committed status, if any write has happened yet.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn is_committed(&self) -> bool {
        self.status.is_some()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Convert into a response. An uncommitted response becomes `200 OK`.
    pub fn into_response(self) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        if let Some(committed) = self.status {
            let report = || {
                tracing::debug!(
                    committed = %committed,
                    ignored = %status,
                    "Superfluous write_status call"
                )
            };
            match &self.logger {
                Some(logger) => logger.in_scope(report),
                None => report(),
            }
            return;
        }
        self.status = Some(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> axum::response::Response {
        BufferedResponse::into_response(self)
    }
}
