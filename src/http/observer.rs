//! Response observation.
//!
//! [`ResponseObserver`] sits between a handler and the real writer. Every
//! call is delegated first; the status and byte count are recorded from
//! what the delegate saw, and the delegate's results are returned
//! unchanged.

use std::io;

use axum::http::{HeaderMap, StatusCode};

use crate::http::writer::ResponseWriter;

/// What an observer saw during one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseRecord {
    status: Option<StatusCode>,
    bytes_written: u64,
}

impl ResponseRecord {
    /// The status from the most recent `write_status` call.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Numeric status, `0` when no status was written explicitly.
    pub fn status_code(&self) -> u16 {
        self.status.map(|s| s.as_u16()).unwrap_or(0)
    }

    /// Sum of the counts the delegate accepted.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

/// A [`ResponseWriter`] that records status and size while delegating.
///
/// The recorded status is overwritten by every `write_status` call, even
/// when the delegate ignores calls after its first commit. It can therefore
/// differ from what was sent when a handler writes the status twice.
pub struct ResponseObserver<'a, W: ResponseWriter + ?Sized> {
    inner: &'a mut W,
    record: ResponseRecord,
}

impl<'a, W: ResponseWriter + ?Sized> ResponseObserver<'a, W> {
    pub fn new(inner: &'a mut W) -> Self {
        Self {
            inner,
            record: ResponseRecord::default(),
        }
    }

    pub fn record(&self) -> ResponseRecord {
        self.record
    }

    pub fn into_record(self) -> ResponseRecord {
        self.record
    }
}

impl<W: ResponseWriter + ?Sized> ResponseWriter for ResponseObserver<'_, W> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_status(&mut self, status: StatusCode) {
        self.inner.write_status(status);
        self.record.status = Some(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.record.bytes_written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
