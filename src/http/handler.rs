//! The handler seam.
//!
//! A [`Handler`] receives the buffered request and a [`ResponseWriter`].
//! Decorators such as [`LoggingDecorator`](crate::http::LoggingDecorator)
//! implement `Handler` themselves, so they compose freely.

use std::sync::Arc;

use axum::{body::Bytes, http::Request};
use futures_util::future::BoxFuture;

use crate::http::writer::ResponseWriter;

/// Future returned by [`Handler::serve`].
pub type HandlerFuture<'a> = BoxFuture<'a, ()>;

/// A unit of request handling logic.
pub trait Handler: Send + Sync {
    fn serve<'a>(
        &'a self,
        request: &'a Request<Bytes>,
        writer: &'a mut dyn ResponseWriter,
    ) -> HandlerFuture<'a>;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn serve<'a>(
        &'a self,
        request: &'a Request<Bytes>,
        writer: &'a mut dyn ResponseWriter,
    ) -> HandlerFuture<'a> {
        (**self).serve(request, writer)
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn serve<'a>(
        &'a self,
        request: &'a Request<Bytes>,
        writer: &'a mut dyn ResponseWriter,
    ) -> HandlerFuture<'a> {
        (**self).serve(request, writer)
    }
}

/// Handler built from a synchronous closure. See [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

/// Wrap a synchronous closure as a [`Handler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&Request<Bytes>, &mut dyn ResponseWriter) + Send + Sync,
{
    HandlerFn { f }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&Request<Bytes>, &mut dyn ResponseWriter) + Send + Sync,
{
    fn serve<'a>(
        &'a self,
        request: &'a Request<Bytes>,
        writer: &'a mut dyn ResponseWriter,
    ) -> HandlerFuture<'a> {
        Box::pin(async move { (self.f)(request, writer) })
    }
}

impl<F> std::fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerFn").finish_non_exhaustive()
    }
}
