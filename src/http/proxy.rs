//! Forwarding handler.
//!
//! # Responsibilities
//! - Treat the raw request target as an absolute upstream URL
//! - Fetch it with a GET and buffer the whole body
//! - Relay the upstream status, then the body
//!
//! # Design Decisions
//! - The status is written before the body so it is never lost to an
//!   implicit `200 OK`
//! - Fetch and body-read failures become `502 Bad Gateway` with no body
//! - Every fetch has a deadline unless explicitly disabled

use std::time::Duration;

use axum::{
    body::Bytes,
    http::{Request, StatusCode},
};

use crate::config::UpstreamConfig;
use crate::http::handler::{Handler, HandlerFuture};
use crate::http::writer::ResponseWriter;
use crate::observability::Logger;

/// A [`Handler`] that fetches the request target and relays it.
#[derive(Debug, Clone)]
pub struct ProxyHandler {
    client: reqwest::Client,
    logger: Logger,
}

impl ProxyHandler {
    /// Build a handler with its own outbound client.
    pub fn new(config: &UpstreamConfig, logger: Logger) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().no_proxy();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        Ok(Self::with_client(builder.build()?, logger))
    }

    pub fn with_client(client: reqwest::Client, logger: Logger) -> Self {
        Self { client, logger }
    }

    async fn fetch(&self, target: &str) -> Result<(StatusCode, Bytes), reqwest::Error> {
        let response = self.client.get(target).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok((status, body))
    }
}

impl Handler for ProxyHandler {
    fn serve<'a>(
        &'a self,
        request: &'a Request<Bytes>,
        writer: &'a mut dyn ResponseWriter,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let target = request.uri().to_string();

            let (status, body) = match self.fetch(&target).await {
                Ok(fetched) => fetched,
                Err(err) => {
                    self.logger.in_scope(|| {
                        tracing::warn!(url = %target, error = %err, "upstream request failed");
                    });
                    writer.write_status(StatusCode::BAD_GATEWAY);
                    return;
                }
            };

            self.logger.in_scope(|| {
                tracing::debug!(url = %target, size = body.len(), "body was parsed");
            });

            writer.write_status(status);
            if let Err(err) = writer.write_all(&body) {
                self.logger.in_scope(|| {
                    tracing::warn!(url = %target, error = %err, "failed to write response body");
                });
            }
        })
    }
}
