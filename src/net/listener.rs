//! TCP listener setup.

use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Bind to `host:port` from the configuration. Host names are resolved.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let address = config.address();
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ListenerError::Bind {
            address: address.clone(),
            source,
        })?;

    if let Ok(local_addr) = listener.local_addr() {
        tracing::info!(address = %address, local_addr = %local_addr, "Listener bound");
    }
    Ok(listener)
}
