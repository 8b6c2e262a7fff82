//! Persisted login state and client construction.

pub mod storage;

use anyhow::{Context, Result};
use wudder::{Client, ClientConfig, EndpointUrl};

/// Build a client configuration. An explicit endpoint wins over `fallback`,
/// which wins over the public service.
pub fn config(endpoint: Option<&str>, fallback: Option<EndpointUrl>) -> Result<ClientConfig> {
    let endpoint = match endpoint {
        Some(url) => EndpointUrl::new(url).context("Invalid endpoint URL")?,
        None => fallback.unwrap_or_default(),
    };
    Ok(ClientConfig::with_endpoint(endpoint))
}

/// Open a client from the stored session.
pub fn open(endpoint: Option<&str>) -> Result<(Client, ClientConfig)> {
    let stored = storage::load_session()
        .context("Failed to load session")?
        .context("No active session. Run 'wudder account login' first.")?;

    let config = config(endpoint, Some(stored.endpoint))?;
    let client = Client::restore(&config, stored.tokens).context("Failed to restore session")?;
    Ok((client, config))
}

/// Write the client's current tokens back to disk.
pub fn persist(client: &Client, config: &ClientConfig) -> Result<()> {
    let tokens = client
        .session()
        .snapshot()
        .tokens
        .context("Client holds no session")?;
    storage::save_session(&config.endpoint, &tokens).context("Failed to save session")
}
