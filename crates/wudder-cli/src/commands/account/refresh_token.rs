//! Refresh token command implementation.

use anyhow::{Context, Result};
use clap::Args;

use wudder::RefreshOutcome;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(_args: RefreshTokenArgs, endpoint: Option<&str>) -> Result<()> {
    let (client, config) = session::open(endpoint)?;

    output::progress("Refreshing session...");

    let outcome = client
        .refresh()
        .await
        .context("Failed to refresh session")?;

    // Save the updated session with new tokens
    session::persist(&client, &config)?;
    client.shutdown().await;

    match outcome {
        RefreshOutcome::Applied => output::success("Session refreshed successfully"),
        RefreshOutcome::Superseded => output::success("Session already updated"),
    }
    output::field("Endpoint", config.endpoint.as_str());

    Ok(())
}
