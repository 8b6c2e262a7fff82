//! Update private key command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use crate::input;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct UpdatePrivateKeyArgs {
    /// Private key JSON document (file path, or - for stdin)
    pub private_key: String,
}

pub async fn run(args: UpdatePrivateKeyArgs, endpoint: Option<&str>) -> Result<()> {
    let private_key: Value = input::read_json(&args.private_key)?;
    let (client, _) = session::open(endpoint)?;

    client
        .update_private_key(&private_key)
        .await
        .context("Failed to update private key")?;
    client.shutdown().await;

    output::success("Private key updated");
    Ok(())
}
