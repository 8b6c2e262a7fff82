//! Prepare event command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Display name for the evidence
    #[arg(long)]
    pub title: String,

    /// Event JSON document (file path, or - for stdin)
    #[arg(long)]
    pub json: String,
}

pub async fn run(args: PrepareArgs, endpoint: Option<&str>) -> Result<()> {
    let event = super::read_event(&args.json)?;
    let (client, _) = session::open(endpoint)?;

    let result = client.prepare(&args.title, &event).await;
    client.shutdown().await;
    let prepared = result.context("Failed to prepare event")?;

    output::json_pretty(&prepared)?;

    Ok(())
}
