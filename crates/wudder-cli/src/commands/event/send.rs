//! Send event command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Display name for the evidence
    #[arg(long)]
    pub title: String,

    /// Event JSON document (file path, or - for stdin)
    #[arg(long)]
    pub json: String,
}

pub async fn run(args: SendArgs, endpoint: Option<&str>) -> Result<()> {
    let event = super::read_event(&args.json)?;
    let (client, _) = session::open(endpoint)?;

    let result = client.send_event_directly(&args.title, &event).await;
    client.shutdown().await;
    let evhash = result.context("Failed to send event")?;

    output::success("Event sent");
    output::field("Evhash", &evhash);

    Ok(())
}
