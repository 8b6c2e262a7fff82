//! Get event command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Evhash of the event
    pub evhash: String,
}

pub async fn run(args: GetArgs, endpoint: Option<&str>) -> Result<()> {
    let (client, _) = session::open(endpoint)?;

    let result = client.get_event(&args.evhash).await;
    client.shutdown().await;

    match result {
        Ok(event) => output::json_pretty(&event),
        Err(err) if err.is_not_found() => {
            output::error(&format!("Event {} does not exist", args.evhash));
            bail!("event not found")
        }
        Err(err) => Err(err).context("Failed to get event"),
    }
}
