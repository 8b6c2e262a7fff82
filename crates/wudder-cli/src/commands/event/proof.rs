//! Get proof command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct ProofArgs {
    /// Evhash of the event
    pub evhash: String,
}

pub async fn run(args: ProofArgs, endpoint: Option<&str>) -> Result<()> {
    let (client, _) = session::open(endpoint)?;

    let result = client.get_proof(&args.evhash).await;
    client.shutdown().await;

    match result {
        Ok(Some(proof)) => output::json_pretty(&proof),
        Ok(None) => {
            output::field("Proof", "not available yet");
            Ok(())
        }
        Err(err) if err.is_not_found() => {
            output::error(&format!("Event {} does not exist", args.evhash));
            bail!("event not found")
        }
        Err(err) => Err(err).context("Failed to get proof"),
    }
}
