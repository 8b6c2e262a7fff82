//! Get trace command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct TraceArgs {
    /// Evhash of any event in the trace
    pub evhash: String,
}

pub async fn run(args: TraceArgs, endpoint: Option<&str>) -> Result<()> {
    let (client, _) = session::open(endpoint)?;

    let result = client.get_trace(&args.evhash).await;
    client.shutdown().await;
    let trace = result.context("Failed to get trace")?;

    output::json_pretty(&trace)?;

    Ok(())
}
