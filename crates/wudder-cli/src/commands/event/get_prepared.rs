//! Get prepared event command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct GetPreparedArgs {
    /// Temporary hash returned by prepare
    pub hash: String,
}

pub async fn run(args: GetPreparedArgs, endpoint: Option<&str>) -> Result<()> {
    let (client, _) = session::open(endpoint)?;

    let result = client.get_prepared(&args.hash).await;
    client.shutdown().await;
    let prepared = result.context("Failed to get prepared event")?;

    output::json_pretty(&prepared)?;

    Ok(())
}
