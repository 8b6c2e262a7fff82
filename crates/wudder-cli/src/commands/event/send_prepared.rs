//! Send prepared event command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use crate::input;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct SendPreparedArgs {
    /// Transaction JSON from prepare (file path, or - for stdin)
    #[arg(long)]
    pub tx: String,

    /// Signature over the transaction
    #[arg(long)]
    pub signature: Option<String>,
}

pub async fn run(args: SendPreparedArgs, endpoint: Option<&str>) -> Result<()> {
    let tx: Value = input::read_json(&args.tx)?;
    let (client, _) = session::open(endpoint)?;

    let result = client.send_prepared(&tx, args.signature.as_deref()).await;
    client.shutdown().await;
    let evhash = result.context("Failed to send prepared event")?;

    output::success("Prepared event confirmed");
    output::field("Evhash", &evhash);

    Ok(())
}
