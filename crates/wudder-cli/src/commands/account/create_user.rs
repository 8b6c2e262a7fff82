//! Create user command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use wudder::{Credentials, create_user};

use crate::input;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct CreateUserArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,

    /// Private key JSON document (file path, or - for stdin)
    #[arg(long)]
    pub private_key: String,
}

pub async fn run(args: CreateUserArgs, endpoint: Option<&str>) -> Result<()> {
    let config = session::config(endpoint, None)?;
    let private_key: Value = input::read_json(&args.private_key)?;
    let credentials = Credentials::new(&args.email, &args.password);

    output::progress("Creating user...");

    let id = create_user(&config, &credentials, &private_key)
        .await
        .context("Failed to create user")?;

    output::success("User created");
    output::field("ID", &id);
    output::field("Email", credentials.email());

    Ok(())
}
