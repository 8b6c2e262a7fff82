//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;

use wudder::{Client, Credentials};

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,

    /// Print the stored private key document
    #[arg(long)]
    pub show_key: bool,
}

pub async fn run(args: LoginArgs, endpoint: Option<&str>) -> Result<()> {
    let config = session::config(endpoint, None)?;
    let credentials = Credentials::new(&args.email, &args.password);

    output::progress("Logging in...");

    let client = Client::new(&config).context("Failed to create client")?;
    let login = client
        .login(&credentials)
        .await
        .context("Failed to login")?;

    session::persist(&client, &config)?;
    client.shutdown().await;

    output::success("Logged in successfully");
    println!();
    output::field("Email", credentials.email());
    output::field("Endpoint", config.endpoint.as_str());
    output::field(
        "Private key",
        if login.private_key.is_some() { "stored" } else { "none" },
    );

    if args.show_key
        && let Some(key) = &login.private_key
    {
        output::json_pretty(key)?;
    }

    Ok(())
}
