//! Account subcommand implementations.

mod create_user;
mod login;
mod refresh_token;
mod update_private_key;

use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Args, Debug)]
pub struct AccountCommand {
    #[command(subcommand)]
    pub command: AccountSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AccountSubcommand {
    /// Log in and store the session
    Login(login::LoginArgs),

    /// Exchange the stored refresh token for a new pair
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Register a new account
    CreateUser(create_user::CreateUserArgs),

    /// Replace the private key stored for the account
    UpdatePrivateKey(update_private_key::UpdatePrivateKeyArgs),
}

pub async fn handle(cmd: AccountCommand, endpoint: Option<&str>) -> Result<()> {
    match cmd.command {
        AccountSubcommand::Login(args) => login::run(args, endpoint).await,
        AccountSubcommand::RefreshToken(args) => refresh_token::run(args, endpoint).await,
        AccountSubcommand::CreateUser(args) => create_user::run(args, endpoint).await,
        AccountSubcommand::UpdatePrivateKey(args) => update_private_key::run(args, endpoint).await,
    }
}
