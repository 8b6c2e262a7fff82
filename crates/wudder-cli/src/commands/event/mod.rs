//! Event subcommand implementations.

mod get;
mod get_prepared;
mod prepare;
mod proof;
mod send;
mod send_prepared;
mod trace;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Deserialize;

use wudder::{Event, Fragment};

use crate::input;

#[derive(Args, Debug)]
pub struct EventCommand {
    #[command(subcommand)]
    pub command: EventSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum EventSubcommand {
    /// Submit an event in one step
    Send(send::SendArgs),

    /// Prepare an event for signing
    Prepare(prepare::PrepareArgs),

    /// Fetch a prepared event by its temporary hash
    GetPrepared(get_prepared::GetPreparedArgs),

    /// Confirm a prepared transaction
    SendPrepared(send_prepared::SendPreparedArgs),

    /// Fetch a stored event
    Get(get::GetArgs),

    /// Fetch the trace an event belongs to
    Trace(trace::TraceArgs),

    /// Fetch the anchoring proof of an event
    Proof(proof::ProofArgs),
}

pub async fn handle(cmd: EventCommand, endpoint: Option<&str>) -> Result<()> {
    match cmd.command {
        EventSubcommand::Send(args) => send::run(args, endpoint).await,
        EventSubcommand::Prepare(args) => prepare::run(args, endpoint).await,
        EventSubcommand::GetPrepared(args) => get_prepared::run(args, endpoint).await,
        EventSubcommand::SendPrepared(args) => send_prepared::run(args, endpoint).await,
        EventSubcommand::Get(args) => get::run(args, endpoint).await,
        EventSubcommand::Trace(args) => trace::run(args, endpoint).await,
        EventSubcommand::Proof(args) => proof::run(args, endpoint).await,
    }
}

/// Event input as written by hand. Timestamp and salt are filled in.
#[derive(Debug, Deserialize)]
struct EventDocument {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    trace: Option<String>,
    #[serde(default)]
    fragments: Vec<Fragment>,
}

fn read_event(source: &str) -> Result<Event> {
    let doc: EventDocument = input::read_json(source)?;
    let event = Event::new(doc.event_type, doc.fragments);
    Ok(match doc.trace {
        Some(trace) => event.with_trace(trace),
        None => event,
    })
}
