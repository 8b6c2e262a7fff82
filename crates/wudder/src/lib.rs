//! wudder - Client library for the Wudder evidence notarization service
//!
//! Events are submitted to the service and anchored on a public chain. This
//! library handles the session (login, token refresh, the authentication
//! header), retries transient failures, and classifies service errors into a
//! small set of [`FailureKind`]s.
//!
//! # Example
//!
//! ```no_run
//! use wudder::{Client, ClientConfig, Credentials, Event, Fragment};
//!
//! # async fn example() -> Result<(), wudder::Error> {
//! let config = ClientConfig::default();
//! let client = Client::connect(&config, &Credentials::new("alice@example.com", "hunter2")).await?;
//!
//! let event = Event::new("NEW_TRACE", vec![Fragment::new("lot", "A-113")]);
//! let evhash = client.send_event_directly("lot A-113", &event).await?;
//!
//! match client.get_proof(&evhash).await? {
//!     Some(proof) => println!("anchored: {:?}", proof.block_proof),
//!     None => println!("not anchored yet"),
//! }
//! # client.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod canonical;
mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod failure;
pub mod retry;
pub mod transport;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{
    AccessToken, Credentials, RefreshOutcome, RefreshToken, SessionManager, SessionSnapshot,
    TokenPair,
};
pub use client::{Client, LoginOutput, create_user};
pub use config::{ClientConfig, RetrySettings};
pub use error::Error;
pub use event::{Event, Evidence, Fragment, PreparedEvent, Proof, Trace};
pub use failure::{Failure, FailureKind, classify};
pub use retry::RetryPolicy;
pub use transport::{ErrorEntry, GraphqlTransport, Operation, Response, Transport};
pub use types::EndpointUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
