//! Authentication types and session management.
//!
//! The [`SessionManager`] owns the token pair; the refresh loop keeps it
//! fresh in the background.

mod credentials;
pub(crate) mod refresh;
mod session;
mod tokens;

pub use credentials::Credentials;
pub use refresh::RefreshOutcome;
pub use session::{SessionManager, SessionSnapshot};
pub use tokens::{AccessToken, RefreshToken, TokenPair};
