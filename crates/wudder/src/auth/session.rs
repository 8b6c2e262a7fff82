//! Session token state shared by callers and the refresh loop.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::Result;
use crate::transport::{AUTH_HEADER, Transport};

use super::tokens::{AccessToken, RefreshToken, TokenPair};

/// A consistent view of the session at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The current pair, if the client has logged in.
    pub tokens: Option<TokenPair>,
    /// Incremented by every applied update.
    pub version: u64,
}

/// Sole owner of the session's token pair.
///
/// Every update replaces both tokens and the transport's authentication
/// header under one write lock, so readers never observe a pair mixed from
/// two updates, and once an update returns every later request carries the
/// new access token.
///
/// Updates come in two flavors:
///
/// - [`update_tokens`](Self::update_tokens) always applies. Used by login and
///   by explicit restores; among concurrent calls the last to complete wins.
/// - [`update_tokens_if_current`](Self::update_tokens_if_current) applies only
///   if no other update happened since the caller took its snapshot. Used by
///   refreshes, so a refresh response that was in flight during a login cannot
///   overwrite the login's tokens.
pub struct SessionManager {
    transport: Arc<dyn Transport>,
    state: RwLock<SessionState>,
}

#[derive(Default)]
struct SessionState {
    tokens: Option<TokenPair>,
    version: u64,
}

impl SessionManager {
    /// Create an empty session bound to `transport`'s header state.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        SessionSnapshot {
            tokens: state.tokens.clone(),
            version: state.version,
        }
    }

    /// The refresh token the next refresh should present.
    pub fn current_refresh_token(&self) -> Option<RefreshToken> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.tokens.as_ref().map(|t| t.refresh.clone())
    }

    pub fn current_access_token(&self) -> Option<AccessToken> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.tokens.as_ref().map(|t| t.access.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.tokens.is_some()
    }

    /// Replace the token pair unconditionally. Returns the new version.
    ///
    /// # Errors
    ///
    /// Fails without touching the session if the access token cannot be used
    /// as a header value.
    pub fn update_tokens(&self, tokens: TokenPair) -> Result<u64> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        self.apply(&mut state, tokens)
    }

    /// Replace the token pair only if the session is still at `expected`.
    ///
    /// Returns `Ok(None)` when another update won the race.
    pub fn update_tokens_if_current(
        &self,
        tokens: TokenPair,
        expected: u64,
    ) -> Result<Option<u64>> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.version != expected {
            debug!(
                expected,
                current = state.version,
                "discarding superseded token update"
            );
            return Ok(None);
        }
        self.apply(&mut state, tokens).map(Some)
    }

    fn apply(&self, state: &mut SessionState, tokens: TokenPair) -> Result<u64> {
        self.transport
            .set_header(AUTH_HEADER, tokens.access.as_str())?;
        state.tokens = Some(tokens);
        state.version += 1;
        debug!(version = state.version, "session tokens updated");
        Ok(state.version)
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("SessionManager")
            .field("logged_in", &snapshot.tokens.is_some())
            .field("version", &snapshot.version)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
