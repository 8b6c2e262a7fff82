//! Background token refresh.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::Result;

/// What happened to a refresh response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The new pair is now current.
    Applied,
    /// Another update landed while the refresh was in flight; the response
    /// was discarded.
    Superseded,
}

/// The refresh operation driven by the loop.
#[async_trait]
pub(crate) trait Refresher: Send + Sync + 'static {
    /// Whether there is a session to refresh.
    fn has_session(&self) -> bool;

    async fn refresh(&self) -> Result<RefreshOutcome>;
}

/// Handle to a running refresh loop.
///
/// The loop stops when [`shutdown`](Self::shutdown) is called or when the
/// handle is dropped.
#[derive(Debug)]
pub(crate) struct RefreshLoop {
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshLoop {
    /// Spawn the loop on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub(crate) fn spawn<R: Refresher>(refresher: Arc<R>, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(refresher, interval, cancel.clone()));
        Self {
            cancel,
            task: Mutex::new(Some(task)),
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Stop the loop and wait for it to exit. Idempotent.
    pub(crate) async fn shutdown(&self) {
        self.cancel.cancel();
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task
            && let Err(err) = task.await
        {
            warn!(error = %err, "refresh loop ended abnormally");
        }
    }
}

impl Drop for RefreshLoop {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run<R: Refresher>(refresher: Arc<R>, interval: Duration, cancel: CancellationToken) {
    debug!(interval_secs = interval.as_secs(), "refresh loop started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }

        if !refresher.has_session() {
            debug!("no session yet; skipping refresh");
            continue;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            result = refresher.refresh() => match result {
                Ok(RefreshOutcome::Applied) => info!("background refresh applied"),
                Ok(RefreshOutcome::Superseded) => {
                    debug!("background refresh superseded by a newer update")
                }
                // The session keeps its last tokens; the next tick tries again
                Err(err) => warn!(
                    error = %err,
                    kind = ?err.failure_kind(),
                    "background refresh failed"
                ),
            }
        }
    }

    debug!("refresh loop stopped");
}
