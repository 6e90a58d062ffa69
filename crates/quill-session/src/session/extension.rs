//! Periodic session extension.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::manager::SessionManager;

/// Handle to the running extension timer.
///
/// Exists exactly while the session is authenticated. Dropping it cancels
/// the timer; an extension request already on the wire still completes.
#[derive(Debug)]
pub(crate) struct ExtensionTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ExtensionTask {
    /// Start extending every `period`, first tick one period from now.
    pub(crate) fn spawn(manager: Weak<SessionManager>, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            info!(interval_secs = period.as_secs(), "Session extension timer started");
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(manager) = manager.upgrade() else { break };
                        if let Err(e) = manager.extend().await {
                            // The manager has already logged out.
                            warn!(error = %e, "Periodic session extension failed");
                            break;
                        }
                    }
                }
            }
            debug!("Session extension timer stopped");
        });

        Self { cancel, handle }
    }

    /// Whether the timer loop is still running.
    pub(crate) fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.handle.is_finished()
    }
}

impl Drop for ExtensionTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
