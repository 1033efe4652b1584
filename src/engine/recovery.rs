//! Crash recovery for tasks left pending by an interrupted run
//!
//! Recovery launches one background resumption per pending task and returns
//! immediately. Resumptions are counted by a task tracker so shutdown (and
//! tests) can wait for them with a bound. The tracker is never locked, so a
//! wait in progress does not hold up a new recovery pass, and finished
//! resumptions drop out of it on their own.
//!
//! Completed is not consulted before re-probing: a task that crashed between
//! its completed write and its pending delete is simply probed again and
//! overwritten with equivalent data.

use crate::engine::TaskEngine;
use crate::Result;
use std::time::Duration;

impl TaskEngine {
    /// Launches a resumption for every pending task
    ///
    /// Returns once all resumptions are spawned, not once they finish. Each
    /// resumption probes without the lock and takes the exclusive lock again
    /// only for its final move. Failures inside a resumption are logged; the
    /// task stays pending and is retried by the next recovery pass.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of resumptions launched
    /// * `Err(LinkstatError::Persistence)` - Pending could not be loaded
    pub async fn recover_pending_tasks(&self) -> Result<usize> {
        let pending = {
            let writer = self.store.write().await;
            writer.load_pending()?
        };

        if pending.is_empty() {
            tracing::debug!("No pending tasks to recover");
            return Ok(0);
        }

        let launched = pending.len();
        for (id, links) in pending {
            let engine = self.clone();
            // Inner spawn so a panicking resumption is reported instead of vanishing
            let resumption = tokio::spawn(async move { engine.finalize(id, links).await });
            self.recovery.spawn(async move {
                tracing::debug!("Resuming task {}", id);
                match resumption.await {
                    Ok(Ok(_)) => tracing::debug!("Recovered task {}", id),
                    Ok(Err(e)) => tracing::error!("Failed to resume task {}: {}", id, e),
                    Err(e) => tracing::warn!("Recovery of task {} aborted: {}", id, e),
                }
            });
        }

        tracing::info!("Launched recovery for {} pending task(s)", launched);
        Ok(launched)
    }

    /// Waits for launched resumptions to finish
    ///
    /// Resumptions launched while the wait is in progress are waited for too.
    ///
    /// # Returns
    ///
    /// * `true` - Every resumption finished
    /// * `false` - The timeout elapsed first; the rest keep running
    pub async fn wait_for_recovery(&self, timeout: Duration) -> bool {
        self.recovery.close();
        let drained = tokio::time::timeout(timeout, self.recovery.wait())
            .await
            .is_ok();
        self.recovery.reopen();

        if !drained {
            tracing::warn!(
                "Timed out after {:?} with {} recovery task(s) still running",
                timeout,
                self.recovery.len()
            );
        }
        drained
    }

    /// Number of resumptions launched and not yet finished
    pub fn recovery_in_flight(&self) -> usize {
        self.recovery.len()
    }
}
