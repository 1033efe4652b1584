//! Task engine - submission, processing and lookup
//!
//! The store lock is only ever held around in-memory load/mutate/save
//! sequences. Probing happens with no lock held, so a slow batch never
//! blocks submissions or lookups for unrelated tasks.

use crate::config::Config;
use crate::prober::{HttpProber, Prober};
use crate::state::{LinkRecord, TaskId};
use crate::storage::{open_store, StoreStats, TaskMap, TaskStore};
use crate::{LinkstatError, Result};
use futures::future::join_all;
use std::sync::Arc;
use tokio_util::task::TaskTracker;

/// Orchestrates tasks between the store and the prober
///
/// Cloning is cheap; clones share the same store, prober and recovery group.
#[derive(Clone)]
pub struct TaskEngine {
    pub(super) store: Arc<TaskStore>,
    pub(super) prober: Arc<dyn Prober>,
    pub(super) recovery: TaskTracker,
}

impl TaskEngine {
    /// Creates an engine over an existing store and prober
    pub fn new(store: Arc<TaskStore>, prober: Arc<dyn Prober>) -> Self {
        Self {
            store,
            prober,
            recovery: TaskTracker::new(),
        }
    }

    /// Opens the configured store and builds an HTTP prober
    ///
    /// # Returns
    ///
    /// * `Ok(TaskEngine)` - Ready to accept work
    /// * `Err(LinkstatError)` - The backend could not be opened or the HTTP client built
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = open_store(&config.storage)?;
        let prober = HttpProber::new(&config.prober)?;
        Ok(Self::new(Arc::new(store), Arc::new(prober)))
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    /// Accepts a batch of URLs as a new pending task
    ///
    /// Under the exclusive lock: load pending, allocate an identifier, insert
    /// the batch with every link unavailable, save pending.
    ///
    /// # Returns
    ///
    /// * `Ok(TaskId)` - The identifier of the new pending task
    /// * `Err(LinkstatError::Validation)` - The batch or one of its URLs is empty
    /// * `Err(LinkstatError::Persistence)` - A store step failed; the counter may
    ///   still have advanced, leaving a gap
    pub async fn submit<I, S>(&self, urls: I) -> Result<TaskId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let links = LinkRecord::from_urls(urls)?;
        if links.is_empty() {
            return Err(LinkstatError::Validation(
                "received an empty list of links".to_string(),
            ));
        }

        let mut writer = self.store.write().await;
        let mut pending = writer.load_pending()?;
        let id = writer.allocate_id()?;
        let count = links.len();
        pending.insert(id, links);
        writer.save_pending(&pending)?;

        tracing::info!("Accepted task {} with {} link(s)", id, count);
        Ok(id)
    }

    /// Probes a pending task and moves it to completed
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<LinkRecord>)` - The finalized links, same length and order as submitted
    /// * `Err(LinkstatError::TaskNotPending)` - No pending task has this identifier
    /// * `Err(LinkstatError::Persistence)` - Reading pending or the final move failed
    pub async fn process(&self, id: TaskId) -> Result<Vec<LinkRecord>> {
        let links = {
            let reader = self.store.read().await;
            reader
                .load_pending()?
                .remove(&id)
                .ok_or(LinkstatError::TaskNotPending(id))?
        };

        self.finalize(id, links).await
    }

    /// Submits a batch and processes it straight away
    pub async fn check<I, S>(&self, urls: I) -> Result<(TaskId, Vec<LinkRecord>)>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = self.submit(urls).await?;
        let links = self.process(id).await?;
        Ok((id, links))
    }

    /// Looks up completed tasks for reporting
    ///
    /// Identifiers that are not completed are silently left out.
    pub async fn fetch_completed(&self, ids: &[TaskId]) -> Result<TaskMap> {
        if ids.is_empty() {
            return Err(LinkstatError::Validation(
                "received an empty list of task ids".to_string(),
            ));
        }

        let completed = self.store.read().await.load_completed()?;
        Ok(ids
            .iter()
            .filter_map(|id| completed.get(id).map(|links| (*id, links.clone())))
            .collect())
    }

    /// Stores links whose status is already known directly as a completed task
    pub async fn record_completed(&self, links: Vec<LinkRecord>) -> Result<TaskId> {
        if links.is_empty() {
            return Err(LinkstatError::Validation(
                "received an empty list of links".to_string(),
            ));
        }
        if let Some(link) = links.iter().find(|l| l.url.trim().is_empty()) {
            return Err(LinkstatError::Validation(format!(
                "link URL cannot be empty (got {:?})",
                link.url
            )));
        }

        let mut writer = self.store.write().await;
        let mut completed = writer.load_completed()?;
        let id = writer.allocate_id()?;
        completed.insert(id, links);
        writer.save_completed(&completed)?;

        tracing::info!("Recorded pre-checked task {}", id);
        Ok(id)
    }

    /// Pending and completed counts plus the next identifier
    pub async fn stats(&self) -> Result<StoreStats> {
        Ok(self.store.read().await.stats()?)
    }

    /// Probes every link concurrently and waits for all of them
    ///
    /// Each probe only decides its own slot. A probe task that panics leaves
    /// its link unavailable without touching its siblings.
    pub async fn probe_all(&self, links: Vec<LinkRecord>) -> Vec<LinkRecord> {
        let handles: Vec<_> = links
            .iter()
            .map(|link| {
                let prober = Arc::clone(&self.prober);
                let url = link.url.clone();
                tokio::spawn(async move { prober.probe(&url).await })
            })
            .collect();

        let outcomes = join_all(handles).await;

        links
            .into_iter()
            .zip(outcomes)
            .map(|(mut link, outcome)| {
                link.available = match outcome {
                    Ok(available) => available,
                    Err(e) => {
                        tracing::warn!("Probe task for {} aborted: {}", link.url, e);
                        false
                    }
                };
                tracing::debug!("{} -> {}", link.url, link.status_label());
                link
            })
            .collect()
    }

    /// Probes a batch, then moves it from pending to completed
    pub(super) async fn finalize(
        &self,
        id: TaskId,
        links: Vec<LinkRecord>,
    ) -> Result<Vec<LinkRecord>> {
        let links = self.probe_all(links).await;
        self.move_to_completed(id, &links).await?;

        let available = links.iter().filter(|l| l.available).count();
        tracing::info!(
            "Completed task {}: {}/{} link(s) available",
            id,
            available,
            links.len()
        );
        Ok(links)
    }

    /// Inserts into completed, then deletes from pending, under one exclusive lock
    ///
    /// Running this twice for the same task leaves the same state as running
    /// it once: the insert overwrites the same key and the delete of an
    /// absent entry is a no-op.
    pub(super) async fn move_to_completed(&self, id: TaskId, links: &[LinkRecord]) -> Result<()> {
        let mut writer = self.store.write().await;
        let mut completed = writer.load_completed()?;
        completed.insert(id, links.to_vec());
        writer.save_completed(&completed)?;
        writer.delete_pending(id)?;
        Ok(())
    }
}

impl std::fmt::Debug for TaskEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskEngine")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
