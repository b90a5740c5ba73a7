use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;

use crate::api::types::DocumentId;
use crate::config::LinksConfig;

use super::reconcile::Reconciler;

struct Pending {
    generation: u64,
    content: String,
    handle: Option<JoinHandle<()>>,
}

/// Debounced driver for [`Reconciler`].
///
/// Each page has at most one pending reconciliation. A new content change
/// for the same page cancels the pending timer and starts a fresh one with
/// the latest content; pages never wait on each other.
#[derive(Clone)]
pub struct LinkSync {
    reconciler: Reconciler,
    debounce: Duration,
    pending: Arc<DashMap<DocumentId, Pending>>,
    generation: Arc<AtomicU64>,
}

impl LinkSync {
    pub fn new(reconciler: Reconciler, debounce: Duration) -> Self {
        Self {
            reconciler,
            debounce,
            pending: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn from_config(reconciler: Reconciler, config: &LinksConfig) -> Self {
        Self::new(reconciler, config.debounce())
    }

    /// Record a content change. Blocks that do not belong to a page have
    /// nothing to link from and are skipped.
    pub fn on_content_change(&self, page_id: Option<&str>, content: String) {
        let Some(page_id) = page_id else {
            tracing::debug!("content change without page id, skipping link sync");
            return;
        };

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let previous = self.pending.insert(
            page_id.to_string(),
            Pending {
                generation,
                content,
                handle: None,
            },
        );
        if let Some(handle) = previous.and_then(|p| p.handle) {
            handle.abort();
        }

        let handle = tokio::spawn({
            let pending = self.pending.clone();
            let reconciler = self.reconciler.clone();
            let delay = self.debounce;
            let page_id = page_id.to_string();
            async move {
                tokio::time::sleep(delay).await;
                // A newer change replaced this entry; its own timer will run.
                let Some((_, entry)) =
                    pending.remove_if(&page_id, |_, p| p.generation == generation)
                else {
                    return;
                };
                reconciler.reconcile(&page_id, &entry.content).await;
            }
        });

        if let Some(mut entry) = self.pending.get_mut(page_id) {
            if entry.generation == generation {
                entry.handle = Some(handle);
            }
        }
    }

    /// Run the pending reconciliation for `page_id` now. Returns whether
    /// anything was pending.
    pub async fn flush(&self, page_id: &str) -> bool {
        let Some((_, entry)) = self.pending.remove(page_id) else {
            return false;
        };
        if let Some(handle) = entry.handle {
            handle.abort();
        }
        self.reconciler.reconcile(page_id, &entry.content).await;
        true
    }

    /// Flush every pending page concurrently.
    pub async fn flush_all(&self) -> usize {
        let page_ids: Vec<DocumentId> = self.pending.iter().map(|e| e.key().clone()).collect();
        let flushed = futures::future::join_all(page_ids.iter().map(|id| self.flush(id))).await;
        flushed.into_iter().filter(|done| *done).count()
    }

    /// Drop all pending work without reconciling.
    pub fn cancel_all(&self) {
        let page_ids: Vec<DocumentId> = self.pending.iter().map(|e| e.key().clone()).collect();
        for page_id in page_ids {
            if let Some((_, entry)) = self.pending.remove(&page_id) {
                if let Some(handle) = entry.handle {
                    handle.abort();
                }
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
