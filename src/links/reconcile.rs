use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::api::types::{DocumentId, EdgeDraft, EdgeId, ReferenceEdge};
use crate::error::Result;
use crate::store::ReferenceStore;

use super::extract::extract_targets;

/// Changes needed to bring a source's stored edges in line with its content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkDiff {
    pub removed: Vec<EdgeId>,
    pub added: Vec<EdgeDraft>,
}

impl LinkDiff {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// Compute the minimal set of edge deletions and creations for `source_id`.
///
/// Edges whose target is still referenced are left alone. When the store
/// holds more than one edge for the same target, the first is kept and the
/// rest are removed.
pub fn diff_links(
    source_id: &str,
    targets: &BTreeSet<DocumentId>,
    existing: &[ReferenceEdge],
) -> LinkDiff {
    let mut kept: HashSet<&str> = HashSet::new();
    let mut removed = Vec::new();

    for edge in existing {
        if targets.contains(&edge.target_id) && kept.insert(edge.target_id.as_str()) {
            continue;
        }
        removed.push(edge.id.clone());
    }

    let added = targets
        .iter()
        .filter(|target| !kept.contains(target.as_str()))
        .map(|target| EdgeDraft {
            source_id: source_id.to_string(),
            target_id: target.clone(),
        })
        .collect();

    LinkDiff { removed, added }
}

/// Keeps the stored link graph in sync with page content.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn ReferenceStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn ReferenceStore>) -> Self {
        Self { store }
    }

    /// Reconcile and report the committed diff. An empty diff means nothing
    /// was written.
    pub async fn try_reconcile(&self, source_id: &str, content: &str) -> Result<LinkDiff> {
        let targets = extract_targets(content);
        let existing = self.store.find_by_source(source_id).await?;
        let diff = diff_links(source_id, &targets, &existing);

        if !diff.is_empty() {
            self.store.commit_batch(&diff.removed, &diff.added).await?;
        }
        Ok(diff)
    }

    /// Reconcile without ever failing the caller. Errors are logged; the next
    /// content change retries from scratch.
    pub async fn reconcile(&self, source_id: &str, content: &str) {
        match self.try_reconcile(source_id, content).await {
            Ok(diff) if diff.is_empty() => {
                tracing::debug!(source = source_id, "links unchanged");
            }
            Ok(diff) => {
                tracing::info!(
                    source = source_id,
                    added = diff.added.len(),
                    removed = diff.removed.len(),
                    "links reconciled"
                );
            }
            Err(e) => {
                tracing::error!(
                    source = source_id,
                    kind = e.kind(),
                    error = %e,
                    "failed to update backlinks"
                );
            }
        }
    }

    /// Pages linking to `target_id`. Empty on failure.
    pub async fn backlinks(&self, target_id: &str) -> Vec<ReferenceEdge> {
        match self.store.find_by_target(target_id).await {
            Ok(edges) => edges,
            Err(e) => {
                tracing::error!(page = target_id, error = %e, "failed to fetch backlinks");
                Vec::new()
            }
        }
    }
}
