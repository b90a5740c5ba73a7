//! Storage boundaries used by the link engine and the suggestion services.
//!
//! The hosted backend is the single source of truth. [`RemoteStore`] talks to
//! it over HTTP; [`MemoryStore`] keeps everything in process for tests and
//! offline runs.

mod memory;
mod remote;

pub use memory::MemoryStore;
pub use remote::RemoteStore;

use async_trait::async_trait;

use crate::api::types::{EdgeDraft, EdgeId, Member, Page, ReferenceEdge};
use crate::error::Result;

/// Directed `source → target` edges between pages.
///
/// The store does not enforce uniqueness of `(source, target)` pairs; the
/// reconciler is responsible for never creating duplicates.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// Outgoing edges recorded for `source_id`.
    async fn find_by_source(&self, source_id: &str) -> Result<Vec<ReferenceEdge>>;

    /// Incoming edges (backlinks) pointing at `target_id`.
    async fn find_by_target(&self, target_id: &str) -> Result<Vec<ReferenceEdge>>;

    /// Delete and create edges as one all-or-nothing batch.
    async fn commit_batch(&self, deletes: &[EdgeId], adds: &[EdgeDraft]) -> Result<()>;
}

/// Read access to the workspace's pages, newest first.
#[async_trait]
pub trait PageStore: Send + Sync {
    async fn find_recent(&self, workspace_id: &str, limit: usize) -> Result<Vec<Page>>;

    async fn find_all(&self, workspace_id: &str, limit: usize) -> Result<Vec<Page>>;
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn find_members(&self, workspace_id: &str, limit: usize) -> Result<Vec<Member>>;
}
