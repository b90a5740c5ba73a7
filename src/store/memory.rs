use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{MemberStore, PageStore, ReferenceStore};
use crate::api::types::{EdgeDraft, EdgeId, Member, Page, ReferenceEdge};
use crate::error::{Error, Result};

/// In-process store backing all three storage traits.
///
/// Every successful `commit_batch` counts as one write, which makes it easy
/// to assert that an unchanged document causes no store traffic.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    edges: Vec<ReferenceEdge>,
    pages: Vec<Page>,
    members: Vec<(String, Member)>,
    next_edge: u64,
    write_batches: usize,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Store("memory store lock poisoned".into()))
    }

    pub fn insert_page(&self, page: Page) -> Result<()> {
        let mut inner = self.lock()?;
        inner.pages.retain(|p| p.id != page.id);
        inner.pages.push(page);
        Ok(())
    }

    pub fn insert_member(&self, workspace_id: &str, member: Member) -> Result<()> {
        self.lock()?.members.push((workspace_id.to_string(), member));
        Ok(())
    }

    /// Store an edge as-is, bypassing the batch path. Lets callers seed
    /// state the reconciler would never produce, such as duplicates.
    pub fn insert_edge(&self, source_id: &str, target_id: &str) -> Result<EdgeId> {
        let mut inner = self.lock()?;
        let id = inner.allocate_edge_id();
        inner.edges.push(ReferenceEdge {
            id: id.clone(),
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            created_at: Some(Utc::now()),
        });
        Ok(id)
    }

    pub fn edges(&self) -> Result<Vec<ReferenceEdge>> {
        Ok(self.lock()?.edges.clone())
    }

    /// Number of batches committed so far.
    pub fn write_count(&self) -> Result<usize> {
        Ok(self.lock()?.write_batches)
    }

    pub fn set_fail_reads(&self, fail: bool) -> Result<()> {
        self.lock()?.fail_reads = fail;
        Ok(())
    }

    pub fn set_fail_writes(&self, fail: bool) -> Result<()> {
        self.lock()?.fail_writes = fail;
        Ok(())
    }
}

impl Inner {
    fn allocate_edge_id(&mut self) -> EdgeId {
        self.next_edge += 1;
        format!("link-{}", self.next_edge)
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads {
            return Err(Error::Store("read unavailable".into()));
        }
        Ok(())
    }

    fn workspace_pages(&self, workspace_id: &str, limit: usize) -> Vec<Page> {
        let mut pages: Vec<Page> = self
            .pages
            .iter()
            .filter(|p| p.workspace_id == workspace_id)
            .cloned()
            .collect();
        pages.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        pages.truncate(limit);
        pages
    }
}

#[async_trait]
impl ReferenceStore for MemoryStore {
    async fn find_by_source(&self, source_id: &str) -> Result<Vec<ReferenceEdge>> {
        let inner = self.lock()?;
        inner.check_reads()?;
        Ok(inner
            .edges
            .iter()
            .filter(|e| e.source_id == source_id)
            .cloned()
            .collect())
    }

    async fn find_by_target(&self, target_id: &str) -> Result<Vec<ReferenceEdge>> {
        let inner = self.lock()?;
        inner.check_reads()?;
        Ok(inner
            .edges
            .iter()
            .filter(|e| e.target_id == target_id)
            .cloned()
            .collect())
    }

    async fn commit_batch(&self, deletes: &[EdgeId], adds: &[EdgeDraft]) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.fail_writes {
            return Err(Error::Store("write rejected".into()));
        }

        let deletes: HashSet<&str> = deletes.iter().map(String::as_str).collect();
        inner.edges.retain(|e| !deletes.contains(e.id.as_str()));

        let now = Utc::now();
        for draft in adds {
            let id = inner.allocate_edge_id();
            inner.edges.push(ReferenceEdge {
                id,
                source_id: draft.source_id.clone(),
                target_id: draft.target_id.clone(),
                created_at: Some(now),
            });
        }
        inner.write_batches += 1;
        Ok(())
    }
}

#[async_trait]
impl PageStore for MemoryStore {
    async fn find_recent(&self, workspace_id: &str, limit: usize) -> Result<Vec<Page>> {
        let inner = self.lock()?;
        inner.check_reads()?;
        Ok(inner.workspace_pages(workspace_id, limit))
    }

    async fn find_all(&self, workspace_id: &str, limit: usize) -> Result<Vec<Page>> {
        let inner = self.lock()?;
        inner.check_reads()?;
        Ok(inner.workspace_pages(workspace_id, limit))
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn find_members(&self, workspace_id: &str, limit: usize) -> Result<Vec<Member>> {
        let inner = self.lock()?;
        inner.check_reads()?;
        Ok(inner
            .members
            .iter()
            .filter(|(ws, _)| ws == workspace_id)
            .map(|(_, m)| m.clone())
            .take(limit)
            .collect())
    }
}
