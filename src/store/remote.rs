use async_trait::async_trait;

use super::{MemberStore, PageStore, ReferenceStore};
use crate::api::client::BackendClient;
use crate::api::queries;
use crate::api::types::{
    Document, EdgeDraft, EdgeId, Member, Page, ReferenceEdge, Write, MEMBERS_COLLECTION,
    PAGES_COLLECTION, PAGE_LINKS_COLLECTION,
};
use crate::error::Result;

/// Storage traits backed by the hosted document API.
#[derive(Clone)]
pub struct RemoteStore {
    client: BackendClient,
}

impl RemoteStore {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

/// Decode every document, skipping (and logging) the ones that do not match
/// the expected shape instead of failing the whole listing.
fn decode_all<T: serde::de::DeserializeOwned>(collection: &str, docs: &[Document]) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| match doc.decode::<T>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(collection, id = %doc.id, error = %e, "skipping malformed document");
                None
            }
        })
        .collect()
}

#[async_trait]
impl ReferenceStore for RemoteStore {
    async fn find_by_source(&self, source_id: &str) -> Result<Vec<ReferenceEdge>> {
        let docs = self
            .client
            .query(PAGE_LINKS_COLLECTION, &queries::links_from(source_id))
            .await?;
        Ok(decode_all(PAGE_LINKS_COLLECTION, &docs))
    }

    async fn find_by_target(&self, target_id: &str) -> Result<Vec<ReferenceEdge>> {
        let docs = self
            .client
            .query(PAGE_LINKS_COLLECTION, &queries::links_to(target_id))
            .await?;
        Ok(decode_all(PAGE_LINKS_COLLECTION, &docs))
    }

    async fn commit_batch(&self, deletes: &[EdgeId], adds: &[EdgeDraft]) -> Result<()> {
        let mut writes: Vec<Write> = deletes.iter().map(|id| Write::delete_edge(id)).collect();
        for draft in adds {
            writes.push(Write::create_edge(draft)?);
        }
        self.client.commit(writes).await
    }
}

#[async_trait]
impl PageStore for RemoteStore {
    async fn find_recent(&self, workspace_id: &str, limit: usize) -> Result<Vec<Page>> {
        self.find_all(workspace_id, limit).await
    }

    async fn find_all(&self, workspace_id: &str, limit: usize) -> Result<Vec<Page>> {
        let docs = self
            .client
            .query(
                PAGES_COLLECTION,
                &queries::workspace_pages(workspace_id, limit),
            )
            .await?;
        Ok(decode_all(PAGES_COLLECTION, &docs))
    }
}

#[async_trait]
impl MemberStore for RemoteStore {
    async fn find_members(&self, workspace_id: &str, limit: usize) -> Result<Vec<Member>> {
        let docs = self
            .client
            .query(
                MEMBERS_COLLECTION,
                &queries::workspace_members(workspace_id, limit),
            )
            .await?;
        Ok(decode_all(MEMBERS_COLLECTION, &docs))
    }
}
