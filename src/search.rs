use chrono::{DateTime, Utc};

use crate::api::types::Page;
use crate::store::PageStore;

/// Client-side filters applied to a workspace's pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    /// Case-insensitive title substring.
    pub query: Option<String>,
    pub page_type: Option<String>,
    /// Every tag listed must be present on the page.
    pub tags: Vec<String>,
    pub updated_from: Option<DateTime<Utc>>,
    pub updated_to: Option<DateTime<Utc>>,
}

impl SearchFilters {
    pub fn matches(&self, page: &Page) -> bool {
        if let Some(query) = self.query.as_deref().map(str::trim) {
            if !query.is_empty() && !page.title.to_lowercase().contains(&query.to_lowercase()) {
                return false;
            }
        }
        if let Some(page_type) = &self.page_type {
            if &page.page_type != page_type {
                return false;
            }
        }
        if !self.tags.iter().all(|tag| page.tags.contains(tag)) {
            return false;
        }
        if self.updated_from.is_some_and(|from| page.updated_at < from) {
            return false;
        }
        if self.updated_to.is_some_and(|to| page.updated_at > to) {
            return false;
        }
        true
    }
}

/// Search the newest `limit` pages of a workspace. Store order is kept;
/// failures are logged and yield no results.
pub async fn search_pages(
    store: &dyn PageStore,
    workspace_id: &str,
    filters: &SearchFilters,
    limit: usize,
) -> Vec<Page> {
    match store.find_all(workspace_id, limit).await {
        Ok(pages) => pages.into_iter().filter(|p| filters.matches(p)).collect(),
        Err(e) => {
            tracing::warn!(workspace = workspace_id, error = %e, "page search failed");
            Vec::new()
        }
    }
}
