use std::sync::Arc;

use async_trait::async_trait;

use super::{Candidate, ReferenceKind};
use crate::config::SuggestConfig;
use crate::store::{MemberStore, PageStore};

/// Produces candidates for a partial query.
///
/// Implementations never fail: a backend error degrades to an empty list so
/// the overlay can show "no results".
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn query(&self, text: &str) -> Vec<Candidate>;
}

/// Keep candidates whose label contains `text`, ignoring case. Order is
/// preserved.
pub fn filter_by_label(candidates: Vec<Candidate>, text: &str) -> Vec<Candidate> {
    let needle = text.to_lowercase();
    candidates
        .into_iter()
        .filter(|c| c.label.to_lowercase().contains(&needle))
        .collect()
}

/// Page lookup for `[[` links, scoped to one workspace.
pub struct PageSuggestions {
    store: Arc<dyn PageStore>,
    workspace_id: String,
    recent_limit: usize,
    search_limit: usize,
}

impl PageSuggestions {
    pub fn new(store: Arc<dyn PageStore>, workspace_id: &str, config: &SuggestConfig) -> Self {
        Self {
            store,
            workspace_id: workspace_id.to_string(),
            recent_limit: config.recent_limit,
            search_limit: config.search_limit,
        }
    }
}

#[async_trait]
impl SuggestionSource for PageSuggestions {
    async fn query(&self, text: &str) -> Vec<Candidate> {
        // Only a truly empty query lists recent pages; whitespace is a filter.
        let pages = if text.is_empty() {
            self.store
                .find_recent(&self.workspace_id, self.recent_limit)
                .await
        } else {
            self.store
                .find_all(&self.workspace_id, self.search_limit)
                .await
        };

        let pages = match pages {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!(
                    workspace = %self.workspace_id,
                    query = text,
                    error = %e,
                    "page search failed"
                );
                return Vec::new();
            }
        };

        let candidates: Vec<Candidate> = pages.iter().map(Candidate::from_page).collect();
        if text.is_empty() {
            candidates
        } else {
            // Match on the raw title so "Untitled" placeholders never match
            pages
                .iter()
                .zip(candidates)
                .filter(|(page, _)| page.title.to_lowercase().contains(&text.to_lowercase()))
                .map(|(_, c)| c)
                .collect()
        }
    }
}

/// Workspace member lookup for `@` mentions.
pub struct CollaboratorSuggestions {
    store: Arc<dyn MemberStore>,
    workspace_id: String,
    recent_limit: usize,
    search_limit: usize,
}

impl CollaboratorSuggestions {
    pub fn new(store: Arc<dyn MemberStore>, workspace_id: &str, config: &SuggestConfig) -> Self {
        Self {
            store,
            workspace_id: workspace_id.to_string(),
            recent_limit: config.recent_limit,
            search_limit: config.search_limit,
        }
    }
}

#[async_trait]
impl SuggestionSource for CollaboratorSuggestions {
    async fn query(&self, text: &str) -> Vec<Candidate> {
        let members = match self
            .store
            .find_members(&self.workspace_id, self.search_limit)
            .await
        {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!(
                    workspace = %self.workspace_id,
                    query = text,
                    error = %e,
                    "member search failed"
                );
                return Vec::new();
            }
        };

        let candidates: Vec<Candidate> = members.iter().map(Candidate::from_member).collect();
        if text.is_empty() {
            candidates.into_iter().take(self.recent_limit).collect()
        } else {
            filter_by_label(candidates, text)
        }
    }
}

/// One source per reference kind.
#[derive(Clone)]
pub struct SuggestionSources {
    pub pages: Arc<dyn SuggestionSource>,
    pub collaborators: Arc<dyn SuggestionSource>,
}

impl SuggestionSources {
    pub fn for_kind(&self, kind: ReferenceKind) -> Arc<dyn SuggestionSource> {
        match kind {
            ReferenceKind::Page => self.pages.clone(),
            ReferenceKind::Collaborator => self.collaborators.clone(),
        }
    }
}
