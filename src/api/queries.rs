use crate::api::types::QueryRequest;

pub fn links_from(source_id: &str) -> QueryRequest {
    QueryRequest::field_equals("sourcePageId", source_id)
}

pub fn links_to(target_id: &str) -> QueryRequest {
    QueryRequest::field_equals("targetPageId", target_id)
}

/// Workspace pages, most recently updated first.
pub fn workspace_pages(workspace_id: &str, limit: usize) -> QueryRequest {
    QueryRequest::field_equals("workspaceId", workspace_id)
        .newest_first("updatedAt")
        .limit(limit)
}

pub fn workspace_members(workspace_id: &str, limit: usize) -> QueryRequest {
    QueryRequest::field_equals("workspaceId", workspace_id).limit(limit)
}
