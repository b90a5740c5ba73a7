use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque identifier of a page/document.
pub type DocumentId = String;
pub type EdgeId = String;

pub const PAGES_COLLECTION: &str = "pages";
pub const PAGE_LINKS_COLLECTION: &str = "page_links";
pub const MEMBERS_COLLECTION: &str = "workspace_members";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: DocumentId,
    pub workspace_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default = "default_page_type")]
    pub page_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub icon: Option<String>,
    pub updated_at: DateTime<Utc>,
}

fn default_page_type() -> String {
    "page".into()
}

/// A stored `source → target` link between two pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceEdge {
    pub id: EdgeId,
    #[serde(rename = "sourcePageId")]
    pub source_id: DocumentId,
    #[serde(rename = "targetPageId")]
    pub target_id: DocumentId,
    /// Unset while the backend has not resolved the server timestamp.
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An edge that has not been persisted yet; the store assigns id and
/// creation time.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct EdgeDraft {
    #[serde(rename = "sourcePageId")]
    pub source_id: DocumentId,
    #[serde(rename = "targetPageId")]
    pub target_id: DocumentId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Member {
    /// Display label: name, then email, then the raw id.
    pub fn label(&self) -> &str {
        [&self.display_name, &self.email]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or(self.id.as_str())
    }
}

// --- Wire format of the hosted document API ---

#[derive(Debug, Serialize)]
pub struct QueryRequest {
    #[serde(rename = "where")]
    pub filters: Vec<FieldFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl QueryRequest {
    pub fn field_equals(field: &str, value: &str) -> Self {
        Self {
            filters: vec![FieldFilter {
                field: field.to_string(),
                op: "==".into(),
                value: serde_json::Value::String(value.to_string()),
            }],
            order_by: None,
            limit: None,
        }
    }

    pub fn newest_first(mut self, field: &str) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction: Direction::Desc,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct FieldFilter {
    pub field: String,
    pub op: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Document {
    /// Decode the document fields into `T`, with the document id exposed as
    /// the `id` field.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let mut fields = self.fields.clone();
        fields.insert("id".into(), serde_json::Value::String(self.id.clone()));
        serde_json::from_value(serde_json::Value::Object(fields)).map_err(Error::from)
    }
}

#[derive(Debug, Serialize)]
pub struct CommitRequest {
    pub writes: Vec<Write>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Write {
    Delete {
        collection: String,
        id: String,
    },
    Create {
        collection: String,
        fields: serde_json::Value,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        server_timestamps: Vec<String>,
    },
}

impl Write {
    pub fn delete_edge(id: &str) -> Self {
        Self::Delete {
            collection: PAGE_LINKS_COLLECTION.into(),
            id: id.to_string(),
        }
    }

    pub fn create_edge(draft: &EdgeDraft) -> Result<Self> {
        Ok(Self::Create {
            collection: PAGE_LINKS_COLLECTION.into(),
            fields: serde_json::to_value(draft)?,
            server_timestamps: vec!["createdAt".into()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_request_serializes_where_order_and_limit() {
        let req = QueryRequest::field_equals("workspaceId", "ws-1")
            .newest_first("updatedAt")
            .limit(50);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "where": [{"field": "workspaceId", "op": "==", "value": "ws-1"}],
                "order_by": {"field": "updatedAt", "direction": "desc"},
                "limit": 50
            })
        );
    }

    #[test]
    fn query_request_omits_unset_order_and_limit() {
        let value = serde_json::to_value(QueryRequest::field_equals("sourcePageId", "p1")).unwrap();
        assert!(value.get("order_by").is_none());
        assert!(value.get("limit").is_none());
    }

    #[test]
    fn document_decodes_page_with_camel_case_fields() {
        let doc: Document = serde_json::from_value(json!({
            "id": "page-1",
            "fields": {
                "workspaceId": "ws-1",
                "title": "Roadmap",
                "type": "database",
                "tags": ["q3"],
                "updatedAt": "2026-02-21T10:00:00Z"
            }
        }))
        .unwrap();
        let page: Page = doc.decode().unwrap();
        assert_eq!(page.id, "page-1");
        assert_eq!(page.title, "Roadmap");
        assert_eq!(page.page_type, "database");
        assert_eq!(page.tags, vec!["q3"]);
        assert!(page.icon.is_none());
    }

    #[test]
    fn document_decodes_edge() {
        let doc: Document = serde_json::from_value(json!({
            "id": "link-1",
            "fields": {
                "sourcePageId": "a",
                "targetPageId": "b",
                "createdAt": "2026-02-21T10:00:00Z"
            }
        }))
        .unwrap();
        let edge: ReferenceEdge = doc.decode().unwrap();
        assert_eq!(edge.id, "link-1");
        assert_eq!(edge.source_id, "a");
        assert_eq!(edge.target_id, "b");
        assert!(edge.created_at.is_some());
    }

    #[test]
    fn edge_with_pending_timestamp_still_decodes() {
        for fields in [
            json!({"sourcePageId": "a", "targetPageId": "b", "createdAt": null}),
            json!({"sourcePageId": "a", "targetPageId": "b"}),
        ] {
            let doc: Document = serde_json::from_value(json!({"id": "link-1", "fields": fields}))
                .unwrap();
            let edge: ReferenceEdge = doc.decode().unwrap();
            assert_eq!(edge.target_id, "b");
            assert!(edge.created_at.is_none());
        }
    }

    #[test]
    fn document_missing_required_field_is_decode_error() {
        let doc: Document =
            serde_json::from_value(json!({"id": "link-1", "fields": {"sourcePageId": "a"}}))
                .unwrap();
        let err = doc.decode::<ReferenceEdge>().unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn create_edge_write_requests_server_timestamp() {
        let write = Write::create_edge(&EdgeDraft {
            source_id: "a".into(),
            target_id: "b".into(),
        })
        .unwrap();
        let value = serde_json::to_value(&write).unwrap();
        assert_eq!(
            value,
            json!({"create": {
                "collection": "page_links",
                "fields": {"sourcePageId": "a", "targetPageId": "b"},
                "server_timestamps": ["createdAt"]
            }})
        );
    }

    #[test]
    fn delete_edge_write_serializes() {
        let value = serde_json::to_value(Write::delete_edge("link-9")).unwrap();
        assert_eq!(
            value,
            json!({"delete": {"collection": "page_links", "id": "link-9"}})
        );
    }

    #[test]
    fn member_label_falls_back_to_email_then_id() {
        let named = Member {
            id: "u1".into(),
            display_name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
        };
        let email_only = Member {
            id: "u2".into(),
            display_name: Some("  ".into()),
            email: Some("bob@example.com".into()),
        };
        let bare = Member {
            id: "u3".into(),
            display_name: None,
            email: None,
        };
        assert_eq!(named.label(), "Ada");
        assert_eq!(email_only.label(), "bob@example.com");
        assert_eq!(bare.label(), "u3");
    }
}
