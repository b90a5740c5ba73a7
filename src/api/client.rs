use reqwest::Client;

use crate::api::types::{CommitRequest, Document, QueryRequest, QueryResponse, Write};
use crate::config::BackendConfig;
use crate::error::{Error, Result};

/// Thin client for the hosted document API.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    token: String,
}

impl BackendClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(&config.base_url, &config.api_token)
    }

    pub async fn query(&self, collection: &str, req: &QueryRequest) -> Result<Vec<Document>> {
        let resp = self
            .client
            .post(format!("{}/collections/{}:query", self.base_url, collection))
            .bearer_auth(&self.token)
            .json(req)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(Error::Api { status, message });
        }

        let body = resp.json::<QueryResponse>().await?;
        Ok(body.documents)
    }

    /// Apply all writes atomically. The backend rejects the whole request if
    /// any write fails.
    pub async fn commit(&self, writes: Vec<Write>) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}/documents:commit", self.base_url))
            .bearer_auth(&self.token)
            .json(&CommitRequest { writes })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(Error::Api { status, message });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, BackendClient) {
        let server = MockServer::start().await;
        let client = BackendClient::new(&server.uri(), "test-token");
        (server, client)
    }

    #[tokio::test]
    async fn query_sends_correct_request() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/collections/page_links:query"))
            .and(header("Authorization", "Bearer test-token"))
            .and(body_json(json!({
                "where": [{"field": "sourcePageId", "op": "==", "value": "p1"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [{"id": "l1", "fields": {"sourcePageId": "p1"}}]
            })))
            .mount(&server)
            .await;

        let docs = client
            .query(
                "page_links",
                &QueryRequest::field_equals("sourcePageId", "p1"),
            )
            .await
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "l1");
    }

    #[tokio::test]
    async fn query_without_documents_is_empty() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/collections/pages:query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let docs = client
            .query("pages", &QueryRequest::field_equals("workspaceId", "ws"))
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn query_returns_error_on_500() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/collections/pages:query"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let err = client
            .query("pages", &QueryRequest::field_equals("workspaceId", "ws"))
            .await;

        match err.unwrap_err() {
            Error::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("Expected Api error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn commit_sends_all_writes_in_one_request() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/documents:commit"))
            .and(header("Authorization", "Bearer test-token"))
            .and(body_json(json!({"writes": [
                {"delete": {"collection": "page_links", "id": "l1"}},
                {"delete": {"collection": "page_links", "id": "l2"}}
            ]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let result = client
            .commit(vec![Write::delete_edge("l1"), Write::delete_edge("l2")])
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn commit_returns_error_on_409() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/documents:commit"))
            .respond_with(ResponseTemplate::new(409).set_body_string("aborted"))
            .mount(&server)
            .await;

        let err = client.commit(vec![Write::delete_edge("l1")]).await;
        assert!(matches!(err, Err(Error::Api { status: 409, .. })));
    }
}
