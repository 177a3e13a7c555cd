// Copyright (c) 2025 - Cowboy AI, Inc.
//! Elasticsearch search index adapter
//!
//! Implements [`SearchIndex`] against the Elasticsearch REST API:
//!
//! ```text
//! ensure_index = HEAD /books, then PUT /books with the mapping
//! upsert       = PUT /books/_doc/{id}   (full document replace)
//! remove       = DELETE /books/_doc/{id} (404 tolerated)
//! search       = POST /books/_search     (multi_match on Title/Description)
//! ```
//!
//! The index holds the flat [`IndexedBook`] projection with text-analyzed
//! `Title`/`Description` and integer id fields.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::IndexedBook;
use crate::index::{IndexError, SearchIndex};

/// Configuration for the Elasticsearch connection
#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    /// Base URL (e.g., "http://localhost:9200")
    pub base_url: String,

    /// Basic-auth username, if the cluster requires authentication
    pub username: Option<String>,

    /// Basic-auth password
    pub password: Option<String>,

    /// Index name holding book documents
    pub index: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9200".to_string(),
            username: None,
            password: None,
            index: "books".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Elasticsearch-backed [`SearchIndex`]
pub struct ElasticsearchIndex {
    config: ElasticsearchConfig,
    client: Client,
}

impl ElasticsearchIndex {
    /// Create a new adapter for the configured cluster
    pub fn new(config: ElasticsearchConfig) -> Result<Self, IndexError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IndexError::Unavailable(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self.client.request(method, self.url(path));
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_deref());
        }
        request
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, IndexError> {
        request
            .send()
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))
    }

    /// Turn a non-success response into a [`IndexError::Rejected`]
    async fn rejection(response: Response) -> IndexError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_else(|_| "".to_string());
        let reason = error_reason(&body).unwrap_or(body);
        IndexError::Rejected { status, reason }
    }
}

/// Extract the backend's diagnostic reason from an error body
fn error_reason(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .pointer("/error/reason")?
        .as_str()
        .map(str::to_string)
}

/// Mapping for the book index: text-analyzed title/description, integer ids
fn index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "Id": { "type": "integer" },
                "Title": { "type": "text" },
                "Description": { "type": "text" },
                "AuthorId": { "type": "integer" },
                "CategoryId": { "type": "integer" }
            }
        }
    })
}

fn search_body(query: &str) -> Value {
    json!({
        "query": {
            "multi_match": {
                "query": query,
                "fields": ["Title", "Description"]
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_source")]
    source: IndexedBook,
}

#[async_trait::async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn ensure_index(&self) -> Result<(), IndexError> {
        // Reachability first, so a down cluster reads as unavailable rather
        // than as a missing index.
        let ping = self.send(self.request(Method::GET, "")).await?;
        if !ping.status().is_success() {
            return Err(Self::rejection(ping).await);
        }

        let exists = self
            .send(self.request(Method::HEAD, &self.config.index))
            .await?;

        match exists.status() {
            StatusCode::OK => {
                info!(index = %self.config.index, "search index already exists");
                return Ok(());
            }
            StatusCode::NOT_FOUND => {}
            _ => return Err(Self::rejection(exists).await),
        }

        let created = self
            .send(
                self.request(Method::PUT, &self.config.index)
                    .json(&index_mapping()),
            )
            .await?;

        if created.status().is_success() {
            info!(index = %self.config.index, "search index created");
            Ok(())
        } else {
            Err(Self::rejection(created).await)
        }
    }

    async fn upsert(&self, document: &IndexedBook) -> Result<(), IndexError> {
        let path = format!("{}/_doc/{}", self.config.index, document.id);
        let response = self
            .send(self.request(Method::PUT, &path).json(document))
            .await?;

        if response.status().is_success() {
            debug!(book_id = document.id, "document written to search index");
            Ok(())
        } else {
            Err(Self::rejection(response).await)
        }
    }

    async fn remove(&self, book_id: i32) -> Result<(), IndexError> {
        let path = format!("{}/_doc/{}", self.config.index, book_id);
        let response = self.send(self.request(Method::DELETE, &path)).await?;

        // Absent documents are fine: removal is idempotent.
        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            debug!(book_id, "document removed from search index");
            Ok(())
        } else {
            Err(Self::rejection(response).await)
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<IndexedBook>, IndexError> {
        let path = format!("{}/_search", self.config.index);
        let response = self
            .send(self.request(Method::POST, &path).json(&search_body(query)))
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| IndexError::InvalidResponse(e.to_string()))?;

        Ok(parsed.hits.hits.into_iter().map(|hit| hit.source).collect())
    }

    fn name(&self) -> &str {
        "elasticsearch"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn config_defaults() {
        let config = ElasticsearchConfig::default();

        assert_eq!(config.base_url, "http://localhost:9200");
        assert_eq!(config.index, "books");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.username.is_none());
    }

    #[test]
    fn mapping_declares_text_and_integer_fields() {
        let mapping = index_mapping();

        assert_eq!(mapping["mappings"]["properties"]["Title"]["type"], "text");
        assert_eq!(
            mapping["mappings"]["properties"]["Description"]["type"],
            "text"
        );
        assert_eq!(mapping["mappings"]["properties"]["Id"]["type"], "integer");
        assert_eq!(
            mapping["mappings"]["properties"]["AuthorId"]["type"],
            "integer"
        );
    }

    #[test]
    fn search_body_matches_title_and_description() {
        let body = search_body("Pamuk");

        assert_eq!(body["query"]["multi_match"]["query"], "Pamuk");
        assert_eq!(
            body["query"]["multi_match"]["fields"],
            serde_json::json!(["Title", "Description"])
        );
    }

    #[test]
    fn search_response_hits_decode_in_order() {
        let raw = r#"{
            "took": 3,
            "hits": {
                "total": {"value": 2},
                "hits": [
                    {"_id": "7", "_score": 1.2, "_source":
                        {"Id": 7, "Title": "Masumiyet Müzesi", "AuthorId": 1, "CategoryId": 1}},
                    {"_id": "9", "_score": 0.4, "_source":
                        {"Id": 9, "Title": "Kar", "Description": "Bir şehir", "AuthorId": 1, "CategoryId": 1}}
                ]
            }
        }"#;

        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        let ids: Vec<i32> = parsed.hits.hits.iter().map(|h| h.source.id).collect();

        assert_eq!(ids, vec![7, 9]);
        assert_eq!(parsed.hits.hits[1].source.description.as_deref(), Some("Bir şehir"));
    }

    #[test]
    fn error_reason_prefers_the_backend_diagnostic() {
        let body = r#"{"error": {"reason": "index is read only", "type": "cluster_block_exception"}}"#;

        assert_eq!(error_reason(body).as_deref(), Some("index is read only"));
        assert_eq!(error_reason("not json"), None);
    }
}
