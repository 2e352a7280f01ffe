use anyhow::{Context, Result, bail};
use reqwest::{Method, RequestBuilder, StatusCode};
use servis_api::Fields;
use tracing::{debug, error};

use crate::config::FirestoreConfig;
use crate::models::{FirestoreDocument, ListDocumentsResponse, field_path};

const PAGE_SIZE: &str = "300";

/// Thin client for the Firestore REST documents API
pub struct FirestoreClient {
    client: reqwest::Client,
    documents_url: String,
    access_token: Option<String>,
}

impl FirestoreClient {
    pub fn new(config: &FirestoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            documents_url: config.documents_url(),
            access_token: config.access_token.clone(),
        })
    }

    pub fn documents_url(&self) -> &str {
        &self.documents_url
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, collection, id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return the body; `None` when the server answers 404
    async fn send(&self, builder: RequestBuilder, url: &str, operation: &str) -> Result<Option<String>> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to {} at {}", operation, url))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        if !status.is_success() {
            error!("[FirestoreClient] {} failed with HTTP {}", operation, status.as_u16());
            bail!(
                "HTTP {} error from {}: {}",
                status.as_u16(),
                url,
                if body.len() > 500 {
                    format!("{}... (truncated)", body.chars().take(500).collect::<String>())
                } else {
                    body
                }
            );
        }
        Ok(Some(body))
    }

    fn parse<T: serde::de::DeserializeOwned>(body: &str, url: &str) -> Result<T> {
        serde_json::from_str(body).with_context(|| format!("Unexpected response format from {}", url))
    }

    /// All documents of a collection, following page tokens
    pub async fn list_documents(&self, collection: &str) -> Result<Vec<FirestoreDocument>> {
        let url = self.collection_url(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            let builder = self.request(Method::GET, &url).query(&query);
            // a collection that was never written lists as 404 on some servers
            let Some(body) = self.send(builder, &url, "list documents").await? else {
                break;
            };
            let page: ListDocumentsResponse = Self::parse(&body, &url)?;
            documents.extend(page.documents);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        debug!(
            "[FirestoreClient] Listed {} documents in {}",
            documents.len(),
            collection
        );
        Ok(documents)
    }

    pub async fn get_document(&self, collection: &str, id: &str) -> Result<Option<FirestoreDocument>> {
        let url = self.document_url(collection, id);
        let builder = self.request(Method::GET, &url);
        match self.send(builder, &url, "get document").await? {
            Some(body) => Ok(Some(Self::parse(&body, &url)?)),
            None => Ok(None),
        }
    }

    /// Create a document with a server-assigned id
    pub async fn create_document(&self, collection: &str, fields: &Fields) -> Result<FirestoreDocument> {
        let url = self.collection_url(collection);
        let builder = self
            .request(Method::POST, &url)
            .json(&FirestoreDocument::with_fields(fields));
        let body = self
            .send(builder, &url, "create document")
            .await?
            .with_context(|| format!("Collection endpoint {} not found", url))?;
        Self::parse(&body, &url)
    }

    /// Overwrite the given fields of an existing document, leaving the rest.
    ///
    /// Returns `None` when the document does not exist.
    pub async fn patch_document(
        &self,
        collection: &str,
        id: &str,
        fields: &Fields,
    ) -> Result<Option<FirestoreDocument>> {
        let url = self.document_url(collection, id);
        let mut query: Vec<(&str, String)> = fields
            .keys()
            .map(|name| ("updateMask.fieldPaths", field_path(name)))
            .collect();
        query.push(("currentDocument.exists", "true".to_string()));
        let builder = self
            .request(Method::PATCH, &url)
            .query(&query)
            .json(&FirestoreDocument::with_fields(fields));
        match self.send(builder, &url, "update document").await? {
            Some(body) => Ok(Some(Self::parse(&body, &url)?)),
            None => Ok(None),
        }
    }

    /// Delete a document; deleting a missing document succeeds
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        let url = self.document_url(collection, id);
        let builder = self.request(Method::DELETE, &url);
        self.send(builder, &url, "delete document").await?;
        Ok(())
    }
}
