use std::sync::Arc;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::config::{ClientConfig, Endpoint};
use crate::error::ClientError;
use crate::model::{IndexRequest, IndexSnapshot, SearchRequest, SearchResponse};

/// HTTP client for the indexing/search service. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: Arc<ClientConfig>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("http client: {e}")))?;
        Ok(Self { http, config: Arc::new(config) })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Probes the service root.
    pub async fn health(&self) -> Result<(), ClientError> {
        let url = self.config.endpoint_url(Endpoint::Health)?;
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ClientError::Transport { endpoint: Endpoint::Health, source })?;
        ensure_success(Endpoint::Health, &resp)?;
        Ok(())
    }

    /// Sends the decoded texts, in selection order, to be (re)indexed.
    ///
    /// The body of a successful response must be JSON but is otherwise unused.
    pub async fn index_documents(&self, documents: &[String]) -> Result<(), ClientError> {
        let url = self.config.endpoint_url(Endpoint::Index)?;
        let resp = self
            .http
            .post(url)
            .json(&IndexRequest { documents })
            .send()
            .await
            .map_err(|source| ClientError::Transport { endpoint: Endpoint::Index, source })?;
        let _: serde_json::Value = read_json(Endpoint::Index, resp).await?;
        tracing::info!(documents = documents.len(), "indexing request accepted");
        Ok(())
    }

    pub async fn fetch_snapshot(&self) -> Result<IndexSnapshot, ClientError> {
        let url = self.config.endpoint_url(Endpoint::ViewIndex)?;
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ClientError::Transport { endpoint: Endpoint::ViewIndex, source })?;
        let snapshot: IndexSnapshot = read_json(Endpoint::ViewIndex, resp).await?;
        tracing::info!(
            documents = snapshot.document_count(),
            terms = snapshot.tfidf.len(),
            "fetched index snapshot"
        );
        Ok(snapshot)
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ClientError> {
        let url = self.config.endpoint_url(Endpoint::Search)?;
        let resp = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|source| ClientError::Transport { endpoint: Endpoint::Search, source })?;
        let response: SearchResponse = read_json(Endpoint::Search, resp).await?;
        tracing::info!(metric = %request.metric, "search completed");
        Ok(response)
    }
}

fn ensure_success(endpoint: Endpoint, resp: &Response) -> Result<(), ClientError> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ClientError::Status { endpoint, status: status.as_u16() })
    }
}

async fn read_json<T: DeserializeOwned>(endpoint: Endpoint, resp: Response) -> Result<T, ClientError> {
    ensure_success(endpoint, &resp)?;
    resp.json::<T>().await.map_err(|source| ClientError::Transport { endpoint, source })
}
