// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the retrieval RPC.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use aware_core::types::FileItem;
use aware_core::{
    Adapter, AdapterType, AwareError, HealthStatus, RetrievalQuery, Retriever,
};

/// Request body for `POST /retrieval/retrieve`. The API expects camelCase.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveRequest<'a> {
    user_input: &'a str,
    file_ids: &'a [String],
    embeddings_provider: String,
    source_count: usize,
}

#[derive(Debug, Deserialize)]
struct RetrieveResponse {
    results: Vec<FileItem>,
}

/// Retrieval adapter talking to the hosted retrieval endpoint.
pub struct HttpRetriever {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRetriever {
    /// Creates a retriever for the API at `base_url`.
    pub fn new(base_url: String) -> Result<Self, AwareError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AwareError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl Adapter for HttpRetriever {
    fn name(&self) -> &str {
        "retrieval"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Retrieval
    }

    async fn health_check(&self) -> Result<HealthStatus, AwareError> {
        match reqwest::get(&self.base_url).await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "retrieval API unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), AwareError> {
        Ok(())
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<FileItem>, AwareError> {
        let url = format!("{}/retrieval/retrieve", self.base_url);
        let body = RetrieveRequest {
            user_input: &query.user_input,
            file_ids: &query.file_ids,
            embeddings_provider: query.embeddings_provider.to_string(),
            source_count: query.source_count,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AwareError::Provider {
                message: format!("retrieval request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AwareError::Transport {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: RetrieveResponse =
            response.json().await.map_err(|e| AwareError::Provider {
                message: format!("failed to parse retrieval response: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(results = parsed.results.len(), "retrieval complete");
        Ok(parsed.results)
    }
}
