// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock retrieval service with canned file items and query capture.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use aware_core::types::{AdapterType, FileItem, HealthStatus};
use aware_core::{Adapter, AwareError, RetrievalQuery, Retriever};

/// A mock retriever that returns pre-configured file items and records
/// every query it receives.
pub struct MockRetriever {
    items: Arc<Mutex<Vec<FileItem>>>,
    queries: Arc<Mutex<Vec<RetrievalQuery>>>,
    failure: Arc<Mutex<Option<AwareError>>>,
}

impl MockRetriever {
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
            queries: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_items(items: Vec<FileItem>) -> Self {
        Self {
            items: Arc::new(Mutex::new(items)),
            queries: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    /// Make the next `retrieve` call fail once.
    pub async fn fail_next(&self, error: AwareError) {
        *self.failure.lock().await = Some(error);
    }

    /// Every query received so far, in order.
    pub async fn queries(&self) -> Vec<RetrievalQuery> {
        self.queries.lock().await.clone()
    }
}

impl Default for MockRetriever {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MockRetriever {
    fn name(&self) -> &str {
        "mock-retriever"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Retrieval
    }

    async fn health_check(&self) -> Result<HealthStatus, AwareError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AwareError> {
        Ok(())
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<FileItem>, AwareError> {
        self.queries.lock().await.push(query.clone());
        if let Some(error) = self.failure.lock().await.take() {
            return Err(error);
        }
        Ok(self.items.lock().await.clone())
    }
}
