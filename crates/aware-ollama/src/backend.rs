// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GenerationBackend implementation over [`OllamaClient`].

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use aware_config::model::OllamaConfig;
use aware_core::types::{ChunkCodec, GenerationRequest, GenerationStream};
use aware_core::{Adapter, AdapterType, AwareError, GenerationBackend, HealthStatus};

use crate::client::OllamaClient;

/// Local generation backend speaking the ollama wire format.
pub struct OllamaBackend {
    client: OllamaClient,
}

impl OllamaBackend {
    /// Creates the backend from configuration.
    pub fn new(config: &OllamaConfig) -> Result<Self, AwareError> {
        Ok(Self {
            client: OllamaClient::new(config.url.clone())?,
        })
    }
}

#[async_trait]
impl Adapter for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, AwareError> {
        // /api/tags answers without touching any model.
        let url = format!("{}/api/tags", self.client.base_url());
        match reqwest::get(&url).await {
            Ok(response) if response.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(response) => Ok(HealthStatus::Degraded(format!(
                "ollama answered {}",
                response.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("ollama unreachable: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), AwareError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    fn codec(&self) -> ChunkCodec {
        ChunkCodec::JsonLines
    }

    async fn stream(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<GenerationStream, AwareError> {
        self.client.stream_chat(&request, cancel).await
    }
}
