// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GenerationBackend implementation over [`HostedClient`].

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use aware_config::model::HostedConfig;
use aware_core::types::{ChunkCodec, GenerationRequest, GenerationStream, HostedProvider};
use aware_core::{Adapter, AdapterType, AwareError, GenerationBackend, HealthStatus};

use crate::client::HostedClient;

/// Routes `openai` requests to the enterprise `azure` endpoint when the
/// profile opts in. Every other provider passes through unchanged.
pub fn resolve_provider(provider: HostedProvider, use_azure_openai: bool) -> HostedProvider {
    if provider == HostedProvider::OpenAi && use_azure_openai {
        HostedProvider::Azure
    } else {
        provider
    }
}

/// Hosted generation backend bound to one provider endpoint.
pub struct HostedBackend {
    client: HostedClient,
    provider: HostedProvider,
}

impl HostedBackend {
    /// Creates the backend from configuration, applying the azure
    /// override to the given provider.
    pub fn new(config: &HostedConfig, provider: HostedProvider) -> Result<Self, AwareError> {
        Ok(Self {
            client: HostedClient::new(config.base_url.clone())?,
            provider: resolve_provider(provider, config.use_azure_openai),
        })
    }

    /// The provider endpoint this backend targets.
    pub fn provider(&self) -> HostedProvider {
        self.provider
    }
}

#[async_trait]
impl Adapter for HostedBackend {
    fn name(&self) -> &str {
        "hosted"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, AwareError> {
        match reqwest::get(self.client.base_url()).await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "hosted API unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), AwareError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationBackend for HostedBackend {
    fn codec(&self) -> ChunkCodec {
        ChunkCodec::RawText
    }

    async fn stream(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<GenerationStream, AwareError> {
        self.client.stream_chat(self.provider, &request, cancel).await
    }
}
