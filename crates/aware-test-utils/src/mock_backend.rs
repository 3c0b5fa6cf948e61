// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation backend for deterministic testing.
//!
//! `MockBackend` implements `GenerationBackend` with scripted chunk
//! streams, enabling fast, CI-runnable tests without a running inference
//! endpoint.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use aware_core::types::{
    AdapterType, ChunkCodec, GenerationRequest, GenerationStream, HealthStatus,
};
use aware_core::{Adapter, AwareError, GenerationBackend};

/// One scripted response: the chunk sequence one `stream()` call yields.
#[derive(Debug, Clone)]
pub struct Script {
    pub chunks: Vec<String>,
    /// Stop yielding after this many chunks and pend until cancelled.
    /// Lets tests hold a generation open while they call `stop()`.
    pub hang_after: Option<usize>,
}

impl Script {
    pub fn text(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            hang_after: None,
        }
    }

    pub fn hanging_after(chunks: &[&str], yield_count: usize) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            hang_after: Some(yield_count),
        }
    }
}

/// A mock generation backend that streams pre-configured responses.
///
/// Scripts are popped from a FIFO queue. When the queue is empty, a
/// single-chunk "mock response" is streamed. A queued error is returned
/// from `stream()` itself, before any body exists.
pub struct MockBackend {
    codec: ChunkCodec,
    scripts: Arc<Mutex<VecDeque<Result<Script, AwareError>>>>,
}

impl MockBackend {
    /// Create a new mock backend with an empty script queue.
    pub fn new() -> Self {
        Self {
            codec: ChunkCodec::RawText,
            scripts: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create a mock backend pre-loaded with one plain-text response per
    /// chunk list.
    pub fn with_responses(responses: Vec<Vec<String>>) -> Self {
        let scripts = responses
            .into_iter()
            .map(|chunks| {
                Ok(Script {
                    chunks,
                    hang_after: None,
                })
            })
            .collect();
        Self {
            codec: ChunkCodec::RawText,
            scripts: Arc::new(Mutex::new(scripts)),
        }
    }

    /// Queue a scripted response.
    pub async fn add_script(&self, script: Script) {
        self.scripts.lock().await.push_back(Ok(script));
    }

    /// Queue a request-level failure.
    pub async fn add_failure(&self, error: AwareError) {
        self.scripts.lock().await.push_back(Err(error));
    }

    async fn next_script(&self) -> Result<Script, AwareError> {
        self.scripts
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Script::text(&["mock response"])))
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, AwareError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AwareError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    fn codec(&self) -> ChunkCodec {
        self.codec
    }

    async fn stream(
        &self,
        _request: GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<GenerationStream, AwareError> {
        let script = self.next_script().await?;

        let items: Vec<Result<Bytes, AwareError>> = script
            .chunks
            .into_iter()
            .map(|c| Ok(Bytes::from(c.into_bytes())))
            .collect();

        // Like the real backends, the body ends when the token fires.
        let body = match script.hang_after {
            Some(yield_count) => stream::iter(items)
                .take(yield_count)
                .chain(stream::pending())
                .take_until(cancel.cancelled_owned())
                .boxed(),
            None => stream::iter(items)
                .take_until(cancel.cancelled_owned())
                .boxed(),
        };

        Ok(GenerationStream {
            codec: self.codec,
            body: Some(body),
        })
    }
}
