// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the hosted chat API.

use std::time::Duration;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use aware_core::types::{ChunkCodec, GenerationRequest, GenerationStream, HostedProvider};
use aware_core::AwareError;

use crate::types::{ChatRequest, ErrorBody};

/// HTTP client for hosted chat API communication.
#[derive(Debug, Clone)]
pub struct HostedClient {
    client: reqwest::Client,
    base_url: String,
}

impl HostedClient {
    /// Creates a new client for the hosted API at `base_url`.
    pub fn new(base_url: String) -> Result<Self, AwareError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| AwareError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client, base_url })
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a streaming chat request to the given provider endpoint.
    ///
    /// Chunks on the returned stream are raw incremental text. A non-2xx
    /// status maps to `Transport` carrying the server's error message.
    /// The byte stream ends early once `cancel` fires.
    pub async fn stream_chat(
        &self,
        provider: HostedProvider,
        request: &GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<GenerationStream, AwareError> {
        let payload = ChatRequest::from_generation(request);
        let url = format!("{}/chat/{provider}", self.base_url);

        let send = self.client.post(&url).json(&payload).send();
        let response = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(AwareError::Stream("generation cancelled".into()));
            }
            result = send => result.map_err(|e| AwareError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?,
        };

        let status = response.status();
        debug!(status = %status, %provider, "hosted response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(parsed) => parsed.message,
                Err(_) => body,
            };
            return Err(AwareError::Transport {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| AwareError::Stream(e.to_string())))
            .take_until(cancel.cancelled_owned());

        Ok(GenerationStream {
            codec: ChunkCodec::RawText,
            body: Some(Box::pin(bytes)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aware_core::types::{ChatSettings, EmbeddingsProvider, HistoryMessage, Role};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_request() -> GenerationRequest {
        GenerationRequest {
            settings: ChatSettings {
                model: "gpt-4".into(),
                prompt: "You are helpful.".into(),
                temperature: 0.7,
                context_length: 4096,
                include_profile_context: false,
                include_workspace_instructions: false,
                embeddings_provider: EmbeddingsProvider::OpenAi,
            },
            messages: vec![HistoryMessage {
                role: Role::User,
                content: "Hello".into(),
            }],
        }
    }

    async fn collect_text(stream: GenerationStream) -> String {
        let mut body = stream.body.unwrap();
        let mut out = String::new();
        while let Some(chunk) = body.next().await {
            let bytes = chunk.unwrap();
            let text = String::from_utf8_lossy(&bytes);
            out.push_str(&stream.codec.decode(&text).unwrap());
        }
        out
    }

    #[tokio::test]
    async fn stream_chat_returns_raw_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/openai"))
            .and(body_partial_json(
                serde_json::json!({"chatSettings": {"model": "gpt-4"}}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string("Hi there"))
            .mount(&server)
            .await;

        let client = HostedClient::new(server.uri()).unwrap();
        let stream = client
            .stream_chat(
                HostedProvider::OpenAi,
                &test_request(),
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(stream.codec, ChunkCodec::RawText);
        assert_eq!(collect_text(stream).await, "Hi there");
    }

    #[tokio::test]
    async fn provider_selects_url_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/anthropic"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = HostedClient::new(server.uri()).unwrap();
        let result = client
            .stream_chat(
                HostedProvider::Anthropic,
                &test_request(),
                CancellationToken::new(),
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn api_error_surfaces_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/openai"))
            .respond_with(ResponseTemplate::new(400).set_body_json(
                serde_json::json!({"message": "OpenAI API Key not found"}),
            ))
            .mount(&server)
            .await;

        let client = HostedClient::new(server.uri()).unwrap();
        let err = client
            .stream_chat(
                HostedProvider::OpenAi,
                &test_request(),
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        match err {
            AwareError::Transport { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "OpenAI API Key not found");
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancelled_token_aborts_before_request() {
        let server = MockServer::start().await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let client = HostedClient::new(server.uri()).unwrap();
        let result = client
            .stream_chat(HostedProvider::OpenAi, &test_request(), cancel)
            .await;
        assert!(matches!(result, Err(AwareError::Stream(_))));
    }
}
