// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the local ollama chat API.
//!
//! Provides [`OllamaClient`] which handles request construction, error
//! mapping, and exposing the response body as a cancellable byte stream.

use std::time::Duration;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use aware_core::types::{ChunkCodec, GenerationRequest, GenerationStream};
use aware_core::AwareError;

use crate::types::{ChatRequest, ErrorBody};

/// HTTP client for ollama communication.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    /// Creates a new client for the ollama server at `base_url`.
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

    /// Sends a streaming chat request.
    ///
    /// A 404 means the requested model is not pulled locally. Any other
    /// non-2xx status maps to `Transport` carrying the server's error
    /// message. The returned byte stream ends early once `cancel` fires.
    pub async fn stream_chat(
        &self,
        request: &GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<GenerationStream, AwareError> {
        let payload = ChatRequest::from_generation(request);
        let url = format!("{}/api/chat", self.base_url);

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
        debug!(status = %status, model = %payload.model, "ollama response received");

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AwareError::ModelNotAvailable(payload.model));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(parsed) => parsed.error,
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
            codec: ChunkCodec::JsonLines,
            body: Some(Box::pin(bytes)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aware_core::types::{ChatSettings, EmbeddingsProvider, HistoryMessage, Role};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_request(model: &str) -> GenerationRequest {
        GenerationRequest {
            settings: ChatSettings {
                model: model.into(),
                prompt: "You are helpful.".into(),
                temperature: 0.5,
                context_length: 4096,
                include_profile_context: false,
                include_workspace_instructions: false,
                embeddings_provider: EmbeddingsProvider::Local,
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
            for line in String::from_utf8_lossy(&bytes).lines() {
                if line.trim().is_empty() {
                    continue;
                }
                out.push_str(&stream.codec.decode(line).unwrap());
            }
        }
        out
    }

    #[tokio::test]
    async fn stream_chat_decodes_json_lines() {
        let server = MockServer::start().await;
        let body = concat!(
            "{\"message\":{\"content\":\"Hi\"}}\n",
            "{\"message\":{\"content\":\" there\"}}\n",
        );
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"),
            )
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri()).unwrap();
        let stream = client
            .stream_chat(&test_request("llama3"), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(stream.codec, ChunkCodec::JsonLines);
        assert_eq!(collect_text(stream).await, "Hi there");
    }

    #[tokio::test]
    async fn missing_model_maps_404_to_model_not_available() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "model 'ghost' not found"})),
            )
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri()).unwrap();
        let err = client
            .stream_chat(&test_request("ghost"), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AwareError::ModelNotAvailable(ref m) if m == "ghost"));
    }

    #[tokio::test]
    async fn server_error_surfaces_body_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"error": "out of memory"})),
            )
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri()).unwrap();
        let err = client
            .stream_chat(&test_request("llama3"), CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            AwareError::Transport { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "out of memory");
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparseable_error_body_is_passed_through_raw() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri()).unwrap();
        let err = client
            .stream_chat(&test_request("llama3"), CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            AwareError::Transport { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "bad gateway");
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancelled_token_aborts_before_request() {
        let server = MockServer::start().await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let client = OllamaClient::new(server.uri()).unwrap();
        let result = client.stream_chat(&test_request("llama3"), cancel).await;
        assert!(matches!(result, Err(AwareError::Stream(_))));
    }
}
