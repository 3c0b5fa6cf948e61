// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the ollama chat API.

use serde::{Deserialize, Serialize};

use aware_core::types::GenerationRequest;

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub options: ChatOptions,
    pub stream: bool,
}

/// One history entry in the wire shape ollama expects.
#[derive(Debug, Clone, Serialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

/// Sampling options forwarded from chat settings.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOptions {
    pub temperature: f64,
}

/// Error body shape ollama returns on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ChatRequest {
    /// Builds the wire request from a generation request.
    pub fn from_generation(request: &GenerationRequest) -> Self {
        Self {
            model: request.settings.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            options: ChatOptions {
                temperature: request.settings.temperature,
            },
            stream: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aware_core::types::{ChatSettings, EmbeddingsProvider, HistoryMessage, Role};

    fn settings() -> ChatSettings {
        ChatSettings {
            model: "llama3".into(),
            prompt: "You are helpful.".into(),
            temperature: 0.5,
            context_length: 4096,
            include_profile_context: false,
            include_workspace_instructions: false,
            embeddings_provider: EmbeddingsProvider::OpenAi,
        }
    }

    #[test]
    fn chat_request_serializes_expected_shape() {
        let request = GenerationRequest {
            settings: settings(),
            messages: vec![
                HistoryMessage {
                    role: Role::System,
                    content: "You are helpful.".into(),
                },
                HistoryMessage {
                    role: Role::User,
                    content: "Hello".into(),
                },
            ],
        };
        let wire = ChatRequest::from_generation(&request);
        let json = serde_json::to_value(&wire).unwrap();

        assert_eq!(json["model"], "llama3");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Hello");
        assert_eq!(json["options"]["temperature"], 0.5);
        assert_eq!(json["stream"], true);
    }
}
