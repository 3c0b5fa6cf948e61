// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the hosted chat API. The API expects camelCase keys.

use serde::{Deserialize, Serialize};

use aware_core::types::{ChatSettings, GenerationRequest};

/// Request body for `POST /chat/{provider}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub chat_settings: WireChatSettings,
    pub messages: Vec<WireMessage>,
}

/// Chat settings in the camelCase wire shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireChatSettings {
    pub model: String,
    pub prompt: String,
    pub temperature: f64,
    pub context_length: i64,
    pub include_profile_context: bool,
    pub include_workspace_instructions: bool,
    pub embeddings_provider: String,
}

/// One history entry.
#[derive(Debug, Clone, Serialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

/// Error body shape the hosted API returns on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl WireChatSettings {
    fn from_settings(settings: &ChatSettings) -> Self {
        Self {
            model: settings.model.clone(),
            prompt: settings.prompt.clone(),
            temperature: settings.temperature,
            context_length: settings.context_length,
            include_profile_context: settings.include_profile_context,
            include_workspace_instructions: settings.include_workspace_instructions,
            embeddings_provider: settings.embeddings_provider.to_string(),
        }
    }
}

impl ChatRequest {
    /// Builds the wire request from a generation request.
    pub fn from_generation(request: &GenerationRequest) -> Self {
        Self {
            chat_settings: WireChatSettings::from_settings(&request.settings),
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aware_core::types::{EmbeddingsProvider, HistoryMessage, Role};

    #[test]
    fn chat_request_uses_camel_case_keys() {
        let request = GenerationRequest {
            settings: ChatSettings {
                model: "gpt-4".into(),
                prompt: "You are helpful.".into(),
                temperature: 0.7,
                context_length: 4096,
                include_profile_context: true,
                include_workspace_instructions: false,
                embeddings_provider: EmbeddingsProvider::OpenAi,
            },
            messages: vec![HistoryMessage {
                role: Role::User,
                content: "Hello".into(),
            }],
        };
        let json = serde_json::to_value(ChatRequest::from_generation(&request)).unwrap();

        assert_eq!(json["chatSettings"]["model"], "gpt-4");
        assert_eq!(json["chatSettings"]["contextLength"], 4096);
        assert_eq!(json["chatSettings"]["includeProfileContext"], true);
        assert_eq!(json["chatSettings"]["embeddingsProvider"], "openai");
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
