// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Aware conversation core.

use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::AwareError;

/// Unique identifier for a conversation process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessId(pub String);

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter behind the core trait seams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Backend,
    Store,
    Channel,
    Retrieval,
}

/// Message role within a process transcript.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

/// A persisted logical conversation/execution context.
///
/// Created once when a user starts a new conversation; immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub id: ProcessId,
    pub user_id: String,
    /// The owning agent's primary process id binding.
    pub agent_id: Option<String>,
    pub created_at: String,
}

/// A persisted entry in a process's ordered, append-only message log.
///
/// `content` is `None` while the message is still accumulating streamed
/// text; `on_buffer` is true during that window and false once finalized.
/// Soft-delete is expressed via `is_active` -- rows are never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub user_id: String,
    pub process_id: ProcessId,
    pub model: Option<String>,
    pub message_type: Option<String>,
    pub role: Role,
    pub name: Option<String>,
    pub content: Option<String>,
    pub sequence_number: i64,
    pub image_paths: Vec<String>,
    pub tool_calls: Option<serde_json::Value>,
    pub tool_call_id: Option<String>,
    pub is_active: bool,
    pub on_buffer: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Insert shape for a new message. The store assigns `sequence_number`
/// (one past the process's current maximum) and both timestamps; an absent
/// id is generated.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub id: Option<MessageId>,
    pub user_id: String,
    pub process_id: ProcessId,
    pub model: Option<String>,
    pub message_type: Option<String>,
    pub role: Role,
    pub name: Option<String>,
    pub content: Option<String>,
    pub image_paths: Vec<String>,
    pub tool_calls: Option<serde_json::Value>,
    pub tool_call_id: Option<String>,
    pub on_buffer: bool,
}

/// Partial update for a persisted message. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct MessagePatch {
    pub content: Option<String>,
    pub image_paths: Option<Vec<String>>,
    pub tool_calls: Option<serde_json::Value>,
    pub on_buffer: Option<bool>,
}

/// Client-visible pairing of a persisted message with the retrieval
/// file-item ids attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub message: Message,
    pub file_items: Vec<String>,
}

/// A ranked context snippet returned by the retrieval service. Opaque to
/// the core beyond its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileItem {
    pub id: String,
    pub file_id: String,
    pub content: String,
    #[serde(default)]
    pub tokens: i64,
}

/// Embeddings provider selector forwarded to the retrieval RPC.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmbeddingsProvider {
    OpenAi,
    Local,
}

/// Per-conversation generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSettings {
    pub model: String,
    pub prompt: String,
    pub temperature: f64,
    pub context_length: i64,
    pub include_profile_context: bool,
    pub include_workspace_instructions: bool,
    pub embeddings_provider: EmbeddingsProvider,
}

/// User profile fields the turn pipeline depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
    /// Routes hosted `openai` requests to the `azure` variant when set.
    pub use_azure_openai: bool,
    pub assistant_agent_id: Option<String>,
    /// Free-text context folded into the system prompt when settings opt in.
    #[serde(default)]
    pub profile_context: Option<String>,
}

/// Workspace context; only its presence is validated by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    /// Workspace-level instructions folded into the system prompt when
    /// settings opt in.
    #[serde(default)]
    pub instructions: Option<String>,
}

/// The fixed set of hosted provider endpoints.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HostedProvider {
    OpenAi,
    Azure,
    Google,
    Anthropic,
    Mistral,
    Perplexity,
    Aware,
}

/// Tagged selector over the supported generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local inference endpoint (ollama wire format).
    Local,
    /// Hosted provider endpoint.
    Hosted(HostedProvider),
}

/// Model descriptor resolved from settings before a turn starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub model_id: String,
    pub model_name: String,
    pub backend: BackendKind,
    pub hosted_id: Option<String>,
    pub supports_images: bool,
}

impl ModelDescriptor {
    /// The first-party hosted model.
    pub fn aware() -> Self {
        Self {
            model_id: "aware-1.0".into(),
            model_name: "Aware".into(),
            backend: BackendKind::Hosted(HostedProvider::Aware),
            hosted_id: Some("aware-1".into()),
            supports_images: false,
        }
    }
}

/// One pre-formatted entry of the message history sent to a backend.
/// Prompt assembly is an external collaborator; the core forwards these
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

/// A generation request handed to a backend.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub settings: ChatSettings,
    pub messages: Vec<HistoryMessage>,
}

/// How streamed chunks from a backend decode into incremental text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkCodec {
    /// Each chunk IS the incremental text (hosted endpoints).
    RawText,
    /// Each chunk is a JSON object whose `message.content` field is the
    /// incremental text (local ollama endpoint).
    JsonLines,
}

#[derive(Debug, Deserialize)]
struct JsonChunk {
    message: JsonChunkMessage,
}

#[derive(Debug, Deserialize)]
struct JsonChunkMessage {
    content: String,
}

impl ChunkCodec {
    /// Decodes one transport chunk into incremental text.
    ///
    /// A `JsonLines` chunk that fails to parse is an error the caller is
    /// expected to log and skip; it never aborts the stream.
    pub fn decode(&self, chunk: &str) -> Result<String, serde_json::Error> {
        match self {
            ChunkCodec::RawText => Ok(chunk.to_string()),
            ChunkCodec::JsonLines => {
                let parsed: JsonChunk = serde_json::from_str(chunk)?;
                Ok(parsed.message.content)
            }
        }
    }
}

/// A stream of raw transport chunks from a generation backend.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, AwareError>> + Send>>;

/// A live generation stream handle.
///
/// `body` is `None` when the transport never provided a body; the
/// reconciliation step surfaces that as a stream error.
pub struct GenerationStream {
    pub codec: ChunkCodec,
    pub body: Option<ByteStream>,
}

impl std::fmt::Debug for GenerationStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationStream")
            .field("codec", &self.codec)
            .field("body", &self.body.as_ref().map(|_| "<stream>"))
            .finish()
    }
}

/// Tool indicator bound to an in-flight turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolInUse {
    #[default]
    None,
    Retrieval,
}

/// Callback contract shared by every push source (WebSocket channel or a
/// realtime change-feed collaborator). Receives the pushed content string.
pub type PushCallback = std::sync::Arc<dyn Fn(String) + Send + Sync>;
