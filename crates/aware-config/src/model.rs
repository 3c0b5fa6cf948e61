// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Aware conversation core.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Aware configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AwareConfig {
    /// Client identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Default per-conversation generation settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Local inference endpoint settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Hosted provider endpoint settings.
    #[serde(default)]
    pub hosted: HostedConfig,

    /// Push channel settings.
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Retrieval service settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Client identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the client.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "aware".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Default generation settings applied to new conversations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Default model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Context window length in tokens.
    #[serde(default = "default_context_length")]
    pub context_length: i64,

    /// Whether file retrieval runs when attachments are present.
    #[serde(default = "default_true")]
    pub use_retrieval: bool,

    /// Embeddings provider forwarded to retrieval ("openai" or "local").
    #[serde(default = "default_embeddings_provider")]
    pub embeddings_provider: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            context_length: default_context_length(),
            use_retrieval: true,
            embeddings_provider: default_embeddings_provider(),
        }
    }
}

fn default_model() -> String {
    "aware-1.0".to_string()
}

fn default_temperature() -> f64 {
    0.5
}

fn default_context_length() -> i64 {
    4096
}

fn default_true() -> bool {
    true
}

fn default_embeddings_provider() -> String {
    "openai".to_string()
}

/// Local inference endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Base URL of the local ollama server.
    #[serde(default = "default_ollama_url")]
    pub url: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: default_ollama_url(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Hosted provider endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HostedConfig {
    /// Base URL of the hosted chat API.
    #[serde(default = "default_hosted_base_url")]
    pub base_url: String,

    /// Route `openai` requests to the enterprise `azure` variant.
    #[serde(default)]
    pub use_azure_openai: bool,
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            base_url: default_hosted_base_url(),
            use_azure_openai: false,
        }
    }
}

fn default_hosted_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

/// Push channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    /// Enable the push channel.
    #[serde(default)]
    pub enabled: bool,

    /// WebSocket address of the push socket.
    #[serde(default = "default_channel_url")]
    pub url: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_channel_url(),
        }
    }
}

fn default_channel_url() -> String {
    "ws://localhost:50010".to_string()
}

/// Retrieval service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Base URL of the retrieval API.
    #[serde(default = "default_retrieval_url")]
    pub url: String,

    /// Maximum number of snippets requested per query.
    #[serde(default = "default_source_count")]
    pub source_count: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            url: default_retrieval_url(),
            source_count: default_source_count(),
        }
    }
}

fn default_retrieval_url() -> String {
    "http://localhost:3000/api/retrieval".to_string()
}

fn default_source_count() -> usize {
    4
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("aware/aware.db").to_string_lossy().into_owned())
        .unwrap_or_else(|| "aware.db".to_string())
}
