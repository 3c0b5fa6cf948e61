// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as value ranges and non-empty paths.

use crate::error::ConfigError;
use crate::model::AwareConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &AwareConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.chat.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "chat.model must not be empty".to_string(),
        });
    }

    if !(0.0..=2.0).contains(&config.chat.temperature) {
        errors.push(ConfigError::Validation {
            message: format!(
                "chat.temperature must be within 0.0..=2.0, got {}",
                config.chat.temperature
            ),
        });
    }

    if config.chat.context_length <= 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "chat.context_length must be positive, got {}",
                config.chat.context_length
            ),
        });
    }

    if !matches!(config.chat.embeddings_provider.as_str(), "openai" | "local") {
        errors.push(ConfigError::Validation {
            message: format!(
                "chat.embeddings_provider must be `openai` or `local`, got `{}`",
                config.chat.embeddings_provider
            ),
        });
    }

    if config.retrieval.source_count == 0 {
        errors.push(ConfigError::Validation {
            message: "retrieval.source_count must be at least 1".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.channel.enabled && !config.channel.url.starts_with("ws") {
        errors.push(ConfigError::Validation {
            message: format!(
                "channel.url must be a ws:// or wss:// address, got `{}`",
                config.channel.url
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
