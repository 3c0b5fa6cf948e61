// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./aware.toml` > `~/.config/aware/aware.toml`
//! with environment variable overrides via the `AWARE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::AwareConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `~/.config/aware/aware.toml` (user XDG config)
/// 3. `./aware.toml` (local directory)
/// 4. `AWARE_*` environment variables
pub fn load_config() -> Result<AwareConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AwareConfig::default()))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("aware/aware.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("aware.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<AwareConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AwareConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AwareConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AwareConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `AWARE_STORAGE_DATABASE_PATH` must map
/// to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("AWARE_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("chat_", "chat.", 1)
            .replacen("ollama_", "ollama.", 1)
            .replacen("hosted_", "hosted.", 1)
            .replacen("channel_", "channel.", 1)
            .replacen("retrieval_", "retrieval.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
