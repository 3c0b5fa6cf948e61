// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Aware conversation core.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides.
//!
//! # Usage
//!
//! ```no_run
//! use aware_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("model: {}", config.chat.model);
//! ```

pub mod error;
pub mod loader;
pub mod model;
pub mod validation;

pub use error::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::AwareConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid `AwareConfig` or the list of collected errors.
pub fn load_and_validate() -> Result<AwareConfig, Vec<ConfigError>> {
    let config = loader::load_config().map_err(|e| vec![ConfigError::Parse(e)])?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<AwareConfig, Vec<ConfigError>> {
    let config =
        loader::load_config_from_str(toml_content).map_err(|e| vec![ConfigError::Parse(e)])?;
    validation::validate_config(&config)?;
    Ok(config)
}
