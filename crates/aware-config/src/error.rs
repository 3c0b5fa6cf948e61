// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error types and terminal rendering.

use thiserror::Error;

/// A configuration problem discovered at load or validation time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML/env layer failed to deserialize.
    #[error("config parse error: {0}")]
    Parse(#[from] figment::Error),

    /// A semantic constraint was violated after deserialization.
    #[error("{message}")]
    Validation { message: String },
}

/// Render collected configuration errors to stderr, one per line.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        eprintln!("aware: config error: {error}");
    }
}
