// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Aware conversation core.

use thiserror::Error;

use crate::types::{MessageId, ProcessId};

/// Prerequisite state checked before a turn may start.
///
/// Validation runs in this fixed order; the error names the first
/// prerequisite that was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
    Settings,
    Model,
    Profile,
    Workspace,
    MessageContent,
}

impl std::fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prerequisite::Settings => write!(f, "chat settings"),
            Prerequisite::Model => write!(f, "model"),
            Prerequisite::Profile => write!(f, "profile"),
            Prerequisite::Workspace => write!(f, "workspace"),
            Prerequisite::MessageContent => write!(f, "message content"),
        }
    }
}

/// The primary error type used across all Aware adapter traits and core operations.
#[derive(Debug, Error)]
pub enum AwareError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// A turn prerequisite was missing; surfaced before any network call.
    #[error("{0} not found")]
    Validation(Prerequisite),

    /// A second turn was started on a process whose previous turn is still in flight.
    #[error("generation already in flight for process {0}")]
    GenerationInFlight(ProcessId),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Sequence-number collision on append. The caller must retry with a
    /// freshly read position; the store never retries on its own.
    #[error("sequence number {sequence_number} already claimed in process {process_id}")]
    Conflict {
        process_id: ProcessId,
        sequence_number: i64,
    },

    /// Update targeted a message id the store does not know.
    #[error("message not found: {0}")]
    NotFound(MessageId),

    /// Non-2xx response from a generation endpoint. The message is the
    /// server-supplied error body.
    #[error("generation request failed ({status}): {message}")]
    Transport { status: u16, message: String },

    /// 404 from the local backend: the model is not downloaded.
    #[error("model {0} not available locally")]
    ModelNotAvailable(String),

    /// Null/absent response body or a transport-level read failure mid-stream.
    #[error("stream error: {0}")]
    Stream(String),

    /// Push channel errors (connection failure, frame format, send on closed).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generation backend errors other than HTTP status failures.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
