// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Aware conversation-synchronization engine.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Aware workspace. Generation backends,
//! the message store, the push channel, and the retrieval client all
//! implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{AwareError, Prerequisite};
pub use types::{AdapterType, HealthStatus, MessageId, ProcessId, Role};

// Re-export all adapter traits at crate root.
pub use traits::retrieval::RetrievalQuery;
pub use traits::{
    Adapter, AttachmentStore, GenerationBackend, MessageStore, PushChannel, Retriever,
};
