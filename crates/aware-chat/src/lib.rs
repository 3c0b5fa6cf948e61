// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestrator.
//!
//! Drives one user turn end to end: prerequisite validation, process
//! creation, attachment upload, optimistic message appends, generation
//! dispatch against a local or hosted backend, chunk-by-chunk stream
//! reconciliation, retrieval merge, and finalization. Turn progress is
//! published as [`events::TurnEvent`]s; the engine owns no UI state.

pub mod attachments;
pub mod consume;
pub mod context;
pub mod engine;
pub mod events;
pub mod prompt;
pub mod retrieval;

pub use attachments::FsAttachmentStore;
pub use context::ChatContext;
pub use engine::{Attachment, StartedTurn, TurnEngine, TurnRequest};
pub use events::{TurnEvent, TurnEvents};
pub use retrieval::HttpRetriever;
