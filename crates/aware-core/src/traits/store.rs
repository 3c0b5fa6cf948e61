// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message store trait: the ordered, append-only log of messages per process.

use async_trait::async_trait;

use crate::error::AwareError;
use crate::traits::adapter::Adapter;
use crate::types::{Message, MessageId, MessagePatch, NewMessage, Process, ProcessId};

/// Persistence seam for processes and their ordered message logs.
///
/// Ordering contract: within one process, active messages carry strictly
/// increasing, unique sequence numbers. The store assigns positions itself;
/// callers never supply one.
#[async_trait]
pub trait MessageStore: Adapter {
    /// Creates a new process record.
    async fn create_process(&self, process: &Process) -> Result<(), AwareError>;

    /// Fetches a process by id.
    async fn get_process(&self, id: &ProcessId) -> Result<Option<Process>, AwareError>;

    /// Appends a message, assigning it one past the process's current
    /// maximum sequence number. Returns `Conflict` if a concurrent append
    /// claimed that position first; the caller must retry after re-reading.
    async fn append(&self, message: NewMessage) -> Result<Message, AwareError>;

    /// Partially updates a message. Returns `NotFound` for an unknown id.
    async fn update(&self, id: &MessageId, patch: MessagePatch) -> Result<Message, AwareError>;

    /// Soft-deletes every message of the process with
    /// `sequence_number >= sequence_number`. Idempotent.
    async fn truncate_from(
        &self,
        process_id: &ProcessId,
        sequence_number: i64,
    ) -> Result<(), AwareError>;

    /// The active messages of a process ordered by sequence number.
    async fn active_transcript(&self, process_id: &ProcessId)
        -> Result<Vec<Message>, AwareError>;
}
