// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment upload seam for image attachments on user messages.

use async_trait::async_trait;

use crate::error::AwareError;

/// Stores message image attachments and returns their storage paths.
///
/// A failed upload is logged by the caller and that attachment's path
/// dropped from the message; it never fails the turn.
#[async_trait]
pub trait AttachmentStore: Send + Sync + 'static {
    /// Uploads one attachment under the given path, returning the resulting
    /// storage path for `image_paths`.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, AwareError>;
}
