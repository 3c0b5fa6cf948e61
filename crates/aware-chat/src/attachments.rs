// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem-backed attachment store.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use aware_core::{AttachmentStore, AwareError};

/// Stores message image attachments under a local root directory.
pub struct FsAttachmentStore {
    root: PathBuf,
}

impl FsAttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AttachmentStore for FsAttachmentStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, AwareError> {
        // Reject traversal outside the root.
        let relative = std::path::Path::new(path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(AwareError::Internal(format!(
                "invalid attachment path: {path}"
            )));
        }

        let target = self.root.join(relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AwareError::Internal(format!("attachment dir: {e}")))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| AwareError::Internal(format!("attachment write: {e}")))?;

        debug!(path = %target.display(), "attachment stored");
        Ok(target.to_string_lossy().into_owned())
    }
}
