// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval adapter trait: black-box RPC returning ranked context snippets.

use async_trait::async_trait;

use crate::error::AwareError;
use crate::traits::adapter::Adapter;
use crate::types::{EmbeddingsProvider, FileItem};

/// Query forwarded to the retrieval service.
#[derive(Debug, Clone)]
pub struct RetrievalQuery {
    pub user_input: String,
    /// Newly attached file ids followed by previously attached ones.
    pub file_ids: Vec<String>,
    pub embeddings_provider: EmbeddingsProvider,
    pub source_count: usize,
}

/// External ranking service returning content snippets relevant to a query
/// and a set of file ids. Consumed, not implemented, by the core.
#[async_trait]
pub trait Retriever: Adapter {
    /// Returns ranked file items for the query. Implementations surface
    /// transport failures as errors; the turn pipeline substitutes an empty
    /// result set and continues.
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<FileItem>, AwareError>;
}
