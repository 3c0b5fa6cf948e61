// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation backend trait for streaming inference endpoints.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::AwareError;
use crate::traits::adapter::Adapter;
use crate::types::{ChunkCodec, GenerationRequest, GenerationStream};

/// A generation backend: one of the local inference endpoint or a hosted
/// provider endpoint.
///
/// Each backend owns exactly two capabilities: declaring how its chunks
/// decode, and issuing a streaming request bound to a cancellation token.
#[async_trait]
pub trait GenerationBackend: Adapter {
    /// How chunks from this backend decode into incremental text.
    fn codec(&self) -> ChunkCodec;

    /// Issues a streaming generation request.
    ///
    /// Cancelling the token aborts the in-flight HTTP request. A non-2xx
    /// status returns `Transport` with the server-supplied error message;
    /// a 404 from the local backend returns `ModelNotAvailable`.
    async fn stream(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<GenerationStream, AwareError>;
}
