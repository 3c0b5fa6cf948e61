// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cooperative byte-stream consumption.
//!
//! Reads a generation body in transport order, decodes UTF-8 incrementally,
//! and hands each chunk's text to a synchronous callback. Chunk boundaries
//! from the transport are preserved as callback boundaries; nothing is
//! buffered or coalesced across chunks.

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use aware_core::types::ByteStream;
use aware_core::AwareError;

/// Drains `body`, invoking `on_chunk` once per delivered chunk.
///
/// The cancel signal is observed between chunks: once set, reading stops
/// and no further callbacks fire. No final chunk is synthesized. Transport
/// read errors are fatal and propagate as [`AwareError::Stream`].
///
/// A chunk ending inside a multi-byte UTF-8 sequence carries the partial
/// bytes over into the next chunk's text.
pub async fn consume<F>(
    mut body: ByteStream,
    cancel: &CancellationToken,
    mut on_chunk: F,
) -> Result<(), AwareError>
where
    F: FnMut(&str),
{
    let mut carry: Vec<u8> = Vec::new();

    while let Some(chunk) = body.next().await {
        if cancel.is_cancelled() {
            return Ok(());
        }
        let bytes = chunk?;

        carry.extend_from_slice(&bytes);
        let valid_up_to = match std::str::from_utf8(&carry) {
            Ok(_) => carry.len(),
            Err(e) => e.valid_up_to(),
        };
        if valid_up_to == 0 {
            continue;
        }

        let rest = carry.split_off(valid_up_to);
        let text = String::from_utf8(std::mem::replace(&mut carry, rest))
            .map_err(|e| AwareError::Stream(e.to_string()))?;
        on_chunk(&text);
    }

    if !carry.is_empty() {
        return Err(AwareError::Stream(
            "stream ended inside a UTF-8 sequence".into(),
        ));
    }
    Ok(())
}
