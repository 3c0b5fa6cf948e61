// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push channel trait for out-of-band server-to-client delivery.

use async_trait::async_trait;

use crate::error::AwareError;
use crate::traits::adapter::Adapter;
use crate::types::PushCallback;

/// A duplex notification primitive delivering asynchronous backend-generated
/// content independent of the HTTP streaming path.
///
/// One handler is active at a time; a frame arriving with no handler
/// installed is dropped (logged). There is no built-in reconnect policy --
/// callers needing resilience wrap the channel with their own supervision.
#[async_trait]
pub trait PushChannel: Adapter {
    /// Atomically replaces the current push handler.
    fn set_callback(&self, callback: PushCallback);

    /// Sends a payload over the channel. A send on a non-open channel is a
    /// no-op with a logged error; the payload is never queued or retried.
    async fn send(&self, payload: &str);

    /// Whether the underlying connection is currently open.
    fn is_open(&self) -> bool;

    /// Closes the connection.
    async fn close(&self) -> Result<(), AwareError>;
}
