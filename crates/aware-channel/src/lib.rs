// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket push channel.
//!
//! Client -> Server (JSON):
//! ```json
//! {"message": "payload"}
//! ```
//!
//! Server -> Client (JSON):
//! ```json
//! {"message": "backend generated content"}
//! ```
//!
//! One connection, one handler, no reconnect. A dropped connection stays
//! closed until the channel is rebuilt by the composition root.

pub mod ws;

pub use ws::WebSocketChannel;
