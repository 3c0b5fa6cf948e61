// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hosted provider generation backend.
//!
//! Talks to the hosted chat API over `POST {base}/chat/{provider}` and
//! exposes the plain-text response stream as a
//! [`aware_core::GenerationStream`] with the
//! [`aware_core::ChunkCodec::RawText`] codec.

pub mod backend;
pub mod client;
pub mod types;

pub use backend::{resolve_provider, HostedBackend};
pub use client::HostedClient;
