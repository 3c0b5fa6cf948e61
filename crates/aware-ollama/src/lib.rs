// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local ollama generation backend.
//!
//! Talks to a local ollama server over its `/api/chat` endpoint and exposes
//! the newline-delimited JSON response as a [`aware_core::GenerationStream`]
//! with the [`aware_core::ChunkCodec::JsonLines`] codec.

pub mod backend;
pub mod client;
pub mod types;

pub use backend::OllamaBackend;
pub use client::OllamaClient;
