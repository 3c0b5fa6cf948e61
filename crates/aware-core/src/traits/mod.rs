// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Aware conversation core.
//!
//! All adapters extend the [`Adapter`] base trait and use `#[async_trait]`
//! for dynamic dispatch compatibility.

pub mod adapter;
pub mod attachment;
pub mod backend;
pub mod channel;
pub mod retrieval;
pub mod store;

// Re-export all traits at the traits module level for convenience.
pub use adapter::Adapter;
pub use attachment::AttachmentStore;
pub use backend::GenerationBackend;
pub use channel::PushChannel;
pub use retrieval::Retriever;
pub use store::MessageStore;
