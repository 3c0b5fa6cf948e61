// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Aware integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockBackend`] - Mock generation backend with scripted chunk streams
//! - [`MockRetriever`] - Mock retrieval service with canned file items
//! - [`TestHarness`] - Full turn-engine stack over a temp SQLite database

pub mod harness;
pub mod mock_backend;
pub mod mock_retriever;

pub use harness::TestHarness;
pub use mock_backend::MockBackend;
pub use mock_retriever::MockRetriever;
