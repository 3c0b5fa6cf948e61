// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete turn-engine stack with mock
//! adapters and a temp SQLite database. Provides `send_message()` to
//! drive the full turn pipeline in tests.

use std::sync::Arc;

use aware_chat::{ChatContext, FsAttachmentStore, TurnEngine, TurnEvents, TurnRequest};
use aware_config::model::StorageConfig;
use aware_core::types::{
    ChatMessage, ChatSettings, EmbeddingsProvider, FileItem, ModelDescriptor, Process, ProcessId,
    Profile, Workspace,
};
use aware_core::AwareError;
use aware_core::MessageStore;
use aware_store::SqliteStore;

use crate::mock_backend::MockBackend;
use crate::mock_retriever::MockRetriever;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<Vec<String>>,
    retrieval_items: Vec<FileItem>,
    system_prompt: Option<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            retrieval_items: Vec::new(),
            system_prompt: None,
        }
    }

    /// Set mock backend responses, one chunk list per turn.
    pub fn with_mock_responses(mut self, responses: Vec<Vec<String>>) -> Self {
        self.responses = responses;
        self
    }

    /// Set the file items the mock retriever returns.
    pub fn with_retrieval_items(mut self, items: Vec<FileItem>) -> Self {
        self.retrieval_items = items;
        self
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = Some(prompt);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, AwareError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| AwareError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let store = SqliteStore::new(StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        });
        store.initialize().await?;
        let store = Arc::new(store);

        let backend = Arc::new(if self.responses.is_empty() {
            MockBackend::new()
        } else {
            MockBackend::with_responses(self.responses)
        });

        let retriever = Arc::new(MockRetriever::with_items(self.retrieval_items));
        let attachments = Arc::new(FsAttachmentStore::new(temp_dir.path().join("files")));

        let model = ModelDescriptor::aware();
        let ctx = ChatContext {
            settings: Some(ChatSettings {
                model: model.model_id.clone(),
                prompt: self
                    .system_prompt
                    .unwrap_or_else(|| "You are a test assistant.".to_string()),
                temperature: 0.5,
                context_length: 4096,
                include_profile_context: false,
                include_workspace_instructions: false,
                embeddings_provider: EmbeddingsProvider::OpenAi,
            }),
            model: Some(model.clone()),
            profile: Some(Profile {
                user_id: "test-user".into(),
                display_name: "Test User".into(),
                use_azure_openai: false,
                assistant_agent_id: None,
                profile_context: None,
            }),
            workspace: Some(Workspace {
                id: "test-workspace".into(),
                name: "Test Workspace".into(),
                instructions: None,
            }),
        };

        let engine = Arc::new(
            TurnEngine::new(store.clone(), attachments, TurnEvents::default())
                .with_backend(model.backend, backend.clone())
                .with_retriever(retriever.clone(), 4),
        );

        Ok(TestHarness {
            engine,
            store,
            backend,
            retriever,
            ctx,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock adapters and temp storage.
pub struct TestHarness {
    /// The turn engine under test.
    pub engine: Arc<TurnEngine>,
    /// SQLite message store (temp DB, cleaned up on drop).
    pub store: Arc<SqliteStore>,
    /// The mock generation backend.
    pub backend: Arc<MockBackend>,
    /// The mock retrieval service.
    pub retriever: Arc<MockRetriever>,
    /// Validated conversation context used for every turn.
    pub ctx: ChatContext,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Drive one full turn in a fresh process and return the finalized
    /// assistant message.
    pub async fn send_message(&self, text: &str) -> Result<ChatMessage, AwareError> {
        self.engine
            .send_message(
                &self.ctx,
                TurnRequest {
                    process_id: None,
                    user_text: text.to_string(),
                    attachments: Vec::new(),
                    file_ids: Vec::new(),
                },
            )
            .await
    }

    /// Drive one full turn addressed to a specific process.
    pub async fn send_to_process(
        &self,
        process_id: &ProcessId,
        text: &str,
        file_ids: Vec<String>,
    ) -> Result<ChatMessage, AwareError> {
        self.engine
            .send_message(
                &self.ctx,
                TurnRequest {
                    process_id: Some(process_id.clone()),
                    user_text: text.to_string(),
                    attachments: Vec::new(),
                    file_ids,
                },
            )
            .await
    }

    /// The process record for an id, panicking if it does not exist.
    pub async fn process(&self, id: &ProcessId) -> Process {
        match self.store.get_process(id).await {
            Ok(Some(process)) => process,
            Ok(None) => panic!("process {id} not found"),
            Err(e) => panic!("get_process failed: {e}"),
        }
    }
}
