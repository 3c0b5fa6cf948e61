// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the MessageStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use aware_config::model::StorageConfig;
use aware_core::types::{Message, MessageId, MessagePatch, NewMessage, Process, ProcessId};
use aware_core::{Adapter, AdapterType, AwareError, HealthStatus, MessageStore};

use crate::database::Database;
use crate::queries;

/// SQLite-backed message store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`SqliteStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: SqliteStore::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database at the configured path and run migrations.
    pub async fn initialize(&self) -> Result<(), AwareError> {
        let db = Database::open(&self.config.database_path).await?;
        self.db.set(db).map_err(|_| AwareError::Storage {
            source: "store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, AwareError> {
        self.db.get().ok_or_else(|| AwareError::Storage {
            source: "store not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl Adapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, AwareError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AwareError> {
        // Shutdown checkpoints the WAL if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.connection()
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                    Ok(())
                })
                .await
                .map_err(crate::database::map_tr_err)?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn create_process(&self, process: &Process) -> Result<(), AwareError> {
        queries::processes::create_process(self.db()?, process).await
    }

    async fn get_process(&self, id: &ProcessId) -> Result<Option<Process>, AwareError> {
        queries::processes::get_process(self.db()?, id).await
    }

    async fn append(&self, message: NewMessage) -> Result<Message, AwareError> {
        queries::messages::append(self.db()?, message).await
    }

    async fn update(&self, id: &MessageId, patch: MessagePatch) -> Result<Message, AwareError> {
        queries::messages::update_message(self.db()?, id, patch)
            .await?
            .ok_or_else(|| AwareError::NotFound(id.clone()))
    }

    async fn truncate_from(
        &self,
        process_id: &ProcessId,
        sequence_number: i64,
    ) -> Result<(), AwareError> {
        queries::messages::truncate_from(self.db()?, process_id, sequence_number).await
    }

    async fn active_transcript(
        &self,
        process_id: &ProcessId,
    ) -> Result<Vec<Message>, AwareError> {
        queries::messages::active_transcript(self.db()?, process_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aware_core::types::Role;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    async fn store_with_process(path: &std::path::Path) -> SqliteStore {
        let store = SqliteStore::new(make_config(path.to_str().unwrap()));
        store.initialize().await.unwrap();
        store
            .create_process(&Process {
                id: ProcessId("proc-1".to_string()),
                user_id: "user-1".to_string(),
                agent_id: None,
                created_at: "2026-01-01T00:00:00.000Z".to_string(),
            })
            .await
            .unwrap();
        store
    }

    fn make_new(role: Role, content: &str) -> NewMessage {
        NewMessage {
            id: None,
            user_id: "user-1".to_string(),
            process_id: ProcessId("proc-1".to_string()),
            model: None,
            message_type: None,
            role,
            name: None,
            content: Some(content.to_string()),
            image_paths: Vec::new(),
            tool_calls: None,
            tool_call_id: None,
            on_buffer: false,
        }
    }

    #[tokio::test]
    async fn sqlite_store_implements_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("adapter.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.version(), semver::Version::new(0, 1, 0));
        assert_eq!(store.adapter_type(), AdapterType::Store);
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        let result = store.initialize().await;
        assert!(result.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn health_check_fails_when_not_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        let result = store.health_check().await;
        assert!(result.is_err(), "health_check should fail before initialize");
    }

    #[tokio::test]
    async fn health_check_returns_healthy_when_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        let status = store.health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn full_message_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let store = store_with_process(&dir.path().join("lifecycle.db")).await;
        let process_id = ProcessId("proc-1".to_string());

        let user = store.append(make_new(Role::User, "hello")).await.unwrap();
        assert_eq!(user.sequence_number, 0);

        let mut placeholder = make_new(Role::Assistant, "");
        placeholder.content = None;
        placeholder.on_buffer = true;
        let assistant = store.append(placeholder).await.unwrap();
        assert_eq!(assistant.sequence_number, 1);
        assert!(assistant.on_buffer);

        let finalized = store
            .update(
                &assistant.id,
                MessagePatch {
                    content: Some("hi there".to_string()),
                    on_buffer: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(finalized.content.as_deref(), Some("hi there"));
        assert!(!finalized.on_buffer);

        let transcript = store.active_transcript(&process_id).await.unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[1].role, Role::Assistant);

        store.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn update_unknown_message_returns_not_found() {
        let dir = tempdir().unwrap();
        let store = store_with_process(&dir.path().join("notfound.db")).await;

        let err = store
            .update(&MessageId("ghost".to_string()), MessagePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AwareError::NotFound(_)));
    }

    #[tokio::test]
    async fn truncate_from_through_adapter_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = store_with_process(&dir.path().join("truncate.db")).await;
        let process_id = ProcessId("proc-1".to_string());

        for i in 0..4 {
            store
                .append(make_new(Role::User, &format!("msg {i}")))
                .await
                .unwrap();
        }

        store.truncate_from(&process_id, 2).await.unwrap();
        store.truncate_from(&process_id, 2).await.unwrap();

        let transcript = store.active_transcript(&process_id).await.unwrap();
        assert_eq!(transcript.len(), 2);
    }
}
