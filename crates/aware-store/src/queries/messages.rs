// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message log operations.
//!
//! A process's log is append-only: rows are soft-deleted via `is_active`
//! and positions are never reused. `(process_id, sequence_number)` carries
//! a unique index; a violated insert surfaces as [`AwareError::Conflict`]
//! so the caller can re-read the log and retry.

use rusqlite::params;

use aware_core::types::{Message, MessageId, MessagePatch, NewMessage, ProcessId, Role};
use aware_core::AwareError;

use crate::database::Database;

const MESSAGE_COLUMNS: &str = "id, user_id, process_id, model, message_type, role, name, content,
     sequence_number, image_paths, tool_calls, tool_call_id, is_active, on_buffer,
     created_at, updated_at";

/// UTC timestamp in the millisecond RFC 3339 shape stored in every row.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let role: String = row.get(5)?;
    let role = role.parse::<Role>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let image_paths: String = row.get(9)?;
    let image_paths: Vec<String> = serde_json::from_str(&image_paths).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let tool_calls: Option<String> = row.get(10)?;
    let tool_calls = match tool_calls {
        Some(raw) => Some(serde_json::from_str(&raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                10,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?),
        None => None,
    };

    Ok(Message {
        id: MessageId(row.get(0)?),
        user_id: row.get(1)?,
        process_id: ProcessId(row.get(2)?),
        model: row.get(3)?,
        message_type: row.get(4)?,
        role,
        name: row.get(6)?,
        content: row.get(7)?,
        sequence_number: row.get(8)?,
        image_paths,
        tool_calls,
        tool_call_id: row.get(11)?,
        is_active: row.get(12)?,
        on_buffer: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ffi::ErrorCode::ConstraintViolation,
                ..
            },
            _,
        )
    )
}

/// The highest sequence number ever assigned in the process, or -1 for an
/// empty log. Soft-deleted rows count: positions are never reused.
pub async fn current_max_sequence(db: &Database, process_id: &ProcessId) -> Result<i64, AwareError> {
    let process_id = process_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            let max: i64 = conn.query_row(
                "SELECT COALESCE(MAX(sequence_number), -1) FROM messages WHERE process_id = ?1",
                params![process_id],
                |row| row.get(0),
            )?;
            Ok(max)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a message at an explicit position.
///
/// A unique-index violation on `(process_id, sequence_number)` maps to
/// [`AwareError::Conflict`]; any other failure maps to `Storage`.
pub async fn insert_at(
    db: &Database,
    message: NewMessage,
    sequence_number: i64,
) -> Result<Message, AwareError> {
    let now = now_timestamp();
    let id = message
        .id
        .clone()
        .unwrap_or_else(|| MessageId(uuid::Uuid::new_v4().to_string()));
    let stored = Message {
        id,
        user_id: message.user_id,
        process_id: message.process_id,
        model: message.model,
        message_type: message.message_type,
        role: message.role,
        name: message.name,
        content: message.content,
        sequence_number,
        image_paths: message.image_paths,
        tool_calls: message.tool_calls,
        tool_call_id: message.tool_call_id,
        is_active: true,
        on_buffer: message.on_buffer,
        created_at: now.clone(),
        updated_at: now,
    };

    let row = stored.clone();
    let image_paths = serde_json::to_string(&row.image_paths).map_err(|e| AwareError::Storage {
        source: Box::new(e),
    })?;
    let tool_calls = match &row.tool_calls {
        Some(v) => Some(serde_json::to_string(v).map_err(|e| AwareError::Storage {
            source: Box::new(e),
        })?),
        None => None,
    };

    let result = db
        .connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO messages (id, user_id, process_id, model, message_type, role, name,
                     content, sequence_number, image_paths, tool_calls, tool_call_id, is_active,
                     on_buffer, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    row.id.0,
                    row.user_id,
                    row.process_id.0,
                    row.model,
                    row.message_type,
                    row.role.to_string(),
                    row.name,
                    row.content,
                    row.sequence_number,
                    image_paths,
                    tool_calls,
                    row.tool_call_id,
                    row.is_active,
                    row.on_buffer,
                    row.created_at,
                    row.updated_at,
                ],
            )?;
            Ok(())
        })
        .await;

    match result {
        Ok(()) => Ok(stored),
        Err(tokio_rusqlite::Error::Error(e)) if is_unique_violation(&e) => {
            Err(AwareError::Conflict {
                process_id: stored.process_id,
                sequence_number,
            })
        }
        Err(e) => Err(crate::database::map_tr_err(e)),
    }
}

/// Append a message one past the process's current maximum position.
pub async fn append(db: &Database, message: NewMessage) -> Result<Message, AwareError> {
    let next = current_max_sequence(db, &message.process_id).await? + 1;
    insert_at(db, message, next).await
}

/// Get a message by ID.
pub async fn get_message(db: &Database, id: &MessageId) -> Result<Option<Message>, AwareError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<Message>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_message);
            match result {
                Ok(message) => Ok(Some(message)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Partially update a message. `None` patch fields are left untouched;
/// `updated_at` always advances. Returns `None` for an unknown id.
pub async fn update_message(
    db: &Database,
    id: &MessageId,
    patch: MessagePatch,
) -> Result<Option<Message>, AwareError> {
    let image_paths = match &patch.image_paths {
        Some(paths) => Some(serde_json::to_string(paths).map_err(|e| AwareError::Storage {
            source: Box::new(e),
        })?),
        None => None,
    };
    let tool_calls = match &patch.tool_calls {
        Some(v) => Some(serde_json::to_string(v).map_err(|e| AwareError::Storage {
            source: Box::new(e),
        })?),
        None => None,
    };
    let id = id.0.clone();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| -> Result<Option<Message>, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE messages SET
                     content = COALESCE(?2, content),
                     image_paths = COALESCE(?3, image_paths),
                     tool_calls = COALESCE(?4, tool_calls),
                     on_buffer = COALESCE(?5, on_buffer),
                     updated_at = ?6
                 WHERE id = ?1",
                params![id, patch.content, image_paths, tool_calls, patch.on_buffer, now],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"
            ))?;
            let message = stmt.query_row(params![id], row_to_message)?;
            Ok(Some(message))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Soft-delete every message of the process at or past the given position.
/// Already-inactive rows are untouched, so repeat calls are no-ops.
pub async fn truncate_from(
    db: &Database,
    process_id: &ProcessId,
    sequence_number: i64,
) -> Result<(), AwareError> {
    let process_id = process_id.0.clone();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE messages SET is_active = 0, updated_at = ?3
                 WHERE process_id = ?1 AND sequence_number >= ?2 AND is_active = 1",
                params![process_id, sequence_number, now],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The active messages of a process, ordered by sequence number.
pub async fn active_transcript(
    db: &Database,
    process_id: &ProcessId,
) -> Result<Vec<Message>, AwareError> {
    let process_id = process_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Vec<Message>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE process_id = ?1 AND is_active = 1
                 ORDER BY sequence_number ASC"
            ))?;
            let rows = stmt.query_map(params![process_id], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
