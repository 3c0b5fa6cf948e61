// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process CRUD operations.

use rusqlite::params;

use aware_core::types::{Process, ProcessId};
use aware_core::AwareError;

use crate::database::Database;

/// Create a new process record.
pub async fn create_process(db: &Database, process: &Process) -> Result<(), AwareError> {
    let process = process.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO processes (id, user_id, agent_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    process.id.0,
                    process.user_id,
                    process.agent_id,
                    process.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a process by ID.
pub async fn get_process(db: &Database, id: &ProcessId) -> Result<Option<Process>, AwareError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<Process>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, agent_id, created_at FROM processes WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], |row| {
                Ok(Process {
                    id: ProcessId(row.get(0)?),
                    user_id: row.get(1)?,
                    agent_id: row.get(2)?,
                    created_at: row.get(3)?,
                })
            });
            match result {
                Ok(process) => Ok(Some(process)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
