// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only summary rows.

use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{Connection, params};

use empath_core::types::{CONVERSATION_TIME_FORMAT, SummaryRecord};

/// Loads a user's summaries, oldest first.
pub fn load_summaries(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<SummaryRecord>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT conversation_time, summary FROM summaries
         WHERE user_id = ?1 ORDER BY seq ASC",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        let time: String = row.get(0)?;
        let time = NaiveDateTime::parse_from_str(&time, CONVERSATION_TIME_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
        Ok(SummaryRecord {
            conversation_time: time.and_utc(),
            summary: row.get(1)?,
        })
    })?;
    rows.collect()
}

/// Inserts the records not yet stored for `user_id`.
///
/// A record's position in `records` is its sequence number. Only positions
/// past the stored row count are written, so a save costs one insert per new
/// summary however long the history grows. Returns how many rows were added.
pub fn append_new(
    conn: &Connection,
    user_id: &str,
    records: &[SummaryRecord],
) -> Result<usize, rusqlite::Error> {
    let stored: i64 = conn.query_row(
        "SELECT COUNT(*) FROM summaries WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    let stored = usize::try_from(stored).unwrap_or(0);
    let Some(new) = records.get(stored..).filter(|new| !new.is_empty()) else {
        return Ok(0);
    };

    let mut stmt = conn.prepare(
        "INSERT INTO summaries (user_id, seq, conversation_time, summary)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (offset, record) in new.iter().enumerate() {
        stmt.execute(params![
            user_id,
            (stored + offset) as i64,
            record.conversation_time_label(),
            record.summary,
        ])?;
    }
    Ok(new.len())
}
