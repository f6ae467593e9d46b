// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcript rows.

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{Connection, params};

use empath_core::types::{EmotionLabel, Transcript, Turn};

/// Loads a user's transcript in turn order.
pub fn load_transcript(conn: &Connection, user_id: &str) -> Result<Transcript, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT user_input, bot_response, emotion FROM turns
         WHERE user_id = ?1 ORDER BY seq ASC",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        let emotion: String = row.get(2)?;
        let emotion = EmotionLabel::from_str(&emotion)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
        Ok(Turn {
            user_input: row.get(0)?,
            bot_response: row.get(1)?,
            emotion,
        })
    })?;
    let turns = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(Transcript::from_turns(turns))
}

/// Replaces a user's stored transcript with `transcript`.
pub fn replace_transcript(
    conn: &Connection,
    user_id: &str,
    transcript: &Transcript,
) -> Result<(), rusqlite::Error> {
    conn.execute("DELETE FROM turns WHERE user_id = ?1", params![user_id])?;
    let mut stmt = conn.prepare(
        "INSERT INTO turns (user_id, seq, user_input, bot_response, emotion)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (seq, turn) in transcript.iter().enumerate() {
        stmt.execute(params![
            user_id,
            seq as i64,
            turn.user_input,
            turn.bot_response,
            turn.emotion.to_string(),
        ])?;
    }
    Ok(())
}
