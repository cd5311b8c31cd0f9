//! Synchronous SQLite queries for the message archive.
//! Callers are responsible for keeping this work off the async runtime
//! (writer task or spawn_blocking).

use rusqlite::Connection;
use uuid::Uuid;

use super::ChatMessage;

/// Default page size for history reads.
pub const DEFAULT_LIMIT: u32 = 50;
/// Maximum page size for history reads.
pub const MAX_LIMIT: u32 = 100;

/// Clamp a requested limit into [1, MAX_LIMIT], defaulting when absent.
pub fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Append one message record.
pub fn append(conn: &Connection, message: &ChatMessage) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO messages (id, sender, room, recipient, body, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            Uuid::now_v7().to_string(),
            message.sender,
            message.room,
            message.recipient,
            message.body,
            message.timestamp as i64,
        ],
    )?;
    Ok(())
}

/// The most recent `limit` group messages for a room, oldest first.
pub fn recent_for_room(
    conn: &Connection,
    room: &str,
    limit: u32,
) -> Result<Vec<ChatMessage>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT sender, room, recipient, body, timestamp FROM messages
         WHERE room = ?1 ORDER BY timestamp DESC, id DESC LIMIT ?2",
    )?;
    let mut messages = collect_rows(&mut stmt, rusqlite::params![room, limit])?;
    messages.reverse();
    Ok(messages)
}

/// The most recent `limit` direct messages between two identities,
/// in either direction, oldest first.
pub fn recent_for_pair(
    conn: &Connection,
    a: &str,
    b: &str,
    limit: u32,
) -> Result<Vec<ChatMessage>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT sender, room, recipient, body, timestamp FROM messages
         WHERE (sender = ?1 AND recipient = ?2) OR (sender = ?2 AND recipient = ?1)
         ORDER BY timestamp DESC, id DESC LIMIT ?3",
    )?;
    let mut messages = collect_rows(&mut stmt, rusqlite::params![a, b, limit])?;
    messages.reverse();
    Ok(messages)
}

fn collect_rows(
    stmt: &mut rusqlite::Statement<'_>,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<ChatMessage>, rusqlite::Error> {
    let rows = stmt.query_map(params, |row| {
        Ok(ChatMessage {
            sender: row.get(0)?,
            room: row.get(1)?,
            recipient: row.get(2)?,
            body: row.get(3)?,
            timestamp: row.get::<_, i64>(4)? as u64,
        })
    })?;
    rows.collect()
}
