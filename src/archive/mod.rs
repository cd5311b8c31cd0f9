//! Message archive: best-effort durable log of chat traffic.
//!
//! The archive is never load-bearing for live delivery. Appends are
//! submitted fire-and-forget to a dedicated writer task; history reads
//! happen on that task (room history on join) or on spawn_blocking
//! (REST endpoints). A failed or slow archive delays nothing but its
//! own writes.

pub mod routes;
pub mod store;
pub mod writer;

use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

pub use writer::{ArchiveCommand, ArchiveHandle};

/// Unix-millis timestamp for stamping outbound and archived messages.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// A chat message as constructed by the router and stored in the archive.
/// Exactly one of `room` / `recipient` is set: `room` for group
/// messages, `recipient` for direct messages.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub sender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    pub body: String,
    pub timestamp: u64,
}

impl ChatMessage {
    pub fn group(sender: String, room: String, body: String) -> Self {
        Self {
            sender,
            room: Some(room),
            recipient: None,
            body,
            timestamp: now_millis(),
        }
    }

    pub fn direct(sender: String, recipient: String, body: String) -> Self {
        Self {
            sender,
            room: None,
            recipient: Some(recipient),
            body,
            timestamp: now_millis(),
        }
    }
}
