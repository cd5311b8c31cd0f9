//! Wire protocol: JSON text frames, internally tagged by `type`.
//!
//! Event names are kebab-case on the wire: `join`, `message`,
//! `direct-message`, `typing`, `stop-typing`, `leave` inbound;
//! `system-notice`, `roster`, `history`, `group-message`,
//! `direct-message`, `typing`, `stop-typing` outbound.

use serde::{Deserialize, Serialize};

use crate::archive::ChatMessage;

/// Sender name used for system notices.
pub const SYSTEM_SENDER: &str = "bot";

/// Events a client may send over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Bind this connection to an identity and a room.
    Join { identity: String, room: String },
    /// Group message to the sender's current room.
    Message { body: String },
    /// Direct message to a specific identity.
    DirectMessage {
        #[serde(alias = "recipientIdentity")]
        recipient: String,
        body: String,
    },
    /// Typing indicator; exactly one of `room` / `recipient` is expected.
    Typing {
        #[serde(default)]
        room: Option<String>,
        #[serde(default, alias = "recipientIdentity")]
        recipient: Option<String>,
    },
    StopTyping {
        #[serde(default)]
        room: Option<String>,
        #[serde(default, alias = "recipientIdentity")]
        recipient: Option<String>,
    },
    /// Leave the current room but keep the connection open.
    Leave,
}

/// Events the server pushes to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    SystemNotice {
        from: &'static str,
        body: String,
        timestamp: u64,
    },
    Roster {
        members: Vec<String>,
    },
    History {
        messages: Vec<ChatMessage>,
    },
    GroupMessage {
        sender: String,
        room: String,
        body: String,
        timestamp: u64,
    },
    DirectMessage {
        sender: String,
        recipient: String,
        body: String,
        timestamp: u64,
    },
    Typing {
        identity: String,
    },
    StopTyping {},
}

impl ServerEvent {
    /// System notice from the relay itself, stamped with the current time.
    pub fn notice(body: String) -> Self {
        Self::SystemNotice {
            from: SYSTEM_SENDER,
            body,
            timestamp: crate::archive::now_millis(),
        }
    }

    /// Encode as a JSON text frame.
    pub fn to_message(&self) -> Option<axum::extract::ws::Message> {
        match serde_json::to_string(self) {
            Ok(text) => Some(axum::extract::ws::Message::Text(text.into())),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode server event");
                None
            }
        }
    }
}
