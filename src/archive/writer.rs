//! Archive writer task.
//!
//! The hub submits appends and join-time history fetches over an
//! unbounded channel and never awaits completion. The writer processes
//! commands sequentially so the archive reflects submission order;
//! failures are logged and otherwise swallowed.

use tokio::sync::mpsc;

use super::{store, ChatMessage};
use crate::db::DbPool;
use crate::ws::protocol::ServerEvent;
use crate::ws::ConnectionSender;

/// One-way commands accepted by the writer task.
#[derive(Debug)]
pub enum ArchiveCommand {
    Append(ChatMessage),
    /// Fetch recent room history and deliver it privately to `reply`.
    RoomHistory {
        room: String,
        limit: u32,
        reply: ConnectionSender,
    },
}

/// Cloneable handle for submitting archive commands.
#[derive(Clone, Debug)]
pub struct ArchiveHandle {
    tx: mpsc::UnboundedSender<ArchiveCommand>,
}

impl ArchiveHandle {
    /// Handle plus the receiving end, for driving the writer (or a test)
    /// manually.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<ArchiveCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Spawn the writer task against a database and return its handle.
    pub fn spawn(db: DbPool) -> Self {
        let (handle, rx) = Self::pair();
        tokio::spawn(run_writer(db, rx));
        handle
    }

    /// Fire-and-forget append. A closed writer is logged, not surfaced.
    pub fn append(&self, message: ChatMessage) {
        if self.tx.send(ArchiveCommand::Append(message)).is_err() {
            tracing::warn!("Archive writer is gone; dropping message append");
        }
    }

    /// Request room history, delivered as a `history` event to `reply`.
    pub fn fetch_room_history(&self, room: String, limit: u32, reply: ConnectionSender) {
        let command = ArchiveCommand::RoomHistory { room, limit, reply };
        if self.tx.send(command).is_err() {
            tracing::warn!("Archive writer is gone; dropping history fetch");
        }
    }
}

/// Writer loop. DB work runs on spawn_blocking, one command at a time.
pub async fn run_writer(db: DbPool, mut rx: mpsc::UnboundedReceiver<ArchiveCommand>) {
    while let Some(command) = rx.recv().await {
        let db = db.clone();
        let result = tokio::task::spawn_blocking(move || handle_command(&db, command)).await;
        if let Err(e) = result {
            tracing::error!(error = %e, "Archive writer worker panicked");
        }
    }
    tracing::debug!("Archive writer stopped");
}

fn handle_command(db: &DbPool, command: ArchiveCommand) {
    match command {
        ArchiveCommand::Append(message) => {
            let conn = match db.lock() {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!(error = %e, "Archive unavailable; message not recorded");
                    return;
                }
            };
            if let Err(e) = store::append(&conn, &message) {
                tracing::warn!(error = %e, "Failed to archive message");
            }
        }
        ArchiveCommand::RoomHistory { room, limit, reply } => {
            let messages = {
                let conn = match db.lock() {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(error = %e, room = %room, "Archive unavailable; skipping history");
                        return;
                    }
                };
                match store::recent_for_room(&conn, &room, limit) {
                    Ok(messages) => messages,
                    Err(e) => {
                        tracing::warn!(error = %e, room = %room, "Failed to read room history");
                        return;
                    }
                }
            };
            // The joiner may already be gone; that is not an error.
            if let Some(msg) = (ServerEvent::History { messages }).to_message() {
                let _ = reply.send(msg);
            }
        }
    }
}
