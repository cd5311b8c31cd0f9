//! The hub: session/presence registry and message-routing engine.
//!
//! One hub task owns the connection registry and processes inbound
//! connection events strictly one at a time, so registry mutation needs
//! no locking. The only concurrency is with the archive writer, which
//! receives fire-and-forget commands: live broadcasts are never ordered
//! behind persistence.

pub mod broadcast;
mod presence;
pub mod registry;
mod router;
mod typing;

use tokio::sync::mpsc;

use crate::archive::ArchiveHandle;
use crate::ws::protocol::ClientEvent;
use crate::ws::ConnectionSender;

pub use registry::{ConnectionId, Registry, Session};

/// Inbound connection events processed by the hub task.
#[derive(Debug)]
pub enum HubEvent {
    /// Transport established a new connection.
    Connected {
        conn: ConnectionId,
        tx: ConnectionSender,
    },
    /// A decoded client frame.
    Client {
        conn: ConnectionId,
        event: ClientEvent,
    },
    /// Transport lost the connection.
    Disconnected { conn: ConnectionId },
}

/// Cloneable handle for submitting events to the hub task.
#[derive(Clone, Debug)]
pub struct HubHandle {
    tx: mpsc::UnboundedSender<HubEvent>,
}

impl HubHandle {
    pub fn connected(&self, conn: ConnectionId, tx: ConnectionSender) {
        self.send(HubEvent::Connected { conn, tx });
    }

    pub fn client_event(&self, conn: ConnectionId, event: ClientEvent) {
        self.send(HubEvent::Client { conn, event });
    }

    pub fn disconnected(&self, conn: ConnectionId) {
        self.send(HubEvent::Disconnected { conn });
    }

    fn send(&self, event: HubEvent) {
        if self.tx.send(event).is_err() {
            tracing::error!("Hub task is gone; dropping connection event");
        }
    }
}

/// Hub state machine. Owned by the hub task; unit tests drive it
/// directly through [`Hub::handle`].
pub struct Hub {
    registry: Registry,
    archive: ArchiveHandle,
    history_limit: u32,
}

impl Hub {
    pub fn new(archive: ArchiveHandle, history_limit: u32) -> Self {
        Self {
            registry: Registry::new(),
            archive,
            history_limit,
        }
    }

    /// Spawn the hub event loop and return its handle.
    pub fn spawn(archive: ArchiveHandle, history_limit: u32) -> HubHandle {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut hub = Self::new(archive, history_limit);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                hub.handle(event);
            }
            tracing::debug!("Hub task stopped");
        });
        HubHandle { tx }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Process one inbound connection event to completion.
    pub fn handle(&mut self, event: HubEvent) {
        match event {
            HubEvent::Connected { conn, tx } => {
                self.registry.register(conn, tx);
                tracing::debug!(conn, "Connection registered");
            }
            HubEvent::Client { conn, event } => self.handle_client(conn, event),
            HubEvent::Disconnected { conn } => self.disconnect(conn),
        }
    }

    fn handle_client(&mut self, conn: ConnectionId, event: ClientEvent) {
        match event {
            ClientEvent::Join { identity, room } => self.join(conn, identity, room),
            ClientEvent::Message { body } => self.route_group_message(conn, body),
            ClientEvent::DirectMessage { recipient, body } => {
                self.route_direct_message(conn, recipient, body);
            }
            ClientEvent::Typing { room, recipient } => self.typing(conn, room, recipient, true),
            ClientEvent::StopTyping { room, recipient } => {
                self.typing(conn, room, recipient, false);
            }
            ClientEvent::Leave => self.leave(conn),
        }
    }
}
