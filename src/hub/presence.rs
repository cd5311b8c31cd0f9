//! Presence: join/leave sequences, system notices, and roster refreshes.

use super::broadcast::{send_to_connection, send_to_room};
use super::{ConnectionId, Hub};
use crate::ws::protocol::ServerEvent;

impl Hub {
    /// Join sequence:
    /// 1. leave the current room, if any (notice + roster to it);
    /// 2. bind identity and room;
    /// 3. private welcome notice to the joiner;
    /// 4. "joined" notice to everyone else in the room;
    /// 5. refreshed roster to the whole room, joiner included;
    /// 6. room history delivered privately, without blocking 1–5.
    ///
    /// Rejoining the same room runs the full leave/join sequence too, so
    /// presence broadcasts stay consistent.
    pub(super) fn join(&mut self, conn: ConnectionId, identity: String, room: String) {
        if self.registry.session(conn).is_none() {
            tracing::debug!(conn, "Join from unknown connection");
            return;
        }
        self.depart(conn);

        self.registry.bind(conn, &identity, &room);
        tracing::info!(conn, identity = %identity, room = %room, "Joined room");

        send_to_connection(
            &self.registry,
            conn,
            &ServerEvent::notice(format!("Welcome to {room}, {identity}!")),
        );
        send_to_room(
            &self.registry,
            &room,
            &ServerEvent::notice(format!("{identity} has joined the room")),
            Some(conn),
        );
        send_to_room(
            &self.registry,
            &room,
            &ServerEvent::Roster {
                members: self.registry.members_of(&room),
            },
            None,
        );

        if let Some(session) = self.registry.session(conn) {
            self.archive
                .fetch_room_history(room, self.history_limit, session.tx.clone());
        }
    }

    /// Explicit leave: detach the room binding, keep the session.
    pub(super) fn leave(&mut self, conn: ConnectionId) {
        self.depart(conn);
    }

    /// Disconnect: leave semantics, then remove the session entirely.
    /// Any later event from this connection id is a no-op.
    pub(super) fn disconnect(&mut self, conn: ConnectionId) {
        self.depart(conn);
        if self.registry.remove(conn).is_some() {
            tracing::debug!(conn, "Connection removed");
        }
    }

    /// Shared leave semantics: if the session is bound to a room, detach
    /// it and tell the (now former) room. No-op for absent or unbound
    /// sessions.
    fn depart(&mut self, conn: ConnectionId) {
        let Some(session) = self.registry.session(conn) else {
            return;
        };
        let Some(identity) = session.identity.clone() else {
            return;
        };
        let Some(room) = self.registry.unbind_room(conn) else {
            return;
        };
        tracing::info!(conn, identity = %identity, room = %room, "Left room");

        send_to_room(
            &self.registry,
            &room,
            &ServerEvent::notice(format!("{identity} has left the room")),
            None,
        );
        send_to_room(
            &self.registry,
            &room,
            &ServerEvent::Roster {
                members: self.registry.members_of(&room),
            },
            None,
        );
    }
}
