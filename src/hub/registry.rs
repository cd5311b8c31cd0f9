//! Connection registry: single source of truth for who is online and
//! where.
//!
//! The registry is owned exclusively by the hub task; all mutation is
//! serialized by the hub's event loop, so no locking is needed. Rooms
//! are not stored entities — a room is the set of sessions currently
//! bound to its name.

use std::collections::HashMap;

use crate::ws::ConnectionSender;

/// Opaque handle assigned by the transport layer for the lifetime of
/// one connection. Never persisted.
pub type ConnectionId = u64;

/// Live state bound to one active connection.
#[derive(Debug)]
pub struct Session {
    pub tx: ConnectionSender,
    /// Logical username; set only after a join event.
    pub identity: Option<String>,
    /// Currently joined room, at most one at any instant.
    pub room: Option<String>,
    /// Monotonic bind sequence, used to order rosters by arrival.
    arrival: u64,
}

#[derive(Debug, Default)]
pub struct Registry {
    sessions: HashMap<ConnectionId, Session>,
    /// Secondary index kept in lockstep with `sessions`: identity →
    /// bound connections, in bind order. Multiple connections may share
    /// an identity (same user on two devices).
    by_identity: HashMap<String, Vec<ConnectionId>>,
    next_arrival: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session for a newly established connection.
    pub fn register(&mut self, conn: ConnectionId, tx: ConnectionSender) {
        self.sessions.insert(
            conn,
            Session {
                tx,
                identity: None,
                room: None,
                arrival: 0,
            },
        );
    }

    /// Bind identity and room for a registered session. The caller must
    /// have detached any previous room first (leave semantics live in
    /// the presence layer). Returns false for unknown connections.
    pub fn bind(&mut self, conn: ConnectionId, identity: &str, room: &str) -> bool {
        self.next_arrival += 1;
        let arrival = self.next_arrival;
        let Some(session) = self.sessions.get_mut(&conn) else {
            return false;
        };

        let previous_identity = session.identity.replace(identity.to_string());
        session.room = Some(room.to_string());
        session.arrival = arrival;

        if previous_identity.as_deref() != Some(identity) {
            if let Some(previous) = previous_identity {
                self.drop_from_index(&previous, conn);
            }
            self.by_identity.entry(identity.to_string()).or_default().push(conn);
        }
        true
    }

    /// Clear only the room binding, preserving identity. Returns the
    /// room that was left, if any.
    pub fn unbind_room(&mut self, conn: ConnectionId) -> Option<String> {
        self.sessions.get_mut(&conn)?.room.take()
    }

    /// Delete the session entirely (disconnect).
    pub fn remove(&mut self, conn: ConnectionId) -> Option<Session> {
        let session = self.sessions.remove(&conn)?;
        if let Some(identity) = &session.identity {
            let identity = identity.clone();
            self.drop_from_index(&identity, conn);
        }
        Some(session)
    }

    pub fn session(&self, conn: ConnectionId) -> Option<&Session> {
        self.sessions.get(&conn)
    }

    /// All connections currently bound to an identity, in bind order.
    pub fn connections_for(&self, identity: &str) -> &[ConnectionId] {
        self.by_identity.get(identity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sessions currently bound to a room, in arrival order.
    pub fn sessions_in<'a>(
        &'a self,
        room: &'a str,
    ) -> impl Iterator<Item = (ConnectionId, &'a Session)> {
        let mut present: Vec<_> = self
            .sessions
            .iter()
            .filter(|(_, session)| session.room.as_deref() == Some(room))
            .map(|(conn, session)| (*conn, session))
            .collect();
        present.sort_by_key(|(_, session)| session.arrival);
        present.into_iter()
    }

    /// Roster for a room: identities present, ordered by arrival. An
    /// identity with several connections in the room appears once.
    pub fn members_of(&self, room: &str) -> Vec<String> {
        let mut members: Vec<String> = Vec::new();
        for (_, session) in self.sessions_in(room) {
            if let Some(identity) = &session.identity {
                if !members.iter().any(|m| m == identity) {
                    members.push(identity.clone());
                }
            }
        }
        members
    }

    fn drop_from_index(&mut self, identity: &str, conn: ConnectionId) {
        if let Some(connections) = self.by_identity.get_mut(identity) {
            connections.retain(|c| *c != conn);
            if connections.is_empty() {
                self.by_identity.remove(identity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn sender() -> ConnectionSender {
        mpsc::unbounded_channel().0
    }

    #[test]
    fn register_leaves_identity_and_room_unset() {
        let mut registry = Registry::new();
        registry.register(1, sender());

        let session = registry.session(1).unwrap();
        assert!(session.identity.is_none());
        assert!(session.room.is_none());
    }

    #[test]
    fn members_track_bound_rooms_exactly() {
        let mut registry = Registry::new();
        for conn in 1..=3 {
            registry.register(conn, sender());
        }
        registry.bind(1, "alice", "sports");
        registry.bind(2, "bob", "sports");
        registry.bind(3, "carol", "tech");

        assert_eq!(registry.members_of("sports"), vec!["alice", "bob"]);
        assert_eq!(registry.members_of("tech"), vec!["carol"]);
        assert!(registry.members_of("random").is_empty());
    }

    #[test]
    fn rebinding_supersedes_previous_room() {
        let mut registry = Registry::new();
        registry.register(1, sender());
        registry.bind(1, "alice", "sports");

        registry.unbind_room(1);
        registry.bind(1, "alice", "tech");

        assert!(registry.members_of("sports").is_empty());
        assert_eq!(registry.members_of("tech"), vec!["alice"]);
        assert_eq!(registry.session(1).unwrap().room.as_deref(), Some("tech"));
    }

    #[test]
    fn unbind_preserves_identity() {
        let mut registry = Registry::new();
        registry.register(1, sender());
        registry.bind(1, "alice", "sports");

        assert_eq!(registry.unbind_room(1).as_deref(), Some("sports"));
        let session = registry.session(1).unwrap();
        assert_eq!(session.identity.as_deref(), Some("alice"));
        assert!(session.room.is_none());
        // Identity index survives an explicit leave.
        assert_eq!(registry.connections_for("alice"), &[1u64][..]);
    }

    #[test]
    fn identity_index_stays_in_lockstep() {
        let mut registry = Registry::new();
        registry.register(1, sender());
        registry.register(2, sender());
        registry.bind(1, "alice", "sports");
        registry.bind(2, "alice", "tech");

        assert_eq!(registry.connections_for("alice"), &[1u64, 2][..]);

        registry.remove(1);
        assert_eq!(registry.connections_for("alice"), &[2u64][..]);

        registry.remove(2);
        assert!(registry.connections_for("alice").is_empty());
    }

    #[test]
    fn rebinding_identity_moves_index_entry() {
        let mut registry = Registry::new();
        registry.register(1, sender());
        registry.bind(1, "alice", "sports");
        registry.bind(1, "alice2", "sports");

        assert!(registry.connections_for("alice").is_empty());
        assert_eq!(registry.connections_for("alice2"), &[1u64][..]);
    }

    #[test]
    fn roster_orders_by_arrival_and_dedups() {
        let mut registry = Registry::new();
        for conn in 1..=3 {
            registry.register(conn, sender());
        }
        registry.bind(1, "bob", "sports");
        registry.bind(2, "alice", "sports");
        // Same identity, second device, same room.
        registry.bind(3, "bob", "sports");

        assert_eq!(registry.members_of("sports"), vec!["bob", "alice"]);
    }
}
