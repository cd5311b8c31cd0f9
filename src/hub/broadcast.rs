//! Fan-out helpers over the connection registry.
//! Events are encoded once per fan-out and cloned per recipient.

use super::registry::{ConnectionId, Registry};
use crate::ws::protocol::ServerEvent;

/// Send an event to a single connection. A closed channel means the
/// connection is tearing down; the send is simply dropped.
pub fn send_to_connection(registry: &Registry, conn: ConnectionId, event: &ServerEvent) {
    let Some(msg) = event.to_message() else { return };
    if let Some(session) = registry.session(conn) {
        let _ = session.tx.send(msg);
    }
}

/// Broadcast an event to every connection currently bound to a room,
/// optionally excluding one connection (e.g. the sender).
pub fn send_to_room(
    registry: &Registry,
    room: &str,
    event: &ServerEvent,
    exclude: Option<ConnectionId>,
) {
    let Some(msg) = event.to_message() else { return };
    for (conn, session) in registry.sessions_in(room) {
        if Some(conn) == exclude {
            continue;
        }
        let _ = session.tx.send(msg.clone());
    }
}

/// Deliver an event to every connection bound to an identity,
/// optionally excluding one connection. No-op if the identity has no
/// live session.
pub fn send_to_identity(
    registry: &Registry,
    identity: &str,
    event: &ServerEvent,
    exclude: Option<ConnectionId>,
) {
    let Some(msg) = event.to_message() else { return };
    for conn in registry.connections_for(identity) {
        if Some(*conn) == exclude {
            continue;
        }
        if let Some(session) = registry.session(*conn) {
            let _ = session.tx.send(msg.clone());
        }
    }
}
