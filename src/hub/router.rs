//! Message routing: group broadcast and identity-addressed direct
//! messages. Archival is fire-and-forget; delivery never waits on it.

use super::broadcast::{send_to_connection, send_to_identity, send_to_room};
use super::{ConnectionId, Hub};
use crate::archive::ChatMessage;
use crate::ws::protocol::ServerEvent;

impl Hub {
    /// Broadcast a chat message to the sender's current room, sender
    /// included (echo). A connection that sends before joining is
    /// silently ignored.
    pub(super) fn route_group_message(&mut self, conn: ConnectionId, body: String) {
        let Some(session) = self.registry.session(conn) else {
            return;
        };
        let (Some(identity), Some(room)) = (session.identity.clone(), session.room.clone()) else {
            tracing::debug!(conn, "Dropping group message from unbound connection");
            return;
        };

        let message = ChatMessage::group(identity.clone(), room.clone(), body);
        let event = ServerEvent::GroupMessage {
            sender: identity,
            room: room.clone(),
            body: message.body.clone(),
            timestamp: message.timestamp,
        };
        self.archive.append(message);
        send_to_room(&self.registry, &room, &event, None);
    }

    /// Route a direct message to every live connection bound to the
    /// recipient identity, and always echo it back to the sender so the
    /// sender's view stays consistent even when the recipient is
    /// offline.
    pub(super) fn route_direct_message(
        &mut self,
        conn: ConnectionId,
        recipient: String,
        body: String,
    ) {
        let Some(identity) = self.registry.session(conn).and_then(|s| s.identity.clone()) else {
            tracing::debug!(conn, "Dropping direct message from unbound connection");
            return;
        };

        let message = ChatMessage::direct(identity.clone(), recipient.clone(), body);
        let event = ServerEvent::DirectMessage {
            sender: identity,
            recipient: recipient.clone(),
            body: message.body.clone(),
            timestamp: message.timestamp,
        };
        self.archive.append(message);

        // The sending connection is excluded here and covered by the
        // unconditional echo below, so a self-addressed message still
        // arrives exactly once per connection.
        send_to_identity(&self.registry, &recipient, &event, Some(conn));
        send_to_connection(&self.registry, conn, &event);
    }
}
