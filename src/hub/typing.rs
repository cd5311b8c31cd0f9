//! Typing relay: stateless pass-through of typing/stop-typing signals.
//! No archive interaction, no session mutation; the receiving side owns
//! any timeout-based auto-clear.

use super::broadcast::{send_to_identity, send_to_room};
use super::{ConnectionId, Hub};
use crate::ws::protocol::ServerEvent;

impl Hub {
    pub(super) fn typing(
        &mut self,
        conn: ConnectionId,
        room: Option<String>,
        recipient: Option<String>,
        active: bool,
    ) {
        let Some(identity) = self.registry.session(conn).and_then(|s| s.identity.clone()) else {
            tracing::debug!(conn, "Dropping typing signal from unbound connection");
            return;
        };

        let event = if active {
            ServerEvent::Typing { identity }
        } else {
            ServerEvent::StopTyping {}
        };

        // A recipient identity takes precedence over a room target.
        if let Some(recipient) = recipient {
            send_to_identity(&self.registry, &recipient, &event, Some(conn));
        } else if let Some(room) = room {
            send_to_room(&self.registry, &room, &event, Some(conn));
        }
    }
}
