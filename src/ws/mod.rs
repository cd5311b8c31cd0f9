pub mod actor;
pub mod handler;
pub mod protocol;

use tokio::sync::mpsc;

/// Type alias for the sender half of a WebSocket connection's channel.
/// The hub and the archive writer push frames to a specific client by
/// cloning this.
pub type ConnectionSender = mpsc::UnboundedSender<axum::extract::ws::Message>;
