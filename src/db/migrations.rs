use rusqlite_migration::{Migrations, M};

/// Define all schema migrations.
/// Uses SQLite user_version pragma for tracking — no migration table needed.
pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(
        "-- Migration 1: Initial schema

CREATE TABLE users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE messages (
    id TEXT PRIMARY KEY,
    sender TEXT NOT NULL,
    room TEXT,
    recipient TEXT,
    body TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    CHECK ((room IS NULL) != (recipient IS NULL))
);

CREATE INDEX idx_messages_room ON messages(room, timestamp);
CREATE INDEX idx_messages_pair ON messages(sender, recipient, timestamp);
",
    )])
}
