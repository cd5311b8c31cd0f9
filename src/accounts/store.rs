//! Synchronous SQLite account queries with argon2 password hashing.
//! Callers run these on spawn_blocking.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

/// Maximum username length (chars).
pub const MAX_USERNAME_LENGTH: usize = 32;

#[derive(Debug, PartialEq, Eq)]
pub enum CreateError {
    /// Username already registered.
    Taken,
    /// Empty, too long, or otherwise unusable username/secret.
    Invalid,
    Internal,
}

/// Create a new identity. The username becomes the logical identity
/// clients bind on join.
pub fn create(conn: &Connection, username: &str, secret: &str) -> Result<(), CreateError> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LENGTH || secret.is_empty() {
        return Err(CreateError::Invalid);
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|_| CreateError::Internal)?
        .to_string();

    let result = conn.execute(
        "INSERT INTO users (id, username, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            Uuid::now_v7().to_string(),
            username,
            password_hash,
            Utc::now().to_rfc3339(),
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(CreateError::Taken)
        }
        Err(_) => Err(CreateError::Internal),
    }
}

/// Verify a username/secret pair. Returns the canonical identity on
/// success, None on unknown user or wrong secret.
pub fn verify(conn: &Connection, username: &str, secret: &str) -> Option<String> {
    let username = username.trim();
    let stored: String = conn
        .query_row(
            "SELECT password_hash FROM users WHERE username = ?1",
            rusqlite::params![username],
            |row| row.get(0),
        )
        .ok()?;

    let parsed = PasswordHash::new(&stored).ok()?;
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .ok()?;
    Some(username.to_string())
}
