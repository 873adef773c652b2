//! Domain model structs persisted in the SQLite database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered user identity.
///
/// The password hash is deliberately excluded from serialization so the
/// struct can be handed to an API layer without leaking credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Opaque bcrypt hash string (salt embedded). Never the plaintext.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Optional contact email.
    pub email: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Note
// ---------------------------------------------------------------------------

/// A single note, owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    /// Unique note identifier.
    pub id: Uuid,
    /// Owning user; immutable after creation.
    pub user_id: Uuid,
    /// Note title, at most 200 characters.
    pub title: String,
    /// Note body, arbitrary length.
    pub content: String,
    /// Server-assigned creation timestamp; immutable after creation.
    pub created_at: DateTime<Utc>,
}
