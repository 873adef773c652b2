use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::User;

impl Database {
    /// Insert a new user record.
    ///
    /// A UNIQUE violation on `username` surfaces as
    /// [`StoreError::UsernameTaken`]; SQLite resolves concurrent duplicate
    /// registrations atomically, so no application-level locking is needed.
    pub fn insert_user(&self, user: &User) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO users (id, username, password_hash, email, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.id.to_string(),
                    user.username,
                    user.password_hash,
                    user.email,
                    user.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    StoreError::UsernameTaken
                }
                other => StoreError::Sqlite(other),
            })?;
        Ok(())
    }

    /// Look up a user by login name.
    pub fn get_user_by_username(&self, username: &str) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT id, username, password_hash, email, created_at
                 FROM users WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Look up a user by id.
    pub fn get_user_by_id(&self, id: Uuid) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT id, username, password_hash, email, created_at
                 FROM users WHERE id = ?1",
                params![id.to_string()],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Delete a user and (via `ON DELETE CASCADE`) all of their notes.
    ///
    /// There is no API surface for this; it exists for administrative tooling
    /// and tests of the cascade rule.
    pub fn delete_user(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id_str: String = row.get(0)?;
    let username: String = row.get(1)?;
    let password_hash: String = row.get(2)?;
    let email: Option<String> = row.get(3)?;
    let ts_str: String = row.get(4)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(User {
        id,
        username,
        password_hash,
        email,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(username: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: "$2b$12$fakefakefakefakefakefake".to_string(),
            email: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn insert_and_lookup() {
        let db = Database::open_in_memory().unwrap();
        let user = test_user("alice");
        db.insert_user(&user).unwrap();

        let found = db.get_user_by_username("alice").unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.password_hash, user.password_hash);

        let by_id = db.get_user_by_id(user.id).unwrap();
        assert_eq!(by_id.username, "alice");
    }

    #[test]
    fn duplicate_username_is_conflict() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&test_user("alice")).unwrap();

        let err = db.insert_user(&test_user("alice")).unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken));
    }

    #[test]
    fn unknown_username_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = db.get_user_by_username("ghost").unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn stored_hash_is_not_serialized() {
        let user = test_user("alice");
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("fakefake"));
    }
}
