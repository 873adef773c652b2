//! Note CRUD helpers, all scoped to an owning user.
//!
//! Ownership is folded into every WHERE clause: a lookup for a note that
//! exists but belongs to someone else behaves exactly like a lookup for a
//! note that does not exist.  Callers cannot distinguish the two cases.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Note;

impl Database {
    pub fn insert_note(&self, note: &Note) -> Result<()> {
        self.conn().execute(
            "INSERT INTO notes (id, user_id, title, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                note.id.to_string(),
                note.user_id.to_string(),
                note.title,
                note.content,
                note.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All notes owned by `user_id`, newest first.
    pub fn list_notes_for_user(&self, user_id: Uuid) -> Result<Vec<Note>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, user_id, title, content, created_at
             FROM notes
             WHERE user_id = ?1
             ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map(params![user_id.to_string()], row_to_note)?;

        let mut notes = Vec::new();
        for row in rows {
            notes.push(row?);
        }
        Ok(notes)
    }

    /// Fetch a single note owned by `user_id`.
    pub fn get_note(&self, user_id: Uuid, id: Uuid) -> Result<Note> {
        self.conn()
            .query_row(
                "SELECT id, user_id, title, content, created_at
                 FROM notes WHERE id = ?1 AND user_id = ?2",
                params![id.to_string(), user_id.to_string()],
                row_to_note,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Apply a partial update to a note owned by `user_id`.
    ///
    /// `None` fields are left untouched; owner and creation timestamp are
    /// never mutable.  Returns the updated note.
    pub fn update_note(
        &self,
        user_id: Uuid,
        id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Note> {
        let affected = self.conn().execute(
            "UPDATE notes
             SET title = COALESCE(?3, title), content = COALESCE(?4, content)
             WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id.to_string(), title, content],
        )?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        self.get_note(user_id, id)
    }

    /// Delete a note owned by `user_id`.  Returns `false` when nothing
    /// matched (already gone, or owned by someone else).
    pub fn delete_note(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM notes WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id.to_string()],
        )?;
        Ok(affected > 0)
    }
}

fn row_to_note(row: &rusqlite::Row<'_>) -> rusqlite::Result<Note> {
    let id_str: String = row.get(0)?;
    let user_id_str: String = row.get(1)?;
    let title: String = row.get(2)?;
    let content: String = row.get(3)?;
    let ts_str: String = row.get(4)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let user_id = Uuid::parse_str(&user_id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Note {
        id,
        user_id,
        title,
        content,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use chrono::Duration;

    fn seed_user(db: &Database, username: &str) -> Uuid {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: "$2b$12$fakefakefakefakefakefake".to_string(),
            email: None,
            created_at: Utc::now(),
        };
        db.insert_user(&user).unwrap();
        user.id
    }

    fn seed_note(db: &Database, user_id: Uuid, title: &str, created_at: DateTime<Utc>) -> Uuid {
        let note = Note {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            content: format!("content of {title}"),
            created_at,
        };
        db.insert_note(&note).unwrap();
        note.id
    }

    #[test]
    fn list_is_owner_scoped_and_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        let bob = seed_user(&db, "bob");

        let base = Utc::now();
        seed_note(&db, alice, "oldest", base - Duration::minutes(2));
        seed_note(&db, bob, "bobs", base - Duration::minutes(1));
        seed_note(&db, alice, "newest", base);

        let notes = db.list_notes_for_user(alice).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].title, "newest");
        assert_eq!(notes[1].title, "oldest");
        assert!(notes.iter().all(|n| n.user_id == alice));
    }

    #[test]
    fn foreign_note_is_invisible() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        let bob = seed_user(&db, "bob");
        let bobs_note = seed_note(&db, bob, "secret", Utc::now());

        assert!(matches!(
            db.get_note(alice, bobs_note).unwrap_err(),
            StoreError::NotFound
        ));
        assert!(matches!(
            db.update_note(alice, bobs_note, Some("x"), None).unwrap_err(),
            StoreError::NotFound
        ));
        assert!(!db.delete_note(alice, bobs_note).unwrap());

        // Bob still sees his note untouched.
        let note = db.get_note(bob, bobs_note).unwrap();
        assert_eq!(note.title, "secret");
    }

    #[test]
    fn partial_update_leaves_other_field_unchanged() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        let id = seed_note(&db, alice, "groceries", Utc::now());

        let updated = db.update_note(alice, id, Some("errands"), None).unwrap();
        assert_eq!(updated.title, "errands");
        assert_eq!(updated.content, "content of groceries");

        let updated = db.update_note(alice, id, None, Some("milk")).unwrap();
        assert_eq!(updated.title, "errands");
        assert_eq!(updated.content, "milk");
    }

    #[test]
    fn delete_is_idempotent_not_found() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        let id = seed_note(&db, alice, "todo", Utc::now());

        assert!(db.delete_note(alice, id).unwrap());
        assert!(!db.delete_note(alice, id).unwrap());
    }

    #[test]
    fn deleting_user_cascades_to_notes() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        seed_note(&db, alice, "one", Utc::now());
        seed_note(&db, alice, "two", Utc::now());

        assert!(db.delete_user(alice).unwrap());

        let orphans: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }
}
