use rusqlite::{params, OptionalExtension, Row};

use super::models::{User, UserId};
use super::{unique_violation, Store, StoreError, StoreResult};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created: row.get(4)?,
    })
}

impl Store {
    /// Insert a user. Duplicate email or username is a `Conflict`.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<User> {
        let conn = self.conn()?;

        let inserted = conn.execute(
            "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)",
            params![username, email, password_hash],
        );
        if let Err(e) = inserted {
            return Err(match unique_violation(&e) {
                Some("users.email") => StoreError::Conflict("Email already registered".into()),
                Some("users.username") => StoreError::Conflict("Username already taken".into()),
                _ => e.into(),
            });
        }

        let id = conn.last_insert_rowid();
        let user = conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )?;
        Ok(user)
    }

    pub fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{test_store, StoreError};

    #[test]
    fn create_and_fetch_user() {
        let store = test_store();
        let user = store.create_user("alice", "a@x.com", "hash").unwrap();
        assert_eq!(user.username, "alice");
        assert!(!user.created.is_empty());

        let by_email = store.user_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        let by_id = store.user_by_id(user.id).unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");
        assert_eq!(by_id.password_hash, "hash");
    }

    #[test]
    fn missing_user_is_none() {
        let store = test_store();
        assert!(store.user_by_email("nobody@x.com").unwrap().is_none());
        assert!(store.user_by_id(42).unwrap().is_none());
    }

    #[test]
    fn duplicate_email_conflicts() {
        let store = test_store();
        store.create_user("alice", "a@x.com", "hash").unwrap();
        let err = store.create_user("bob", "a@x.com", "other").unwrap_err();
        match err {
            StoreError::Conflict(msg) => assert!(msg.contains("Email")),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_username_conflicts() {
        let store = test_store();
        store.create_user("alice", "a@x.com", "hash").unwrap();
        let err = store.create_user("alice", "b@x.com", "hash").unwrap_err();
        match err {
            StoreError::Conflict(msg) => assert!(msg.contains("Username")),
            other => panic!("expected conflict, got {other:?}"),
        }
    }
}
