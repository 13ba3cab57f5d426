use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension};

use super::models::{Session, UserId};
use super::{format_db_time, parse_db_time, Store, StoreResult};

impl Store {
    pub fn insert_session(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: NaiveDateTime,
    ) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
            params![token, user_id, format_db_time(&expires_at)],
        )?;
        Ok(())
    }

    pub fn session_by_token(&self, token: &str) -> StoreResult<Option<Session>> {
        let conn = self.conn()?;
        let session = conn
            .query_row(
                "SELECT token, user_id, expires_at FROM sessions WHERE token = ?1",
                params![token],
                |row| {
                    let raw: String = row.get(2)?;
                    let expires_at = parse_db_time(&raw).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
                    })?;
                    Ok(Session {
                        token: row.get(0)?,
                        user_id: row.get(1)?,
                        expires_at,
                    })
                },
            )
            .optional()?;
        Ok(session)
    }

    /// Returns whether a row was removed.
    pub fn delete_session(&self, token: &str) -> StoreResult<bool> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(rows > 0)
    }

    pub fn delete_sessions_for_user(&self, user_id: UserId) -> StoreResult<usize> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM sessions WHERE user_id = ?1", params![user_id])?;
        Ok(rows)
    }
}
