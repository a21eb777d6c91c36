use rand::Rng;
use rusqlite::{params, OptionalExtension};

use crate::state::DbPool;
use crate::store::StoreError;

/// Server-side session records: the cookie only ever carries the opaque
/// token, so nothing client-visible needs signing.
pub trait SessionStore: Send + Sync {
    /// Create a new session for a user. Returns the session token.
    fn create(&self, user_id: &str, hours: u64) -> Result<String, StoreError>;

    /// Resolve a token to a uid. Expired sessions resolve to `None`.
    fn get(&self, token: &str) -> Result<Option<String>, StoreError>;

    /// Delete a session by token.
    fn delete(&self, token: &str) -> Result<(), StoreError>;
}

pub struct SqliteSessionStore {
    pool: DbPool,
}

impl SqliteSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SessionStore for SqliteSessionStore {
    fn create(&self, user_id: &str, hours: u64) -> Result<String, StoreError> {
        let conn = self.pool.get()?;

        let token = generate_token();
        let id = uuid::Uuid::now_v7().to_string();

        conn.execute(
            "INSERT INTO sessions (id, user_id, token, expires_at) \
             VALUES (?1, ?2, ?3, datetime('now', ?4))",
            params![id, user_id, token, format!("+{} hours", hours)],
        )?;

        Ok(token)
    }

    fn get(&self, token: &str) -> Result<Option<String>, StoreError> {
        let conn = self.pool.get()?;
        let uid = conn
            .query_row(
                "SELECT user_id FROM sessions \
                 WHERE token = ?1 AND expires_at > datetime('now')",
                params![token],
                |row| row.get(0),
            )
            .optional()?;
        Ok(uid)
    }

    fn delete(&self, token: &str) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(())
    }
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
