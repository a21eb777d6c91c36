//! Post persistence behind a trait so handlers never touch SQL directly and
//! tests can wire up throwaway databases.

use rusqlite::{params, OptionalExtension, Row};

use crate::db::models::Post;
use crate::state::DbPool;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: String,
}

#[derive(Debug, Clone)]
pub struct PostPatch {
    pub title: String,
    pub content: String,
}

pub trait PostStore: Send + Sync {
    /// All posts, newest first by creation time.
    fn list_all(&self) -> Result<Vec<Post>, StoreError>;

    fn get(&self, id: &str) -> Result<Option<Post>, StoreError>;

    /// Persist a new post. The store assigns the id and the creation
    /// timestamp; both are immutable afterwards.
    fn create(&self, new: NewPost) -> Result<String, StoreError>;

    /// Update title and content. Refreshes `updated_at`; `created_at` and
    /// `author` are never touched.
    fn update(&self, id: &str, patch: PostPatch) -> Result<(), StoreError>;

    fn delete(&self, id: &str) -> Result<(), StoreError>;
}

pub struct SqlitePostStore {
    pool: DbPool,
}

impl SqlitePostStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode_post(row: &Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        author: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

impl PostStore for SqlitePostStore {
    fn list_all(&self) -> Result<Vec<Post>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, content, author, created_at, updated_at \
             FROM posts ORDER BY created_at DESC, rowid DESC",
        )?;
        let posts = stmt
            .query_map([], decode_post)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(posts)
    }

    fn get(&self, id: &str) -> Result<Option<Post>, StoreError> {
        let conn = self.pool.get()?;
        let post = conn
            .query_row(
                "SELECT id, title, content, author, created_at, updated_at \
                 FROM posts WHERE id = ?1",
                params![id],
                decode_post,
            )
            .optional()?;
        Ok(post)
    }

    fn create(&self, new: NewPost) -> Result<String, StoreError> {
        let conn = self.pool.get()?;
        let id = uuid::Uuid::now_v7().to_string();
        conn.execute(
            "INSERT INTO posts (id, title, content, author) VALUES (?1, ?2, ?3, ?4)",
            params![id, new.title, new.content, new.author],
        )?;
        Ok(id)
    }

    fn update(&self, id: &str, patch: PostPatch) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE posts SET title = ?1, content = ?2, \
             updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now') WHERE id = ?3",
            params![patch.title, patch.content, id],
        )?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn store() -> SqlitePostStore {
        SqlitePostStore::new(test_pool())
    }

    fn publish(store: &SqlitePostStore, title: &str, content: &str, author: &str) -> String {
        store
            .create(NewPost {
                title: title.into(),
                content: content.into(),
                author: author.into(),
            })
            .unwrap()
    }

    #[test]
    fn create_then_get_round_trips() {
        let store = store();
        let id = publish(&store, "Hi", "World", "a@x.com");

        let post = store.get(&id).unwrap().unwrap();
        assert_eq!(post.id, id);
        assert_eq!(post.title, "Hi");
        assert_eq!(post.content, "World");
        assert_eq!(post.author, "a@x.com");
        assert!(post.created_at.is_some());
        assert!(post.updated_at.is_none());
    }

    #[test]
    fn get_missing_is_none() {
        let store = store();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn list_is_newest_first() {
        let store = store();
        let first = publish(&store, "first", "a", "a@x.com");
        let second = publish(&store, "second", "b", "a@x.com");
        let third = publish(&store, "third", "c", "b@x.com");

        let ids: Vec<String> = store.list_all().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![third, second, first]);
    }

    #[test]
    fn update_changes_content_but_not_author_or_created_at() {
        let store = store();
        let id = publish(&store, "Hi", "World", "a@x.com");
        let before = store.get(&id).unwrap().unwrap();

        store
            .update(
                &id,
                PostPatch {
                    title: "Hi (edited)".into(),
                    content: "World, again".into(),
                },
            )
            .unwrap();

        let after = store.get(&id).unwrap().unwrap();
        assert_eq!(after.title, "Hi (edited)");
        assert_eq!(after.content, "World, again");
        assert_eq!(after.author, before.author);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at.is_some());
    }

    #[test]
    fn delete_removes_the_row() {
        let store = store();
        let id = publish(&store, "Hi", "World", "a@x.com");
        store.delete(&id).unwrap();
        assert!(store.get(&id).unwrap().is_none());
        assert!(store.list_all().unwrap().is_empty());
    }
}
