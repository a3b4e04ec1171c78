/// Couple space: a private append-only feed shared by exactly two users.
/// The space id is the direct chat id of the pair, so posts stay attached
/// to the couple across renames.
use chrono::Utc;
use rusqlite::params;

use super::chats::direct_participants;
use super::models::SpacePost;
use super::{DbPool, StoreError, StoreResult};

/// Couple feed operations
pub struct SpaceStore;

impl SpaceStore {
    /// Append a post. The author must be one of the two participants
    /// encoded in the space id.
    pub async fn add_post(
        pool: &DbPool,
        space_id: &str,
        author: &str,
        body: &str,
        attachment: Option<&str>,
    ) -> StoreResult<SpacePost> {
        let (a, b) = direct_participants(space_id).ok_or(StoreError::NotAParticipant)?;
        if author != a && author != b {
            return Err(StoreError::NotAParticipant);
        }

        let conn = pool.lock().await;
        let timestamp = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO space_posts (space_id, author, body, attachment, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![space_id, author, body, attachment, &timestamp],
        )?;
        let post_id = conn.last_insert_rowid();

        let post = conn.query_row(
            "SELECT id, space_id, author, body, attachment, timestamp
             FROM space_posts WHERE id = ?1",
            params![post_id],
            |row| {
                Ok(SpacePost {
                    id: row.get(0)?,
                    space_id: row.get(1)?,
                    author: row.get(2)?,
                    body: row.get(3)?,
                    attachment: row.get(4)?,
                    timestamp: row.get(5)?,
                })
            },
        )?;

        Ok(post)
    }

    /// All posts of a space, oldest first
    pub async fn list_posts(pool: &DbPool, space_id: &str) -> StoreResult<Vec<SpacePost>> {
        let conn = pool.lock().await;

        let mut stmt = conn.prepare(
            "SELECT id, space_id, author, body, attachment, timestamp
             FROM space_posts WHERE space_id = ?1 ORDER BY timestamp ASC, id ASC",
        )?;
        let posts = stmt
            .query_map(params![space_id], |row| {
                Ok(SpacePost {
                    id: row.get(0)?,
                    space_id: row.get(1)?,
                    author: row.get(2)?,
                    body: row.get(3)?,
                    attachment: row.get(4)?,
                    timestamp: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }
}
