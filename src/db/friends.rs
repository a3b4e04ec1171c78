/// Friend requests and symmetric friendships.
/// Accepting a request inserts both direction rows atomically; removing
/// a friendship deletes both in the same transaction.
use chrono::Utc;
use rusqlite::params;

use super::models::FriendRequest;
use super::{DbPool, StoreError, StoreResult};

/// Friendship operations
pub struct FriendStore;

impl FriendStore {
    /// Send a friend request. A pending request in the opposite direction
    /// is treated as mutual interest and accepted on the spot.
    pub async fn send_request(pool: &DbPool, sender: &str, receiver: &str) -> StoreResult<()> {
        if sender == receiver {
            return Err(StoreError::SelfRequest);
        }

        {
            let conn = pool.lock().await;

            let receiver_exists: i64 = conn.query_row(
                "SELECT COUNT(*) FROM users WHERE username = ?1",
                params![receiver],
                |row| row.get(0),
            )?;
            if receiver_exists == 0 {
                return Err(StoreError::UserNotFound);
            }

            if Self::are_friends_sync(&conn, sender, receiver)? {
                return Err(StoreError::AlreadyFriends);
            }

            let pending: i64 = conn.query_row(
                "SELECT COUNT(*) FROM friend_requests WHERE sender = ?1 AND receiver = ?2",
                params![sender, receiver],
                |row| row.get(0),
            )?;
            if pending > 0 {
                return Err(StoreError::RequestAlreadySent);
            }

            let reversed: i64 = conn.query_row(
                "SELECT COUNT(*) FROM friend_requests WHERE sender = ?1 AND receiver = ?2",
                params![receiver, sender],
                |row| row.get(0),
            )?;
            if reversed == 0 {
                conn.execute(
                    "INSERT INTO friend_requests (sender, receiver, created_at) VALUES (?1, ?2, ?3)",
                    params![sender, receiver, Utc::now().to_rfc3339()],
                )?;
                return Ok(());
            }
        }

        // Both sides asked: accept the existing reversed request
        Self::accept_request(pool, receiver, sender).await
    }

    /// Accept a pending request: delete it and insert both friendship
    /// rows in one transaction.
    pub async fn accept_request(pool: &DbPool, sender: &str, receiver: &str) -> StoreResult<()> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        let deleted = tx.execute(
            "DELETE FROM friend_requests WHERE sender = ?1 AND receiver = ?2",
            params![sender, receiver],
        )?;
        if deleted == 0 {
            return Err(StoreError::RequestNotFound);
        }

        let created_at = Utc::now().to_rfc3339();
        tx.execute(
            "INSERT OR IGNORE INTO friendships (user_a, user_b, created_at) VALUES (?1, ?2, ?3)",
            params![sender, receiver, &created_at],
        )?;
        tx.execute(
            "INSERT OR IGNORE INTO friendships (user_a, user_b, created_at) VALUES (?1, ?2, ?3)",
            params![receiver, sender, &created_at],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Reject a pending request
    pub async fn reject_request(pool: &DbPool, sender: &str, receiver: &str) -> StoreResult<()> {
        let conn = pool.lock().await;
        let deleted = conn.execute(
            "DELETE FROM friend_requests WHERE sender = ?1 AND receiver = ?2",
            params![sender, receiver],
        )?;
        if deleted == 0 {
            return Err(StoreError::RequestNotFound);
        }
        Ok(())
    }

    /// Remove a friendship, both direction rows at once
    pub async fn remove_friend(pool: &DbPool, a: &str, b: &str) -> StoreResult<()> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        let d1 = tx.execute(
            "DELETE FROM friendships WHERE user_a = ?1 AND user_b = ?2",
            params![a, b],
        )?;
        let d2 = tx.execute(
            "DELETE FROM friendships WHERE user_a = ?1 AND user_b = ?2",
            params![b, a],
        )?;
        if d1 == 0 && d2 == 0 {
            return Err(StoreError::FriendshipNotFound);
        }

        tx.commit()?;
        Ok(())
    }

    /// Friend usernames of a user
    pub async fn list_friends(pool: &DbPool, username: &str) -> StoreResult<Vec<String>> {
        let conn = pool.lock().await;
        let mut stmt = conn.prepare(
            "SELECT user_b FROM friendships WHERE user_a = ?1 ORDER BY user_b ASC",
        )?;
        let friends = stmt
            .query_map(params![username], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(friends)
    }

    /// Pending requests addressed to a user
    pub async fn pending_requests(
        pool: &DbPool,
        receiver: &str,
    ) -> StoreResult<Vec<FriendRequest>> {
        let conn = pool.lock().await;
        let mut stmt = conn.prepare(
            "SELECT sender, receiver, created_at FROM friend_requests
             WHERE receiver = ?1 ORDER BY created_at ASC",
        )?;
        let requests = stmt
            .query_map(params![receiver], |row| {
                Ok(FriendRequest {
                    sender: row.get(0)?,
                    receiver: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(requests)
    }

    pub async fn are_friends(pool: &DbPool, a: &str, b: &str) -> StoreResult<bool> {
        let conn = pool.lock().await;
        Self::are_friends_sync(&conn, a, b)
    }

    fn are_friends_sync(conn: &rusqlite::Connection, a: &str, b: &str) -> StoreResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM friendships WHERE user_a = ?1 AND user_b = ?2",
            params![a, b],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
