/// User account storage: registration, authentication, sessions,
/// profile updates and the username-rename propagation transaction.
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::chats::{direct_chat_id, direct_participants};
use super::models::{Session, User};
use super::{DbPool, StoreError, StoreResult};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 32;

/// Usernames are restricted to [A-Za-z0-9_] so the `-` joiner in direct
/// chat ids stays unambiguous.
pub fn validate_username(username: &str) -> StoreResult<()> {
    let len = username.chars().count();
    if len < USERNAME_MIN_LEN || len > USERNAME_MAX_LEN {
        return Err(StoreError::InvalidUsername);
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::InvalidUsername);
    }
    Ok(())
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        phone: row.get(4)?,
        status: row.get(5)?,
        profile_pic: row.get(6)?,
        description: row.get(7)?,
        created_at: row.get(8)?,
    })
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, phone, status, profile_pic, description, created_at";

/// User account operations
pub struct UserStore;

impl UserStore {
    /// Register a new account with an argon2-hashed password
    pub async fn register(
        pool: &DbPool,
        username: &str,
        email: &str,
        password: &str,
        phone: Option<&str>,
    ) -> StoreResult<User> {
        validate_username(username)?;

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| StoreError::PasswordHash(e.to_string()))?
            .to_string();

        let conn = pool.lock().await;
        let created_at = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO users (username, email, password_hash, phone, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![username, email, &password_hash, phone, &created_at],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(_, Some(ref msg)) if msg.contains("users.username") => {
                StoreError::DuplicateUsername
            }
            rusqlite::Error::SqliteFailure(_, Some(ref msg)) if msg.contains("users.email") => {
                StoreError::DuplicateEmail
            }
            other => StoreError::Sqlite(other),
        })?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users WHERE username = ?1",
            USER_COLUMNS
        ))?;
        let user = stmt.query_row(params![username], user_from_row)?;

        Ok(user)
    }

    /// Get user by username
    pub async fn get_user(pool: &DbPool, username: &str) -> StoreResult<Option<User>> {
        let conn = pool.lock().await;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users WHERE username = ?1",
            USER_COLUMNS
        ))?;
        let user = stmt
            .query_row(params![username], user_from_row)
            .optional()?;

        Ok(user)
    }

    /// Verify credentials and open a persisted session
    pub async fn authenticate(
        pool: &DbPool,
        username: &str,
        password: &str,
    ) -> StoreResult<Session> {
        let conn = pool.lock().await;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users WHERE username = ?1",
            USER_COLUMNS
        ))?;
        let user = stmt
            .query_row(params![username], user_from_row)
            .optional()?
            .ok_or(StoreError::InvalidCredentials)?;

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| StoreError::PasswordHash(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| StoreError::InvalidCredentials)?;

        let session = Session {
            token: Uuid::new_v4().to_string(),
            username: user.username,
            created_at: Utc::now().to_rfc3339(),
        };
        conn.execute(
            "INSERT INTO sessions (token, username, created_at) VALUES (?1, ?2, ?3)",
            params![&session.token, &session.username, &session.created_at],
        )?;

        Ok(session)
    }

    /// Delete a session token
    pub async fn logout(pool: &DbPool, token: &str) -> StoreResult<()> {
        let conn = pool.lock().await;
        let deleted = conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        if deleted == 0 {
            return Err(StoreError::SessionNotFound);
        }
        Ok(())
    }

    /// Resolve a session token to its username
    pub async fn session_user(pool: &DbPool, token: &str) -> StoreResult<Option<String>> {
        let conn = pool.lock().await;
        let username = conn
            .query_row(
                "SELECT username FROM sessions WHERE token = ?1",
                params![token],
                |row| row.get(0),
            )
            .optional()?;
        Ok(username)
    }

    /// Update profile fields; None leaves the column untouched
    pub async fn update_profile(
        pool: &DbPool,
        username: &str,
        status: Option<&str>,
        description: Option<&str>,
        profile_pic: Option<&str>,
        phone: Option<&str>,
    ) -> StoreResult<()> {
        let conn = pool.lock().await;
        let updated = conn.execute(
            "UPDATE users SET
                status = COALESCE(?2, status),
                description = COALESCE(?3, description),
                profile_pic = COALESCE(?4, profile_pic),
                phone = COALESCE(?5, phone)
             WHERE username = ?1",
            params![username, status, description, profile_pic, phone],
        )?;
        if updated == 0 {
            return Err(StoreError::UserNotFound);
        }
        Ok(())
    }

    /// Rename an account and propagate the new name everywhere it appears.
    ///
    /// Direct chat ids embed both usernames, so every stored direct chat
    /// the user appears in gets a recomputed id and all rows keyed by the
    /// old id are rewritten, whether or not the counterparty is still a
    /// friend. Runs as one transaction; the duplicate/length checks happen
    /// before any mutation.
    pub async fn rename_user(pool: &DbPool, old: &str, new: &str) -> StoreResult<()> {
        validate_username(new)?;
        if old == new {
            return Ok(());
        }

        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        let taken: i64 = tx.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1",
            params![new],
            |row| row.get(0),
        )?;
        if taken > 0 {
            return Err(StoreError::DuplicateUsername);
        }
        let exists: i64 = tx.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1",
            params![old],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(StoreError::UserNotFound);
        }

        // Direct chats can outlive (or predate) a friendship, so the ids to
        // rewrite come from the data itself: every stored chat id that has
        // the old username as one of its two components.
        let chat_ids: Vec<String> = tx
            .prepare(
                "SELECT chat_id FROM messages
                 UNION SELECT chat_id FROM unread_counts
                 UNION SELECT chat_id FROM chat_prefs
                 UNION SELECT space_id FROM space_posts",
            )?
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        tx.execute(
            "UPDATE users SET username = ?2 WHERE username = ?1",
            params![old, new],
        )?;
        tx.execute(
            "UPDATE messages SET sender = ?2 WHERE sender = ?1",
            params![old, new],
        )?;
        tx.execute(
            "UPDATE friend_requests SET sender = ?2 WHERE sender = ?1",
            params![old, new],
        )?;
        tx.execute(
            "UPDATE friend_requests SET receiver = ?2 WHERE receiver = ?1",
            params![old, new],
        )?;
        tx.execute(
            "UPDATE friendships SET user_a = ?2 WHERE user_a = ?1",
            params![old, new],
        )?;
        tx.execute(
            "UPDATE friendships SET user_b = ?2 WHERE user_b = ?1",
            params![old, new],
        )?;
        tx.execute(
            "UPDATE groups SET creator = ?2 WHERE creator = ?1",
            params![old, new],
        )?;
        tx.execute(
            "UPDATE group_members SET username = ?2 WHERE username = ?1",
            params![old, new],
        )?;
        tx.execute(
            "UPDATE sessions SET username = ?2 WHERE username = ?1",
            params![old, new],
        )?;
        tx.execute(
            "UPDATE unread_counts SET username = ?2 WHERE username = ?1",
            params![old, new],
        )?;
        tx.execute(
            "UPDATE chat_prefs SET username = ?2 WHERE username = ?1",
            params![old, new],
        )?;
        tx.execute(
            "UPDATE space_posts SET author = ?2 WHERE author = ?1",
            params![old, new],
        )?;

        for old_id in &chat_ids {
            let other = match direct_participants(old_id) {
                Some((a, b)) if a == old => b,
                Some((a, b)) if b == old => a,
                _ => continue,
            };
            let new_id = direct_chat_id(new, other);
            tx.execute(
                "UPDATE messages SET chat_id = ?2 WHERE chat_id = ?1",
                params![old_id, &new_id],
            )?;
            tx.execute(
                "UPDATE unread_counts SET chat_id = ?2 WHERE chat_id = ?1",
                params![old_id, &new_id],
            )?;
            tx.execute(
                "UPDATE chat_prefs SET chat_id = ?2 WHERE chat_id = ?1",
                params![old_id, &new_id],
            )?;
            tx.execute(
                "UPDATE space_posts SET space_id = ?2 WHERE space_id = ?1",
                params![old_id, &new_id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}
