/// Group chat lifecycle: creation with membership in one transaction,
/// membership changes and the cascading cleanup when the last member
/// leaves.
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::models::Group;
use super::{DbPool, StoreError, StoreResult};

fn group_from_row(row: &Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        creator: row.get(2)?,
        profile_pic: row.get(3)?,
        description: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const GROUP_COLUMNS: &str = "id, name, creator, profile_pic, description, created_at";

/// Group chat operations
pub struct GroupStore;

impl GroupStore {
    /// Create a group and its membership rows in one transaction.
    /// The creator is always a member; duplicates in `members` are ignored.
    pub async fn create_group(
        pool: &DbPool,
        name: &str,
        creator: &str,
        members: &[String],
        description: Option<&str>,
    ) -> StoreResult<Group> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        let group_id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();

        tx.execute(
            "INSERT INTO groups (id, name, creator, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![&group_id, name, creator, description, &created_at],
        )?;

        tx.execute(
            "INSERT INTO group_members (group_id, username, joined_at) VALUES (?1, ?2, ?3)",
            params![&group_id, creator, &created_at],
        )?;
        for member in members {
            if member == creator {
                continue;
            }
            tx.execute(
                "INSERT OR IGNORE INTO group_members (group_id, username, joined_at)
                 VALUES (?1, ?2, ?3)",
                params![&group_id, member, &created_at],
            )?;
        }

        let group = tx.query_row(
            &format!("SELECT {} FROM groups WHERE id = ?1", GROUP_COLUMNS),
            params![&group_id],
            group_from_row,
        )?;

        tx.commit()?;
        Ok(group)
    }

    /// Get group by id
    pub async fn get_group(pool: &DbPool, group_id: &str) -> StoreResult<Option<Group>> {
        let conn = pool.lock().await;
        let group = conn
            .query_row(
                &format!("SELECT {} FROM groups WHERE id = ?1", GROUP_COLUMNS),
                params![group_id],
                group_from_row,
            )
            .optional()?;
        Ok(group)
    }

    /// All groups a user belongs to
    pub async fn groups_for_user(pool: &DbPool, username: &str) -> StoreResult<Vec<Group>> {
        let conn = pool.lock().await;
        let mut stmt = conn.prepare(
            "SELECT g.id, g.name, g.creator, g.profile_pic, g.description, g.created_at
             FROM groups g
             JOIN group_members m ON m.group_id = g.id
             WHERE m.username = ?1
             ORDER BY g.created_at ASC",
        )?;
        let groups = stmt
            .query_map(params![username], group_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(groups)
    }

    /// Member usernames of a group
    pub async fn members(pool: &DbPool, group_id: &str) -> StoreResult<Vec<String>> {
        let conn = pool.lock().await;
        let mut stmt = conn.prepare(
            "SELECT username FROM group_members WHERE group_id = ?1 ORDER BY joined_at ASC",
        )?;
        let members = stmt
            .query_map(params![group_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(members)
    }

    /// Update group metadata; None leaves the column untouched
    pub async fn update_group(
        pool: &DbPool,
        group_id: &str,
        name: Option<&str>,
        description: Option<&str>,
        profile_pic: Option<&str>,
    ) -> StoreResult<()> {
        let conn = pool.lock().await;
        let updated = conn.execute(
            "UPDATE groups SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                profile_pic = COALESCE(?4, profile_pic)
             WHERE id = ?1",
            params![group_id, name, description, profile_pic],
        )?;
        if updated == 0 {
            return Err(StoreError::GroupNotFound);
        }
        Ok(())
    }

    /// Add a member to an existing group
    pub async fn add_member(pool: &DbPool, group_id: &str, username: &str) -> StoreResult<()> {
        let conn = pool.lock().await;

        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM groups WHERE id = ?1",
            params![group_id],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(StoreError::GroupNotFound);
        }

        conn.execute(
            "INSERT OR IGNORE INTO group_members (group_id, username, joined_at)
             VALUES (?1, ?2, ?3)",
            params![group_id, username, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Remove a member; when the last member leaves, the group and every
    /// dependent row (messages, unread counters, prefs) are deleted in the
    /// same transaction so nothing is orphaned.
    pub async fn leave_group(pool: &DbPool, group_id: &str, username: &str) -> StoreResult<()> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        let removed = tx.execute(
            "DELETE FROM group_members WHERE group_id = ?1 AND username = ?2",
            params![group_id, username],
        )?;
        if removed == 0 {
            return Err(StoreError::NotAParticipant);
        }

        let remaining: i64 = tx.query_row(
            "SELECT COUNT(*) FROM group_members WHERE group_id = ?1",
            params![group_id],
            |row| row.get(0),
        )?;
        if remaining == 0 {
            tx.execute("DELETE FROM groups WHERE id = ?1", params![group_id])?;
            tx.execute("DELETE FROM messages WHERE chat_id = ?1", params![group_id])?;
            tx.execute(
                "DELETE FROM unread_counts WHERE chat_id = ?1",
                params![group_id],
            )?;
            tx.execute("DELETE FROM chat_prefs WHERE chat_id = ?1", params![group_id])?;
        } else {
            // The leaver's counter for this chat is no longer meaningful
            tx.execute(
                "DELETE FROM unread_counts WHERE username = ?1 AND chat_id = ?2",
                params![username, group_id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}
