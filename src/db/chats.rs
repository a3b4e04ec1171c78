/// Message storage and chat consistency bookkeeping.
/// Covers canonical chat ids, the send/unread fan-out transaction,
/// message edit/delete, unread counters and per-chat display prefs.
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::models::{ChatPrefs, Message, UnreadCount};
use super::{DbPool, StoreError, StoreResult};

/// Canonical id for a direct conversation: the two usernames sorted and
/// joined with `-`, so both sides compute the same id.
pub fn direct_chat_id(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}-{}", a, b)
    } else {
        format!("{}-{}", b, a)
    }
}

/// Split a direct chat id back into its two participants
pub fn direct_participants(chat_id: &str) -> Option<(&str, &str)> {
    let (a, b) = chat_id.split_once('-')?;
    if a.is_empty() || b.is_empty() || b.contains('-') {
        return None;
    }
    Some((a, b))
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        sender: row.get(2)?,
        body: row.get(3)?,
        attachment: row.get(4)?,
        is_transferred: row.get::<_, i64>(5)? != 0,
        timestamp: row.get(6)?,
        edited_timestamp: row.get(7)?,
    })
}

const MESSAGE_COLUMNS: &str =
    "id, chat_id, sender, body, attachment, is_transferred, timestamp, edited_timestamp";

/// Message and unread-counter operations
pub struct ChatStore;

impl ChatStore {
    /// Store a message and bump every other participant's unread counter.
    ///
    /// Recipients are all other group members for a group chat, or the
    /// single other party for a direct chat. Insert and counter updates
    /// share one transaction so a message can never land without its
    /// unread bookkeeping.
    pub async fn send_message(
        pool: &DbPool,
        chat_id: &str,
        sender: &str,
        body: &str,
        attachment: Option<&str>,
        is_transferred: bool,
    ) -> StoreResult<Message> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        let is_group: bool = tx.query_row(
            "SELECT COUNT(*) FROM groups WHERE id = ?1",
            params![chat_id],
            |row| row.get::<_, i64>(0),
        )? > 0;

        let recipients: Vec<String> = if is_group {
            let members: Vec<String> = tx
                .prepare("SELECT username FROM group_members WHERE group_id = ?1")?
                .query_map(params![chat_id], |row| row.get(0))?
                .collect::<Result<Vec<_>, _>>()?;
            if !members.iter().any(|m| m == sender) {
                return Err(StoreError::NotAParticipant);
            }
            members.into_iter().filter(|m| m != sender).collect()
        } else {
            let (a, b) = direct_participants(chat_id).ok_or(StoreError::NotAParticipant)?;
            if sender == a {
                vec![b.to_string()]
            } else if sender == b {
                vec![a.to_string()]
            } else {
                return Err(StoreError::NotAParticipant);
            }
        };

        let timestamp = Utc::now().to_rfc3339();
        tx.execute(
            "INSERT INTO messages (chat_id, sender, body, attachment, is_transferred, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![chat_id, sender, body, attachment, is_transferred as i64, &timestamp],
        )?;
        let message_id = tx.last_insert_rowid();

        for recipient in &recipients {
            tx.execute(
                "INSERT INTO unread_counts (username, chat_id, count) VALUES (?1, ?2, 1)
                 ON CONFLICT(username, chat_id) DO UPDATE SET count = count + 1",
                params![recipient, chat_id],
            )?;
        }

        let message = tx.query_row(
            &format!("SELECT {} FROM messages WHERE id = ?1", MESSAGE_COLUMNS),
            params![message_id],
            message_from_row,
        )?;

        tx.commit()?;
        Ok(message)
    }

    /// Get messages for a chat, oldest first. `limit < 0` means no limit.
    pub async fn list_messages(
        pool: &DbPool,
        chat_id: &str,
        limit: i64,
    ) -> StoreResult<Vec<Message>> {
        let conn = pool.lock().await;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM messages WHERE chat_id = ?1 ORDER BY timestamp ASC, id ASC LIMIT ?2",
            MESSAGE_COLUMNS
        ))?;
        let messages = stmt
            .query_map(params![chat_id, limit], message_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    /// Rewrite a message body; only the original sender may edit
    pub async fn edit_message(
        pool: &DbPool,
        message_id: i64,
        sender: &str,
        body: &str,
    ) -> StoreResult<Message> {
        let conn = pool.lock().await;

        let owner: Option<String> = conn
            .query_row(
                "SELECT sender FROM messages WHERE id = ?1",
                params![message_id],
                |row| row.get(0),
            )
            .optional()?;
        match owner.as_deref() {
            None => return Err(StoreError::MessageNotFound),
            Some(s) if s != sender => return Err(StoreError::NotAParticipant),
            Some(_) => {}
        }

        let edited_at = Utc::now().to_rfc3339();
        conn.execute(
            "UPDATE messages SET body = ?2, edited_timestamp = ?3 WHERE id = ?1",
            params![message_id, body, &edited_at],
        )?;

        let message = conn.query_row(
            &format!("SELECT {} FROM messages WHERE id = ?1", MESSAGE_COLUMNS),
            params![message_id],
            message_from_row,
        )?;
        Ok(message)
    }

    /// Delete a message; only the original sender may delete
    pub async fn delete_message(pool: &DbPool, message_id: i64, sender: &str) -> StoreResult<()> {
        let conn = pool.lock().await;

        let owner: Option<String> = conn
            .query_row(
                "SELECT sender FROM messages WHERE id = ?1",
                params![message_id],
                |row| row.get(0),
            )
            .optional()?;
        match owner.as_deref() {
            None => return Err(StoreError::MessageNotFound),
            Some(s) if s != sender => return Err(StoreError::NotAParticipant),
            Some(_) => {}
        }

        conn.execute("DELETE FROM messages WHERE id = ?1", params![message_id])?;
        Ok(())
    }

    /// All non-zero unread counters for a user
    pub async fn unread_for_user(pool: &DbPool, username: &str) -> StoreResult<Vec<UnreadCount>> {
        let conn = pool.lock().await;

        let mut stmt = conn.prepare(
            "SELECT username, chat_id, count FROM unread_counts
             WHERE username = ?1 AND count > 0",
        )?;
        let counts = stmt
            .query_map(params![username], |row| {
                Ok(UnreadCount {
                    username: row.get(0)?,
                    chat_id: row.get(1)?,
                    count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    /// Reset a user's unread counter for one chat
    pub async fn mark_read(pool: &DbPool, username: &str, chat_id: &str) -> StoreResult<()> {
        let conn = pool.lock().await;
        conn.execute(
            "UPDATE unread_counts SET count = 0 WHERE username = ?1 AND chat_id = ?2",
            params![username, chat_id],
        )?;
        Ok(())
    }

    pub async fn set_theme(
        pool: &DbPool,
        username: &str,
        chat_id: &str,
        theme: &str,
    ) -> StoreResult<()> {
        let conn = pool.lock().await;
        conn.execute(
            "INSERT INTO chat_prefs (username, chat_id, theme) VALUES (?1, ?2, ?3)
             ON CONFLICT(username, chat_id) DO UPDATE SET theme = excluded.theme",
            params![username, chat_id, theme],
        )?;
        Ok(())
    }

    pub async fn set_wallpaper(
        pool: &DbPool,
        username: &str,
        chat_id: &str,
        wallpaper: &str,
    ) -> StoreResult<()> {
        let conn = pool.lock().await;
        conn.execute(
            "INSERT INTO chat_prefs (username, chat_id, wallpaper) VALUES (?1, ?2, ?3)
             ON CONFLICT(username, chat_id) DO UPDATE SET wallpaper = excluded.wallpaper",
            params![username, chat_id, wallpaper],
        )?;
        Ok(())
    }

    /// Display preferences for one chat; defaults when never set
    pub async fn get_prefs(
        pool: &DbPool,
        username: &str,
        chat_id: &str,
    ) -> StoreResult<ChatPrefs> {
        let conn = pool.lock().await;
        let prefs = conn
            .query_row(
                "SELECT theme, wallpaper FROM chat_prefs WHERE username = ?1 AND chat_id = ?2",
                params![username, chat_id],
                |row| {
                    Ok(ChatPrefs {
                        theme: row.get(0)?,
                        wallpaper: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(prefs.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::groups::GroupStore;

    #[test]
    fn test_direct_chat_id_is_order_independent() {
        assert_eq!(direct_chat_id("anna", "marc"), direct_chat_id("marc", "anna"));
        assert_eq!(direct_chat_id("anna", "marc"), "anna-marc");
    }

    #[test]
    fn test_direct_participants_roundtrip() {
        let id = direct_chat_id("marc", "anna");
        assert_eq!(direct_participants(&id), Some(("anna", "marc")));
        assert_eq!(direct_participants("pasdechat"), None);
    }

    #[tokio::test]
    async fn test_send_direct_message_increments_unread() {
        let pool = create_test_pool();
        let chat_id = direct_chat_id("anna", "marc");

        let message = ChatStore::send_message(&pool, &chat_id, "anna", "salut", None, false)
            .await
            .expect("Send failed");
        assert_eq!(message.chat_id, chat_id);
        assert_eq!(message.sender, "anna");

        let marc_unread = ChatStore::unread_for_user(&pool, "marc")
            .await
            .expect("Query failed");
        assert_eq!(marc_unread.len(), 1);
        assert_eq!(marc_unread[0].count, 1);

        // Sender's own counter is untouched
        let anna_unread = ChatStore::unread_for_user(&pool, "anna")
            .await
            .expect("Query failed");
        assert!(anna_unread.is_empty());
    }

    #[tokio::test]
    async fn test_unread_accumulates_and_resets() {
        let pool = create_test_pool();
        let chat_id = direct_chat_id("anna", "marc");

        for _ in 0..3 {
            ChatStore::send_message(&pool, &chat_id, "anna", "coucou", None, false)
                .await
                .expect("Send failed");
        }

        let unread = ChatStore::unread_for_user(&pool, "marc")
            .await
            .expect("Query failed");
        assert_eq!(unread[0].count, 3);

        ChatStore::mark_read(&pool, "marc", &chat_id)
            .await
            .expect("Mark read failed");
        let unread = ChatStore::unread_for_user(&pool, "marc")
            .await
            .expect("Query failed");
        assert!(unread.is_empty());
    }

    #[tokio::test]
    async fn test_send_rejects_outsider_in_direct_chat() {
        let pool = create_test_pool();
        let chat_id = direct_chat_id("anna", "marc");

        let result = ChatStore::send_message(&pool, &chat_id, "julie", "hello", None, false).await;
        assert!(matches!(result, Err(StoreError::NotAParticipant)));

        // Nothing was recorded
        let messages = ChatStore::list_messages(&pool, &chat_id, -1)
            .await
            .expect("Query failed");
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_group_send_fans_out_to_all_other_members() {
        let pool = create_test_pool();
        let group = GroupStore::create_group(
            &pool,
            "Famille",
            "anna",
            &["marc".to_string(), "julie".to_string()],
            None,
        )
        .await
        .expect("Create failed");

        ChatStore::send_message(&pool, &group.id, "anna", "bonjour tout le monde", None, false)
            .await
            .expect("Send failed");

        for member in ["marc", "julie"] {
            let unread = ChatStore::unread_for_user(&pool, member)
                .await
                .expect("Query failed");
            assert_eq!(unread.len(), 1, "{} should have one unread chat", member);
            assert_eq!(unread[0].count, 1);
            assert_eq!(unread[0].chat_id, group.id);
        }

        let anna_unread = ChatStore::unread_for_user(&pool, "anna")
            .await
            .expect("Query failed");
        assert!(anna_unread.is_empty());
    }

    #[tokio::test]
    async fn test_group_send_rejects_non_member() {
        let pool = create_test_pool();
        let group = GroupStore::create_group(&pool, "Famille", "anna", &["marc".to_string()], None)
            .await
            .expect("Create failed");

        let result = ChatStore::send_message(&pool, &group.id, "julie", "?", None, false).await;
        assert!(matches!(result, Err(StoreError::NotAParticipant)));
    }

    #[tokio::test]
    async fn test_edit_message_sets_edited_timestamp() {
        let pool = create_test_pool();
        let chat_id = direct_chat_id("anna", "marc");
        let message = ChatStore::send_message(&pool, &chat_id, "anna", "salut", None, false)
            .await
            .expect("Send failed");
        assert!(message.edited_timestamp.is_none());

        let edited = ChatStore::edit_message(&pool, message.id, "anna", "salut !")
            .await
            .expect("Edit failed");
        assert_eq!(edited.body, "salut !");
        assert!(edited.edited_timestamp.is_some());
    }

    #[tokio::test]
    async fn test_edit_rejects_other_sender() {
        let pool = create_test_pool();
        let chat_id = direct_chat_id("anna", "marc");
        let message = ChatStore::send_message(&pool, &chat_id, "anna", "salut", None, false)
            .await
            .expect("Send failed");

        let result = ChatStore::edit_message(&pool, message.id, "marc", "piraté").await;
        assert!(matches!(result, Err(StoreError::NotAParticipant)));
    }

    #[tokio::test]
    async fn test_delete_message() {
        let pool = create_test_pool();
        let chat_id = direct_chat_id("anna", "marc");
        let message = ChatStore::send_message(&pool, &chat_id, "anna", "oups", None, false)
            .await
            .expect("Send failed");

        ChatStore::delete_message(&pool, message.id, "anna")
            .await
            .expect("Delete failed");
        let messages = ChatStore::list_messages(&pool, &chat_id, -1)
            .await
            .expect("Query failed");
        assert!(messages.is_empty());

        let result = ChatStore::delete_message(&pool, message.id, "anna").await;
        assert!(matches!(result, Err(StoreError::MessageNotFound)));
    }

    #[tokio::test]
    async fn test_transferred_flag_persists() {
        let pool = create_test_pool();
        let chat_id = direct_chat_id("anna", "marc");
        let message = ChatStore::send_message(&pool, &chat_id, "anna", "fwd", None, true)
            .await
            .expect("Send failed");
        assert!(message.is_transferred);
    }

    #[tokio::test]
    async fn test_prefs_upsert_keeps_other_field() {
        let pool = create_test_pool();
        let chat_id = direct_chat_id("anna", "marc");

        ChatStore::set_theme(&pool, "anna", &chat_id, "sombre")
            .await
            .expect("Set theme failed");
        ChatStore::set_wallpaper(&pool, "anna", &chat_id, "plage.jpg")
            .await
            .expect("Set wallpaper failed");

        let prefs = ChatStore::get_prefs(&pool, "anna", &chat_id)
            .await
            .expect("Query failed");
        assert_eq!(prefs.theme.as_deref(), Some("sombre"));
        assert_eq!(prefs.wallpaper.as_deref(), Some("plage.jpg"));

        ChatStore::set_theme(&pool, "anna", &chat_id, "clair")
            .await
            .expect("Set theme failed");
        let prefs = ChatStore::get_prefs(&pool, "anna", &chat_id)
            .await
            .expect("Query failed");
        assert_eq!(prefs.theme.as_deref(), Some("clair"));
        assert_eq!(prefs.wallpaper.as_deref(), Some("plage.jpg"));
    }

    #[tokio::test]
    async fn test_prefs_default_when_unset() {
        let pool = create_test_pool();
        let prefs = ChatStore::get_prefs(&pool, "anna", "anna-marc")
            .await
            .expect("Query failed");
        assert!(prefs.theme.is_none());
        assert!(prefs.wallpaper.is_none());
    }
}
