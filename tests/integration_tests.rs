/// Integration tests for the chat data-access layer.
/// Exercises full workflows through the stores: accounts and friendships,
/// message fan-out, group lifecycle cleanup and rename propagation.
use family_chat_server::db::chats::{direct_chat_id, ChatStore};
use family_chat_server::db::friends::FriendStore;
use family_chat_server::db::groups::GroupStore;
use family_chat_server::db::space::SpaceStore;
use family_chat_server::db::users::UserStore;
use family_chat_server::db::{create_test_pool, DbPool};

async fn register(pool: &DbPool, name: &str) {
    UserStore::register(pool, name, &format!("{}@example.org", name), "motdepasse", None)
        .await
        .expect("Failed to register");
}

async fn befriend(pool: &DbPool, a: &str, b: &str) {
    FriendStore::send_request(pool, a, b)
        .await
        .expect("Failed to send request");
    FriendStore::accept_request(pool, a, b)
        .await
        .expect("Failed to accept request");
}

#[tokio::test]
async fn test_account_and_friendship_workflow() {
    let pool = create_test_pool();

    register(&pool, "anna").await;
    register(&pool, "marc").await;
    register(&pool, "julie").await;

    befriend(&pool, "anna", "marc").await;
    befriend(&pool, "julie", "anna").await;

    let friends = FriendStore::list_friends(&pool, "anna")
        .await
        .expect("Query failed");
    assert_eq!(friends, vec!["julie".to_string(), "marc".to_string()]);

    FriendStore::remove_friend(&pool, "anna", "julie")
        .await
        .expect("Remove failed");
    let friends = FriendStore::list_friends(&pool, "anna")
        .await
        .expect("Query failed");
    assert_eq!(friends, vec!["marc".to_string()]);
}

#[tokio::test]
async fn test_direct_chat_id_is_order_independent() {
    assert_eq!(direct_chat_id("anna", "marc"), direct_chat_id("marc", "anna"));
    assert_eq!(direct_chat_id("zoe", "albert"), "albert-zoe");
}

#[tokio::test]
async fn test_message_send_increments_every_other_participant_once() {
    let pool = create_test_pool();

    for name in ["anna", "marc", "julie", "tom"] {
        register(&pool, name).await;
    }
    let group = GroupStore::create_group(
        &pool,
        "Famille",
        "anna",
        &["marc".to_string(), "julie".to_string(), "tom".to_string()],
        None,
    )
    .await
    .expect("Create failed");

    ChatStore::send_message(&pool, &group.id, "anna", "bonjour", None, false)
        .await
        .expect("Send failed");

    for member in ["marc", "julie", "tom"] {
        let unread = ChatStore::unread_for_user(&pool, member)
            .await
            .expect("Query failed");
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].count, 1, "{} should have exactly one unread", member);
    }
    assert!(ChatStore::unread_for_user(&pool, "anna")
        .await
        .expect("Query failed")
        .is_empty());

    // A second message bumps the counters by exactly one again
    ChatStore::send_message(&pool, &group.id, "marc", "salut", None, false)
        .await
        .expect("Send failed");

    let anna = ChatStore::unread_for_user(&pool, "anna")
        .await
        .expect("Query failed");
    assert_eq!(anna[0].count, 1);
    let julie = ChatStore::unread_for_user(&pool, "julie")
        .await
        .expect("Query failed");
    assert_eq!(julie[0].count, 2);
}

#[tokio::test]
async fn test_last_member_leaving_deletes_group_and_orphans_nothing() {
    let pool = create_test_pool();

    register(&pool, "anna").await;
    register(&pool, "marc").await;
    let group = GroupStore::create_group(&pool, "Vacances", "anna", &["marc".to_string()], None)
        .await
        .expect("Create failed");

    ChatStore::send_message(&pool, &group.id, "anna", "on part quand ?", None, false)
        .await
        .expect("Send failed");
    ChatStore::send_message(&pool, &group.id, "marc", "samedi", None, false)
        .await
        .expect("Send failed");
    ChatStore::set_wallpaper(&pool, "anna", &group.id, "montagne.jpg")
        .await
        .expect("Set wallpaper failed");

    GroupStore::leave_group(&pool, &group.id, "marc")
        .await
        .expect("Leave failed");
    assert!(GroupStore::get_group(&pool, &group.id)
        .await
        .expect("Query failed")
        .is_some());

    GroupStore::leave_group(&pool, &group.id, "anna")
        .await
        .expect("Leave failed");
    assert!(GroupStore::get_group(&pool, &group.id)
        .await
        .expect("Query failed")
        .is_none());

    assert!(ChatStore::list_messages(&pool, &group.id, -1)
        .await
        .expect("Query failed")
        .is_empty());
    for user in ["anna", "marc"] {
        assert!(ChatStore::unread_for_user(&pool, user)
            .await
            .expect("Query failed")
            .is_empty());
    }
    let prefs = ChatStore::get_prefs(&pool, "anna", &group.id)
        .await
        .expect("Query failed");
    assert!(prefs.wallpaper.is_none());
}

#[tokio::test]
async fn test_rename_preserves_history_under_new_chat_id() {
    let pool = create_test_pool();

    register(&pool, "anna").await;
    register(&pool, "marc").await;
    befriend(&pool, "anna", "marc").await;

    let old_chat = direct_chat_id("anna", "marc");
    ChatStore::send_message(&pool, &old_chat, "anna", "premier message", None, false)
        .await
        .expect("Send failed");
    ChatStore::send_message(&pool, &old_chat, "marc", "deuxième message", None, false)
        .await
        .expect("Send failed");
    ChatStore::set_theme(&pool, "marc", &old_chat, "sombre")
        .await
        .expect("Set theme failed");
    SpaceStore::add_post(&pool, &old_chat, "anna", "notre espace", None)
        .await
        .expect("Post failed");

    UserStore::rename_user(&pool, "anna", "annabelle")
        .await
        .expect("Rename failed");

    let new_chat = direct_chat_id("annabelle", "marc");
    assert_ne!(old_chat, new_chat);

    // Full history under the new canonical id, sender references rewritten
    let messages = ChatStore::list_messages(&pool, &new_chat, -1)
        .await
        .expect("Query failed");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, "annabelle");
    assert_eq!(messages[1].sender, "marc");

    // Nothing remains under the old id
    assert!(ChatStore::list_messages(&pool, &old_chat, -1)
        .await
        .expect("Query failed")
        .is_empty());

    // Side tables follow
    let unread = ChatStore::unread_for_user(&pool, "marc")
        .await
        .expect("Query failed");
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].chat_id, new_chat);
    let prefs = ChatStore::get_prefs(&pool, "marc", &new_chat)
        .await
        .expect("Query failed");
    assert_eq!(prefs.theme.as_deref(), Some("sombre"));
    let posts = SpaceStore::list_posts(&pool, &new_chat)
        .await
        .expect("Query failed");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].author, "annabelle");

    // Friendship and account follow the new name
    assert!(FriendStore::are_friends(&pool, "annabelle", "marc")
        .await
        .expect("Query failed"));
    assert!(UserStore::get_user(&pool, "anna")
        .await
        .expect("Query failed")
        .is_none());
}

#[tokio::test]
async fn test_rename_propagates_into_groups_and_sessions() {
    let pool = create_test_pool();

    register(&pool, "anna").await;
    register(&pool, "marc").await;
    let group = GroupStore::create_group(&pool, "Famille", "anna", &["marc".to_string()], None)
        .await
        .expect("Create failed");
    let session = UserStore::authenticate(&pool, "anna", "motdepasse")
        .await
        .expect("Login failed");

    UserStore::rename_user(&pool, "anna", "annabelle")
        .await
        .expect("Rename failed");

    let renamed = GroupStore::get_group(&pool, &group.id)
        .await
        .expect("Query failed")
        .expect("Group missing");
    assert_eq!(renamed.creator, "annabelle");
    let members = GroupStore::members(&pool, &group.id)
        .await
        .expect("Query failed");
    assert!(members.contains(&"annabelle".to_string()));
    assert!(!members.contains(&"anna".to_string()));

    // Existing session survives under the new name
    let resolved = UserStore::session_user(&pool, &session.token)
        .await
        .expect("Query failed");
    assert_eq!(resolved.as_deref(), Some("annabelle"));
}

#[tokio::test]
async fn test_rename_failure_leaves_everything_untouched() {
    let pool = create_test_pool();

    register(&pool, "anna").await;
    register(&pool, "marc").await;
    befriend(&pool, "anna", "marc").await;

    let chat = direct_chat_id("anna", "marc");
    ChatStore::send_message(&pool, &chat, "anna", "coucou", None, false)
        .await
        .expect("Send failed");

    // Target name is taken, rename must fail before any mutation
    let result = UserStore::rename_user(&pool, "anna", "marc").await;
    assert!(result.is_err());

    let messages = ChatStore::list_messages(&pool, &chat, -1)
        .await
        .expect("Query failed");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender, "anna");
    assert!(UserStore::get_user(&pool, "anna")
        .await
        .expect("Query failed")
        .is_some());
}

#[tokio::test]
async fn test_direct_message_workflow_with_edit_and_delete() {
    let pool = create_test_pool();

    register(&pool, "anna").await;
    register(&pool, "marc").await;
    let chat = direct_chat_id("anna", "marc");

    let sent = ChatStore::send_message(&pool, &chat, "anna", "salu", None, false)
        .await
        .expect("Send failed");
    let edited = ChatStore::edit_message(&pool, sent.id, "anna", "salut")
        .await
        .expect("Edit failed");
    assert_eq!(edited.body, "salut");
    assert!(edited.edited_timestamp.is_some());

    ChatStore::mark_read(&pool, "marc", &chat)
        .await
        .expect("Mark read failed");
    assert!(ChatStore::unread_for_user(&pool, "marc")
        .await
        .expect("Query failed")
        .is_empty());

    ChatStore::delete_message(&pool, sent.id, "anna")
        .await
        .expect("Delete failed");
    assert!(ChatStore::list_messages(&pool, &chat, -1)
        .await
        .expect("Query failed")
        .is_empty());
}

#[tokio::test]
async fn test_couple_space_workflow() {
    let pool = create_test_pool();

    register(&pool, "anna").await;
    register(&pool, "marc").await;
    let space = direct_chat_id("anna", "marc");

    SpaceStore::add_post(&pool, &space, "anna", "premier souvenir", None)
        .await
        .expect("Post failed");
    SpaceStore::add_post(&pool, &space, "marc", "deuxième souvenir", Some("/uploads/photo.jpg"))
        .await
        .expect("Post failed");

    let posts = SpaceStore::list_posts(&pool, &space)
        .await
        .expect("Query failed");
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].body, "premier souvenir");

    // The couple space stays closed to outsiders
    let result = SpaceStore::add_post(&pool, &space, "julie", "intrusion", None).await;
    assert!(result.is_err());
}
