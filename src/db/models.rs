/// Data models for database operations.
/// Row structs for users, friendships, groups, messages and the couple
/// space feed, plus the request/response DTOs used by the REST handlers.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub profile_pic: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequest {
    pub sender: String,
    pub receiver: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub creator: String,
    pub profile_pic: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: i64,
    pub chat_id: String,
    pub sender: String,
    pub body: String,
    pub attachment: Option<String>,
    pub is_transferred: bool,
    pub timestamp: String,
    pub edited_timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnreadCount {
    pub username: String,
    pub chat_id: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatPrefs {
    pub theme: Option<String>,
    pub wallpaper: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacePost {
    pub id: i64,
    pub space_id: String,
    pub author: String,
    pub body: String,
    pub attachment: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub created_at: String,
}

// Request/Response DTOs
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RenameRequest {
    pub new_username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub status: Option<String>,
    pub description: Option<String>,
    pub profile_pic: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FriendRequestPayload {
    pub sender: String,
    pub receiver: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveFriendRequest {
    pub user: String,
    pub friend: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub chat_id: String,
    pub sender: String,
    pub body: String,
    pub attachment: Option<String>,
    #[serde(default)]
    pub is_transferred: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EditMessageRequest {
    pub sender: String,
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteMessageRequest {
    pub sender: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkReadRequest {
    pub username: String,
    pub chat_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetPrefRequest {
    pub username: String,
    pub chat_id: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub creator: String,
    pub members: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub profile_pic: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemberRequest {
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddPostRequest {
    pub author: String,
    pub body: String,
    pub attachment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    /// base64-encoded file content
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PushSubscribeRequest {
    pub username: String,
    pub endpoint: String,
    pub auth_key: String,
    pub p256dh_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PushUnsubscribeRequest {
    pub username: String,
    pub endpoint: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User {
            id: 1,
            username: "celine".to_string(),
            email: "celine@example.org".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            phone: None,
            status: Some("dispo".to_string()),
            profile_pic: None,
            description: None,
            created_at: "2025-10-20T10:00:00Z".to_string(),
        };

        let json = serde_json::to_string(&user).expect("Serialization failed");
        assert!(!json.contains("argon2id"));
        assert!(json.contains("celine"));
    }

    #[test]
    fn test_send_message_request_defaults_transferred() {
        let json = r#"{"chat_id":"anna-marc","sender":"anna","body":"salut"}"#;
        let req: SendMessageRequest = serde_json::from_str(json).expect("Deserialization failed");
        assert!(!req.is_transferred);
        assert!(req.attachment.is_none());
    }

    #[test]
    fn test_register_request_roundtrip() {
        let request = RegisterRequest {
            username: "marc".to_string(),
            email: "marc@example.org".to_string(),
            password: "motdepasse".to_string(),
            phone: Some("0601020304".to_string()),
        };

        let json = serde_json::to_string(&request).expect("Serialization failed");
        let deserialized: RegisterRequest =
            serde_json::from_str(&json).expect("Deserialization failed");

        assert_eq!(deserialized.username, "marc");
        assert_eq!(deserialized.phone.as_deref(), Some("0601020304"));
    }
}
