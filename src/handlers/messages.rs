/// Message, unread-counter and chat-preference handlers.

use crate::db::chats::ChatStore;
use crate::db::models::{
    DeleteMessageRequest, EditMessageRequest, MarkReadRequest, SendMessageRequest, SetPrefRequest,
};
use crate::db::DbPool;
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde::Deserialize;
use serde_json::json;

use super::error_response;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

/// Send a message into a direct or group chat
/// POST /messages
pub async fn send_message(
    pool: web::Data<DbPool>,
    req: web::Json<SendMessageRequest>,
) -> ActixResult<HttpResponse> {
    match ChatStore::send_message(
        &pool,
        &req.chat_id,
        &req.sender,
        &req.body,
        req.attachment.as_deref(),
        req.is_transferred,
    )
    .await
    {
        Ok(message) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "message": "Message envoyé",
            "data": message
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Messages of a chat, oldest first
/// GET /chats/:chat_id/messages?limit=N
pub async fn list_messages(
    pool: web::Data<DbPool>,
    chat_id: web::Path<String>,
    params: web::Query<ListParams>,
) -> ActixResult<HttpResponse> {
    let limit = params.limit.unwrap_or(-1);
    match ChatStore::list_messages(&pool, &chat_id, limit).await {
        Ok(messages) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "messages": messages
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Edit a message body (original sender only)
/// POST /messages/:id/edit
pub async fn edit_message(
    pool: web::Data<DbPool>,
    message_id: web::Path<i64>,
    req: web::Json<EditMessageRequest>,
) -> ActixResult<HttpResponse> {
    match ChatStore::edit_message(&pool, *message_id, &req.sender, &req.body).await {
        Ok(message) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Message modifié",
            "data": message
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Delete a message (original sender only)
/// POST /messages/:id/delete
pub async fn delete_message(
    pool: web::Data<DbPool>,
    message_id: web::Path<i64>,
    req: web::Json<DeleteMessageRequest>,
) -> ActixResult<HttpResponse> {
    match ChatStore::delete_message(&pool, *message_id, &req.sender).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Message supprimé"
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Non-zero unread counters for a user
/// GET /unread/:username
pub async fn unread_counts(
    pool: web::Data<DbPool>,
    username: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match ChatStore::unread_for_user(&pool, &username).await {
        Ok(counts) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "unread": counts
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Reset a user's unread counter for one chat
/// POST /unread/read
pub async fn mark_read(
    pool: web::Data<DbPool>,
    req: web::Json<MarkReadRequest>,
) -> ActixResult<HttpResponse> {
    match ChatStore::mark_read(&pool, &req.username, &req.chat_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Conversation marquée comme lue"
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Set the chat theme for a user
/// POST /prefs/theme
pub async fn set_theme(
    pool: web::Data<DbPool>,
    req: web::Json<SetPrefRequest>,
) -> ActixResult<HttpResponse> {
    match ChatStore::set_theme(&pool, &req.username, &req.chat_id, &req.value).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Thème enregistré"
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Set the chat wallpaper for a user
/// POST /prefs/wallpaper
pub async fn set_wallpaper(
    pool: web::Data<DbPool>,
    req: web::Json<SetPrefRequest>,
) -> ActixResult<HttpResponse> {
    match ChatStore::set_wallpaper(&pool, &req.username, &req.chat_id, &req.value).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Fond d'écran enregistré"
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Display preferences of one chat for a user
/// GET /prefs/:username/:chat_id
pub async fn get_prefs(
    pool: web::Data<DbPool>,
    path: web::Path<(String, String)>,
) -> ActixResult<HttpResponse> {
    let (username, chat_id) = path.into_inner();
    match ChatStore::get_prefs(&pool, &username, &chat_id).await {
        Ok(prefs) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "prefs": prefs
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}
