/// Friend request and friendship handlers.

use crate::db::friends::FriendStore;
use crate::db::models::{FriendRequestPayload, RemoveFriendRequest};
use crate::db::DbPool;
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde_json::json;

use super::error_response;

/// Send a friend request
/// POST /friends/requests
pub async fn send_request(
    pool: web::Data<DbPool>,
    req: web::Json<FriendRequestPayload>,
) -> ActixResult<HttpResponse> {
    match FriendStore::send_request(&pool, &req.sender, &req.receiver).await {
        Ok(()) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "message": "Demande d'ami envoyée"
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Accept a pending request
/// POST /friends/requests/accept
pub async fn accept_request(
    pool: web::Data<DbPool>,
    req: web::Json<FriendRequestPayload>,
) -> ActixResult<HttpResponse> {
    match FriendStore::accept_request(&pool, &req.sender, &req.receiver).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Demande d'ami acceptée"
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Reject a pending request
/// POST /friends/requests/reject
pub async fn reject_request(
    pool: web::Data<DbPool>,
    req: web::Json<FriendRequestPayload>,
) -> ActixResult<HttpResponse> {
    match FriendStore::reject_request(&pool, &req.sender, &req.receiver).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Demande d'ami refusée"
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Remove an existing friendship
/// POST /friends/remove
pub async fn remove_friend(
    pool: web::Data<DbPool>,
    req: web::Json<RemoveFriendRequest>,
) -> ActixResult<HttpResponse> {
    match FriendStore::remove_friend(&pool, &req.user, &req.friend).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Ami retiré"
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// List a user's friends
/// GET /friends/:username
pub async fn list_friends(
    pool: web::Data<DbPool>,
    username: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match FriendStore::list_friends(&pool, &username).await {
        Ok(friends) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "friends": friends
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// List pending requests addressed to a user
/// GET /friends/requests/:username
pub async fn pending_requests(
    pool: web::Data<DbPool>,
    username: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match FriendStore::pending_requests(&pool, &username).await {
        Ok(requests) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "requests": requests
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}
