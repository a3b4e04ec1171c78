/// Couple space handlers: the private two-person feed.

use crate::db::models::AddPostRequest;
use crate::db::space::SpaceStore;
use crate::db::DbPool;
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde_json::json;

use super::error_response;

/// Append a post to a couple space
/// POST /space/:space_id/posts
pub async fn add_post(
    pool: web::Data<DbPool>,
    space_id: web::Path<String>,
    req: web::Json<AddPostRequest>,
) -> ActixResult<HttpResponse> {
    match SpaceStore::add_post(
        &pool,
        &space_id,
        &req.author,
        &req.body,
        req.attachment.as_deref(),
    )
    .await
    {
        Ok(post) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "message": "Publication ajoutée",
            "post": post
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// All posts of a couple space, oldest first
/// GET /space/:space_id/posts
pub async fn list_posts(
    pool: web::Data<DbPool>,
    space_id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match SpaceStore::list_posts(&pool, &space_id).await {
        Ok(posts) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "posts": posts
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}
