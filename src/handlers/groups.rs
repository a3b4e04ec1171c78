/// Group chat handlers: creation, metadata, membership and leaving.

use crate::db::groups::GroupStore;
use crate::db::models::{CreateGroupRequest, MemberRequest, UpdateGroupRequest};
use crate::db::DbPool;
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde_json::json;

use super::error_response;

/// Create a group with its initial members
/// POST /groups
pub async fn create_group(
    pool: web::Data<DbPool>,
    req: web::Json<CreateGroupRequest>,
) -> ActixResult<HttpResponse> {
    match GroupStore::create_group(
        &pool,
        &req.name,
        &req.creator,
        &req.members,
        req.description.as_deref(),
    )
    .await
    {
        Ok(group) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "message": "Groupe créé",
            "group": group
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Get group metadata
/// GET /groups/:id
pub async fn get_group(
    pool: web::Data<DbPool>,
    group_id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match GroupStore::get_group(&pool, &group_id).await {
        Ok(Some(group)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "group": group
        }))),
        Ok(None) => Ok(error_response(&crate::db::StoreError::GroupNotFound)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Groups a user belongs to
/// GET /users/:username/groups
pub async fn groups_for_user(
    pool: web::Data<DbPool>,
    username: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match GroupStore::groups_for_user(&pool, &username).await {
        Ok(groups) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "groups": groups
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Member list of a group
/// GET /groups/:id/members
pub async fn group_members(
    pool: web::Data<DbPool>,
    group_id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match GroupStore::members(&pool, &group_id).await {
        Ok(members) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "members": members
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Update group metadata
/// POST /groups/:id/update
pub async fn update_group(
    pool: web::Data<DbPool>,
    group_id: web::Path<String>,
    req: web::Json<UpdateGroupRequest>,
) -> ActixResult<HttpResponse> {
    match GroupStore::update_group(
        &pool,
        &group_id,
        req.name.as_deref(),
        req.description.as_deref(),
        req.profile_pic.as_deref(),
    )
    .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Groupe mis à jour"
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Add a member to a group
/// POST /groups/:id/members
pub async fn add_member(
    pool: web::Data<DbPool>,
    group_id: web::Path<String>,
    req: web::Json<MemberRequest>,
) -> ActixResult<HttpResponse> {
    match GroupStore::add_member(&pool, &group_id, &req.username).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Membre ajouté au groupe"
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Leave a group; the last member leaving deletes the group entirely
/// POST /groups/:id/leave
pub async fn leave_group(
    pool: web::Data<DbPool>,
    group_id: web::Path<String>,
    req: web::Json<MemberRequest>,
) -> ActixResult<HttpResponse> {
    match GroupStore::leave_group(&pool, &group_id, &req.username).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Vous avez quitté le groupe"
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}
