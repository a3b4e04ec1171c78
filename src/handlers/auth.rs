/// Account handlers: registration, login/logout, profile and rename.

use crate::db::models::{
    LoginRequest, LogoutRequest, RegisterRequest, RenameRequest, UpdateProfileRequest,
};
use crate::db::users::UserStore;
use crate::db::DbPool;
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde_json::json;

use super::error_response;

/// Register a new account
/// POST /auth/register
pub async fn register(
    pool: web::Data<DbPool>,
    req: web::Json<RegisterRequest>,
) -> ActixResult<HttpResponse> {
    match UserStore::register(
        &pool,
        &req.username,
        &req.email,
        &req.password,
        req.phone.as_deref(),
    )
    .await
    {
        Ok(user) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "message": "Compte créé avec succès",
            "user": user
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Open a session
/// POST /auth/login
pub async fn login(
    pool: web::Data<DbPool>,
    req: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    match UserStore::authenticate(&pool, &req.username, &req.password).await {
        Ok(session) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Connexion réussie",
            "token": session.token,
            "username": session.username
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Close a session
/// POST /auth/logout
pub async fn logout(
    pool: web::Data<DbPool>,
    req: web::Json<LogoutRequest>,
) -> ActixResult<HttpResponse> {
    match UserStore::logout(&pool, &req.token).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Déconnexion réussie"
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Get a user's public profile
/// GET /users/:username
pub async fn get_profile(
    pool: web::Data<DbPool>,
    username: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match UserStore::get_user(&pool, &username).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "user": user
        }))),
        Ok(None) => Ok(error_response(&crate::db::StoreError::UserNotFound)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Update profile fields
/// POST /users/:username/profile
pub async fn update_profile(
    pool: web::Data<DbPool>,
    username: web::Path<String>,
    req: web::Json<UpdateProfileRequest>,
) -> ActixResult<HttpResponse> {
    match UserStore::update_profile(
        &pool,
        &username,
        req.status.as_deref(),
        req.description.as_deref(),
        req.profile_pic.as_deref(),
        req.phone.as_deref(),
    )
    .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Profil mis à jour"
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Rename an account; propagates through chat ids and side tables
/// POST /users/:username/rename
pub async fn rename(
    pool: web::Data<DbPool>,
    username: web::Path<String>,
    req: web::Json<RenameRequest>,
) -> ActixResult<HttpResponse> {
    match UserStore::rename_user(&pool, &username, &req.new_username).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Nom d'utilisateur modifié",
            "username": req.new_username
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}
