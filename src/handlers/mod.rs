/// HTTP handlers module
/// One submodule per use-case family; every action returns a JSON result
/// object with a success flag and a user-facing French message.

pub mod auth;
pub mod friends;
pub mod groups;
pub mod messages;
pub mod space;
pub mod uploads;
pub mod push;

pub use auth::{get_profile, login, logout, register, rename, update_profile};
pub use friends::{
    accept_request, list_friends, pending_requests, reject_request, remove_friend, send_request,
};
pub use groups::{
    add_member, create_group, get_group, group_members, groups_for_user, leave_group, update_group,
};
pub use messages::{
    delete_message, edit_message, get_prefs, list_messages, mark_read, send_message, set_theme,
    set_wallpaper, unread_counts,
};
pub use push::{push_subscribe, push_unsubscribe};
pub use space::{add_post, list_posts};
pub use uploads::{download_file, upload_file, UploadConfig};

use crate::db::StoreError;
use actix_web::{HttpResponse, Result as ActixResult};
use serde_json::json;

/// Map a store failure onto a status code and a French result object
pub(crate) fn error_response(e: &StoreError) -> HttpResponse {
    let (mut builder, message) = match e {
        StoreError::DuplicateUsername => (
            HttpResponse::Conflict(),
            "Nom d'utilisateur déjà utilisé",
        ),
        StoreError::DuplicateEmail => (HttpResponse::Conflict(), "Adresse e-mail déjà utilisée"),
        StoreError::InvalidUsername => (
            HttpResponse::BadRequest(),
            "Nom d'utilisateur invalide (3 à 32 caractères : lettres, chiffres ou _)",
        ),
        StoreError::UserNotFound => (HttpResponse::NotFound(), "Utilisateur introuvable"),
        StoreError::InvalidCredentials => (
            HttpResponse::Unauthorized(),
            "Nom d'utilisateur ou mot de passe incorrect",
        ),
        StoreError::SessionNotFound => (HttpResponse::Unauthorized(), "Session expirée"),
        StoreError::RequestNotFound => (HttpResponse::NotFound(), "Demande d'ami introuvable"),
        StoreError::SelfRequest => (
            HttpResponse::BadRequest(),
            "Impossible de s'envoyer une demande d'ami à soi-même",
        ),
        StoreError::FriendshipNotFound => (
            HttpResponse::NotFound(),
            "Vous n'êtes pas amis avec cet utilisateur",
        ),
        StoreError::RequestAlreadySent => {
            (HttpResponse::Conflict(), "Demande d'ami déjà envoyée")
        }
        StoreError::AlreadyFriends => (HttpResponse::Conflict(), "Vous êtes déjà amis"),
        StoreError::GroupNotFound => (HttpResponse::NotFound(), "Groupe introuvable"),
        StoreError::NotAParticipant => (
            HttpResponse::Forbidden(),
            "Vous ne participez pas à cette conversation",
        ),
        StoreError::MessageNotFound => (HttpResponse::NotFound(), "Message introuvable"),
        StoreError::PasswordHash(_) | StoreError::Sqlite(_) | StoreError::Io(_) => {
            log::error!("Internal error: {}", e);
            (HttpResponse::InternalServerError(), "Erreur interne du serveur")
        }
    };

    builder.json(json!({
        "success": false,
        "message": message
    }))
}

/// Health check endpoint
/// GET /health
pub async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok"
    })))
}
