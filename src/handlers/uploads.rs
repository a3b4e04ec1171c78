/// Attachment upload and download.
/// Files arrive base64-encoded in JSON, land under the configured uploads
/// directory with a UUID prefix and are served back by URL path.

use crate::db::models::UploadRequest;
use actix_web::{web, HttpResponse, Result as ActixResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;
use std::path::PathBuf;
use uuid::Uuid;

/// Where attachment files are written; injected as app data
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
}

/// Drop anything that could escape the uploads directory or confuse a URL.
/// Dot runs are collapsed so the stored name never contains `..` and the
/// returned URL always passes the download handler's traversal check.
fn sanitize_filename(filename: &str) -> String {
    let mut cleaned = String::new();
    for c in filename.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '-') {
            cleaned.push(c);
        } else if c == '.' && !cleaned.ends_with('.') {
            cleaned.push(c);
        }
    }
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "fichier".to_string()
    } else {
        cleaned
    }
}

/// Store an attachment
/// POST /uploads
pub async fn upload_file(
    config: web::Data<UploadConfig>,
    req: web::Json<UploadRequest>,
) -> ActixResult<HttpResponse> {
    let bytes = match BASE64.decode(&req.data) {
        Ok(bytes) => bytes,
        Err(_) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "success": false,
                "message": "Contenu du fichier invalide"
            })))
        }
    };

    let stored_name = format!("{}-{}", Uuid::new_v4(), sanitize_filename(&req.filename));
    let path = config.dir.join(&stored_name);

    if let Err(e) = tokio::fs::write(&path, &bytes).await {
        log::error!("Failed to write upload {:?}: {}", path, e);
        return Ok(HttpResponse::InternalServerError().json(json!({
            "success": false,
            "message": "Erreur interne du serveur"
        })));
    }

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Fichier enregistré",
        "url": format!("/uploads/{}", stored_name)
    })))
}

/// Serve a stored attachment
/// GET /uploads/:name
pub async fn download_file(
    config: web::Data<UploadConfig>,
    name: web::Path<String>,
) -> ActixResult<HttpResponse> {
    // The route never matches slashes, but refuse traversal outright
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Ok(HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": "Nom de fichier invalide"
        })));
    }

    let path = config.dir.join(name.as_str());
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(HttpResponse::Ok()
            .content_type("application/octet-stream")
            .body(bytes)),
        Err(_) => Ok(HttpResponse::NotFound().json(json!({
            "success": false,
            "message": "Fichier introuvable"
        }))),
    }
}
