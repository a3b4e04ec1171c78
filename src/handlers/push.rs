/// Push-subscription handlers; the registry is injected behind the
/// `PushStore` trait.

use crate::db::models::{PushSubscribeRequest, PushUnsubscribeRequest};
use crate::push::{PushStore, PushSubscription};
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde_json::json;

/// Register a browser push subscription
/// POST /push/subscribe
pub async fn push_subscribe(
    store: web::Data<dyn PushStore>,
    req: web::Json<PushSubscribeRequest>,
) -> ActixResult<HttpResponse> {
    store.subscribe(
        &req.username,
        PushSubscription {
            endpoint: req.endpoint.clone(),
            auth_key: req.auth_key.clone(),
            p256dh_key: req.p256dh_key.clone(),
        },
    );

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Notifications activées"
    })))
}

/// Remove a browser push subscription
/// POST /push/unsubscribe
pub async fn push_unsubscribe(
    store: web::Data<dyn PushStore>,
    req: web::Json<PushUnsubscribeRequest>,
) -> ActixResult<HttpResponse> {
    if store.unsubscribe(&req.username, &req.endpoint) {
        Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Notifications désactivées"
        })))
    } else {
        Ok(HttpResponse::NotFound().json(json!({
            "success": false,
            "message": "Abonnement introuvable"
        })))
    }
}
