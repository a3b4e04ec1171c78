/// HTTP server factory and configuration.
/// Provides a reusable function to create and configure the HTTP server
/// for use in both the main binary and tests.

use crate::db::DbPool;
use crate::handlers::{self, UploadConfig};
use crate::push::{InMemoryPushStore, PushStore};
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;

/// Register every route; shared by the real server and the test server
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health
        .route("/health", web::get().to(handlers::health))
        // Accounts
        .route("/auth/register", web::post().to(handlers::register))
        .route("/auth/login", web::post().to(handlers::login))
        .route("/auth/logout", web::post().to(handlers::logout))
        .route("/users/{username}", web::get().to(handlers::get_profile))
        .route(
            "/users/{username}/profile",
            web::post().to(handlers::update_profile),
        )
        .route(
            "/users/{username}/rename",
            web::post().to(handlers::rename),
        )
        .route(
            "/users/{username}/groups",
            web::get().to(handlers::groups_for_user),
        )
        // Friends
        .route("/friends/requests", web::post().to(handlers::send_request))
        .route(
            "/friends/requests/accept",
            web::post().to(handlers::accept_request),
        )
        .route(
            "/friends/requests/reject",
            web::post().to(handlers::reject_request),
        )
        .route(
            "/friends/requests/{username}",
            web::get().to(handlers::pending_requests),
        )
        .route("/friends/remove", web::post().to(handlers::remove_friend))
        .route("/friends/{username}", web::get().to(handlers::list_friends))
        // Messages and unread counters
        .route("/messages", web::post().to(handlers::send_message))
        .route(
            "/messages/{id}/edit",
            web::post().to(handlers::edit_message),
        )
        .route(
            "/messages/{id}/delete",
            web::post().to(handlers::delete_message),
        )
        .route(
            "/chats/{chat_id}/messages",
            web::get().to(handlers::list_messages),
        )
        .route("/unread/read", web::post().to(handlers::mark_read))
        .route("/unread/{username}", web::get().to(handlers::unread_counts))
        // Chat display preferences
        .route("/prefs/theme", web::post().to(handlers::set_theme))
        .route("/prefs/wallpaper", web::post().to(handlers::set_wallpaper))
        .route(
            "/prefs/{username}/{chat_id}",
            web::get().to(handlers::get_prefs),
        )
        // Groups
        .route("/groups", web::post().to(handlers::create_group))
        .route("/groups/{id}", web::get().to(handlers::get_group))
        .route(
            "/groups/{id}/members",
            web::get().to(handlers::group_members),
        )
        .route("/groups/{id}/members", web::post().to(handlers::add_member))
        .route("/groups/{id}/update", web::post().to(handlers::update_group))
        .route("/groups/{id}/leave", web::post().to(handlers::leave_group))
        // Couple space
        .route("/space/{space_id}/posts", web::post().to(handlers::add_post))
        .route("/space/{space_id}/posts", web::get().to(handlers::list_posts))
        // Attachments
        .route("/uploads", web::post().to(handlers::upload_file))
        .route("/uploads/{name}", web::get().to(handlers::download_file))
        // Push subscriptions
        .route("/push/subscribe", web::post().to(handlers::push_subscribe))
        .route(
            "/push/unsubscribe",
            web::post().to(handlers::push_unsubscribe),
        );
}

/// Create a configured HTTP server
///
/// Takes the database pool, push-subscription store and upload config,
/// then returns a fully configured `HttpServer` ready to be run.
pub fn create_http_server(
    pool: web::Data<DbPool>,
    push_store: web::Data<dyn PushStore>,
    upload_config: web::Data<UploadConfig>,
    bind_addr: &str,
) -> std::io::Result<actix_web::dev::Server> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(push_store.clone())
            .app_data(upload_config.clone())
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}

/// Create a test HTTP server with an in-memory database.
/// Binds to a random available port; returns the server and its address.
pub fn create_test_http_server() -> std::io::Result<(actix_web::dev::Server, String)> {
    let pool = web::Data::new(crate::db::create_test_pool());
    let push_store: web::Data<dyn PushStore> =
        web::Data::from(Arc::new(InMemoryPushStore::new()) as Arc<dyn PushStore>);
    let upload_config = web::Data::new(UploadConfig {
        dir: std::env::temp_dir(),
    });

    let server = HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(push_store.clone())
            .app_data(upload_config.clone())
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind("127.0.0.1:0")?;

    let addrs = server.addrs();
    let addr_str = addrs
        .first()
        .ok_or_else(|| std::io::Error::other("No bind address found"))?
        .to_string();

    let server = server.run();

    Ok((server, addr_str))
}
