/// Family Chat Server - backend for the family/friends chat application
///
/// Main server entry point. Handles:
/// - Command-line argument parsing
/// - Database bootstrap (with corruption recovery)
/// - Uploads directory creation
/// - HTTP server startup
use actix_web::web;
use anyhow::Context;
use family_chat_server::config::Config;
use family_chat_server::handlers::UploadConfig;
use family_chat_server::push::{InMemoryPushStore, PushStore};
use family_chat_server::{db, server};
use std::fs;
use std::process;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let config = Config::from_args();

    log::info!("Starting Family Chat Server");
    log::info!("Database: {:?}", config.database);
    log::info!("Uploads: {:?}", config.uploads_dir);
    log::info!("Port: {}", config.port);

    // Write PID file if specified
    if let Some(pidfile) = &config.pidfile {
        let pid = process::id().to_string();
        fs::write(pidfile, pid).context("Failed to write PID file")?;
        log::info!("PID file written to: {:?}", pidfile);
    }

    fs::create_dir_all(&config.uploads_dir).context("Failed to create uploads directory")?;

    let db_path = config
        .database
        .to_str()
        .context("Database path is not valid UTF-8")?;
    let pool = db::create_pool(db_path).context("Failed to create database pool")?;

    log::info!("Database initialized");

    let pool_data = web::Data::new(pool);
    let push_store: web::Data<dyn PushStore> =
        web::Data::from(Arc::new(InMemoryPushStore::new()) as Arc<dyn PushStore>);
    let upload_config = web::Data::new(UploadConfig {
        dir: config.uploads_dir.clone(),
    });

    let bind_addr = format!("127.0.0.1:{}", config.port);
    log::info!("Starting HTTP server on {}", bind_addr);

    let http_server = server::create_http_server(pool_data, push_store, upload_config, &bind_addr)?;
    http_server.await?;

    Ok(())
}
