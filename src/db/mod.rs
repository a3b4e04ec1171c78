/// Database layer for persistent storage.
/// Holds the shared connection pool, the corruption-recovery bootstrap
/// and the error type shared by all stores.

pub mod chats;
pub mod friends;
pub mod groups;
pub mod init;
pub mod models;
pub mod space;
pub mod users;

use rusqlite::Connection;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

pub type DbPool = Arc<Mutex<Connection>>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("username already taken")]
    DuplicateUsername,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("invalid username")]
    InvalidUsername,

    #[error("user not found")]
    UserNotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("session not found")]
    SessionNotFound,

    #[error("friend request not found")]
    RequestNotFound,

    #[error("cannot send a friend request to yourself")]
    SelfRequest,

    #[error("users are not friends")]
    FriendshipNotFound,

    #[error("friend request already sent")]
    RequestAlreadySent,

    #[error("users are already friends")]
    AlreadyFriends,

    #[error("group not found")]
    GroupNotFound,

    #[error("not a member of this chat")]
    NotAParticipant,

    #[error("message not found")]
    MessageNotFound,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Open the database file, verify it and wrap it in the shared pool.
///
/// A file that fails to open or fails PRAGMA integrity_check is deleted
/// (with its WAL/SHM siblings) and recreated empty. Data loss is the
/// accepted recovery policy for a corrupted local file.
pub fn create_pool(db_path: &str) -> StoreResult<DbPool> {
    let conn = match open_verified(db_path) {
        Ok(conn) => conn,
        Err(e) => {
            log::warn!("Database at {} unusable ({}), recreating", db_path, e);
            remove_database_files(db_path)?;
            open_verified(db_path)?
        }
    };
    Ok(Arc::new(Mutex::new(conn)))
}

fn open_verified(db_path: &str) -> StoreResult<Connection> {
    let conn = Connection::open(db_path)?;
    if !init::integrity_ok(&conn)? {
        return Err(StoreError::Sqlite(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CORRUPT),
            Some("integrity_check failed".into()),
        )));
    }
    init::initialize_database(&conn)?;
    Ok(conn)
}

fn remove_database_files(db_path: &str) -> StoreResult<()> {
    for suffix in ["", "-wal", "-shm"] {
        let path = format!("{}{}", db_path, suffix);
        if Path::new(&path).exists() {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Create an in-memory database for testing
pub fn create_test_pool() -> DbPool {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory DB");
    init::initialize_database(&conn).expect("Failed to initialize DB");
    Arc::new(Mutex::new(conn))
}
