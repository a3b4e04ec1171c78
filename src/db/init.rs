/// Database schema initialization.
/// Sets up SQLite WAL mode, creates tables on startup and applies
/// idempotent column additions for schemas created by older builds.
use rusqlite::{params, Connection, Result as SqliteResult};

/// Initialize database connection with WAL mode and schema
pub fn initialize_database(conn: &Connection) -> SqliteResult<()> {
    // Enable WAL mode (for file-based DB only, ignore error for in-memory)
    let _ = conn.execute("PRAGMA journal_mode = WAL", []);
    let _ = conn.execute("PRAGMA synchronous = NORMAL", []);
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    create_schema(conn)?;
    migrate_columns(conn)?;

    Ok(())
}

/// Create all database tables
fn create_schema(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            username TEXT UNIQUE NOT NULL,
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            phone TEXT,
            status TEXT,
            profile_pic TEXT,
            description TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS friend_requests (
            sender TEXT NOT NULL,
            receiver TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (sender, receiver)
        );

        CREATE TABLE IF NOT EXISTS friendships (
            user_a TEXT NOT NULL,
            user_b TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_a, user_b)
        );

        CREATE TABLE IF NOT EXISTS groups (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            creator TEXT NOT NULL,
            profile_pic TEXT,
            description TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS group_members (
            group_id TEXT NOT NULL,
            username TEXT NOT NULL,
            joined_at TEXT NOT NULL,
            PRIMARY KEY (group_id, username),
            FOREIGN KEY (group_id) REFERENCES groups(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY,
            chat_id TEXT NOT NULL,
            sender TEXT NOT NULL,
            body TEXT NOT NULL,
            attachment TEXT,
            is_transferred INTEGER NOT NULL DEFAULT 0,
            timestamp TEXT NOT NULL,
            edited_timestamp TEXT
        );

        CREATE TABLE IF NOT EXISTS unread_counts (
            username TEXT NOT NULL,
            chat_id TEXT NOT NULL,
            count INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (username, chat_id)
        );

        CREATE TABLE IF NOT EXISTS chat_prefs (
            username TEXT NOT NULL,
            chat_id TEXT NOT NULL,
            theme TEXT,
            wallpaper TEXT,
            PRIMARY KEY (username, chat_id)
        );

        CREATE TABLE IF NOT EXISTS space_posts (
            id INTEGER PRIMARY KEY,
            space_id TEXT NOT NULL,
            author TEXT NOT NULL,
            body TEXT NOT NULL,
            attachment TEXT,
            timestamp TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            username TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_chat ON messages(chat_id);
        CREATE INDEX IF NOT EXISTS idx_messages_sender ON messages(sender);
        CREATE INDEX IF NOT EXISTS idx_members_user ON group_members(username);
        CREATE INDEX IF NOT EXISTS idx_requests_receiver ON friend_requests(receiver);
        CREATE INDEX IF NOT EXISTS idx_space_posts_space ON space_posts(space_id);
        CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(username);
        "#,
    )?;

    Ok(())
}

/// Columns added after the initial release. Applied with ALTER TABLE only
/// when missing, so bootstrap stays idempotent across schema versions.
const COLUMN_MIGRATIONS: &[(&str, &str, &str)] = &[
    ("users", "phone", "TEXT"),
    ("users", "status", "TEXT"),
    ("users", "description", "TEXT"),
    ("groups", "description", "TEXT"),
    ("messages", "attachment", "TEXT"),
    ("messages", "is_transferred", "INTEGER NOT NULL DEFAULT 0"),
    ("messages", "edited_timestamp", "TEXT"),
];

fn migrate_columns(conn: &Connection) -> SqliteResult<()> {
    for (table, column, ty) in COLUMN_MIGRATIONS {
        if !column_exists(conn, table, column)? {
            conn.execute(
                &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, ty),
                [],
            )?;
            log::info!("Migrated: added column {}.{}", table, column);
        }
    }
    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> SqliteResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns.iter().any(|c| c == column))
}

/// Run PRAGMA integrity_check and report whether the file is healthy
pub fn integrity_ok(conn: &Connection) -> SqliteResult<bool> {
    let result: String = conn.query_row("PRAGMA integrity_check", params![], |row| row.get(0))?;
    Ok(result == "ok")
}
