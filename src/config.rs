/// Configuration management for the chat server.
/// Handles command-line argument parsing and config structure.
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "Family Chat Server")]
#[command(about = "Backend for the family/friends chat application", long_about = None)]
pub struct Config {
    /// Server port (default: 4000)
    #[arg(long, default_value = "4000")]
    pub port: u16,

    /// SQLite database file path (default: familychat.db)
    #[arg(long, default_value = "familychat.db")]
    pub database: PathBuf,

    /// Directory for uploaded attachments (default: uploads)
    #[arg(long, default_value = "uploads")]
    pub uploads_dir: PathBuf,

    /// PID file path (optional) - write server PID to this file on startup
    #[arg(long)]
    pub pidfile: Option<PathBuf>,
}

impl Config {
    /// Parse command-line arguments into Config
    pub fn from_args() -> Self {
        Config::parse()
    }
}
