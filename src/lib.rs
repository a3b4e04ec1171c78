/// Family chat server library
/// Exposes the database layer, HTTP handlers and server factory for the
/// binary and the integration tests.

pub mod config;
pub mod db;
pub mod handlers;
pub mod push;
pub mod server;
