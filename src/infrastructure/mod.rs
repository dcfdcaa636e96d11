//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Database: SQLite persistence of users and favorites
//! - Tgtg: Marketplace API client
//! - Adapters: Notification channels (Telegram, console)
//! - Monitoring: Sentry error reporting

pub mod config;
pub mod database;
pub mod tgtg;
pub mod adapters;
pub mod monitoring;
