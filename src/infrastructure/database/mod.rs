use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::application::errors::StorageError;
use crate::domain::entities::{CredentialState, FavoriteStore, User};
use crate::domain::traits::Store;

/// SQLite-backed user and favorite store
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_tables()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    fn init_tables(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                email TEXT PRIMARY KEY NOT NULL,
                user_id TEXT,
                access_token TEXT,
                refresh_token TEXT,
                cookie TEXT,
                telegram_chat_id TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS favorite_stores (
                user_id TEXT NOT NULL,
                store_id INTEGER NOT NULL,
                item_id INTEGER NOT NULL,
                nb_item INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (user_id, store_id, item_id)
            )",
            [],
        )?;

        Ok(())
    }

    fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
        let email: String = row.get(0)?;
        let user_id: Option<String> = row.get(1)?;
        let credentials = CredentialState::from_columns(row.get(2)?, row.get(3)?, user_id.clone(), row.get(4)?);

        Ok(User {
            email,
            user_id,
            credentials,
            telegram_chat_id: row.get(5)?,
        })
    }

    pub fn get_user(&self, email: &str) -> Result<User, StorageError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT email, user_id, access_token, refresh_token, cookie, telegram_chat_id
             FROM users WHERE email = ?1",
            [email],
            Self::user_from_row,
        )
        .optional()?
        .ok_or_else(|| StorageError::NotFound(email.to_string()))
    }
}

#[async_trait]
impl Store for Database {
    async fn get_users(&self) -> Result<Vec<User>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT email, user_id, access_token, refresh_token, cookie, telegram_chat_id
             FROM users ORDER BY rowid",
        )?;

        let rows = stmt.query_map([], Self::user_from_row)?;

        let mut users = Vec::new();
        for user in rows {
            users.push(user?);
        }
        Ok(users)
    }

    async fn add_user(&self, email: &str, telegram_chat_id: Option<&str>) -> Result<(), StorageError> {
        self.conn()?.execute(
            "INSERT INTO users (email, telegram_chat_id) VALUES (?1, ?2)
             ON CONFLICT(email) DO UPDATE SET
                telegram_chat_id = COALESCE(excluded.telegram_chat_id, users.telegram_chat_id)",
            rusqlite::params![email, telegram_chat_id],
        )?;
        Ok(())
    }

    async fn update_user(&self, email: &str, user_id: &str, credentials: &CredentialState) -> Result<(), StorageError> {
        let (access_token, refresh_token, cookie) = credentials.to_columns();
        self.conn()?.execute(
            "INSERT INTO users (email, user_id, access_token, refresh_token, cookie)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(email) DO UPDATE SET
                user_id = excluded.user_id,
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                cookie = excluded.cookie",
            rusqlite::params![email, user_id, access_token, refresh_token, cookie],
        )?;
        Ok(())
    }

    async fn user_favorite_stores(&self, user_id: &str) -> Result<Vec<FavoriteStore>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, store_id, item_id, nb_item FROM favorite_stores WHERE user_id = ?1",
        )?;

        let rows = stmt.query_map([user_id], |row| {
            Ok(FavoriteStore {
                user_id: row.get(0)?,
                store_id: row.get(1)?,
                item_id: row.get(2)?,
                items_available: row.get(3)?,
            })
        })?;

        let mut favorites = Vec::new();
        for favorite in rows {
            favorites.push(favorite?);
        }
        Ok(favorites)
    }

    async fn update_create_favorite_store(
        &self,
        user_id: &str,
        store_id: i64,
        item_id: i64,
        items_available: u32,
    ) -> Result<(), StorageError> {
        self.conn()?.execute(
            "INSERT INTO favorite_stores (user_id, store_id, item_id, nb_item)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, store_id, item_id) DO UPDATE SET
                nb_item = excluded.nb_item,
                updated_at = datetime('now')",
            rusqlite::params![user_id, store_id, item_id, items_available],
        )?;
        Ok(())
    }
}
