use async_trait::async_trait;
use crate::application::errors::StorageError;
use crate::domain::entities::{CredentialState, FavoriteStore, User};

/// Store trait - abstraction for user and favorite persistence
#[async_trait]
pub trait Store: Send + Sync {
    // User operations
    async fn get_users(&self) -> Result<Vec<User>, StorageError>;
    async fn add_user(&self, email: &str, telegram_chat_id: Option<&str>) -> Result<(), StorageError>;
    /// Upsert by email
    async fn update_user(&self, email: &str, user_id: &str, credentials: &CredentialState) -> Result<(), StorageError>;

    // Favorite operations
    async fn user_favorite_stores(&self, user_id: &str) -> Result<Vec<FavoriteStore>, StorageError>;
    /// Upsert by (user_id, store_id, item_id)
    async fn update_create_favorite_store(
        &self,
        user_id: &str,
        store_id: i64,
        item_id: i64,
        items_available: u32,
    ) -> Result<(), StorageError>;
}
