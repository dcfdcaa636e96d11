//! Domain entities - Core business objects with no external dependencies

pub mod user;
pub mod favorite;
pub mod snapshot;

pub use user::{User, Credentials, CredentialState, INVALID_TOKEN};
pub use favorite::FavoriteStore;
pub use snapshot::{StoreSnapshot, PickupInterval, DEFAULT_ITEM_NAME};
