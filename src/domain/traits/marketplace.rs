use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::application::errors::ApiError;
use crate::domain::entities::{Credentials, StoreSnapshot};

/// Authenticated marketplace session for one user.
///
/// `refreshed_at` is `None` for credentials loaded from storage, so the first
/// call of the session refreshes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub credentials: Credentials,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Session for credentials that were just issued by a login
    pub fn issued(credentials: Credentials, at: DateTime<Utc>) -> Self {
        Self {
            credentials,
            refreshed_at: Some(at),
        }
    }

    /// Session for previously stored credentials, no network round-trip
    pub fn stored(credentials: Credentials) -> Self {
        Self {
            credentials,
            refreshed_at: None,
        }
    }

    pub fn needs_refresh(&self, now: DateTime<Utc>, lifetime: Duration) -> bool {
        match self.refreshed_at {
            Some(at) => now - at >= lifetime,
            None => true,
        }
    }
}

/// Marketplace trait - abstraction over the surplus-food API client
#[async_trait]
pub trait Marketplace: Send + Sync {
    /// Run the full login flow for an email address
    async fn login(&self, email: &str) -> Result<Credentials, ApiError>;

    /// Fetch availability of the session user's favorites.
    ///
    /// May refresh the session credentials in place.
    async fn get_items(&self, session: &mut Session) -> Result<Vec<StoreSnapshot>, ApiError>;
}
