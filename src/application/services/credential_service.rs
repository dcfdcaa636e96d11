use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::application::errors::RunError;
use crate::domain::entities::{CredentialState, User};
use crate::domain::traits::{Marketplace, Session, Store};

/// Service deciding how each user gets a usable marketplace session
pub struct CredentialService<'a> {
    store: &'a dyn Store,
    marketplace: &'a dyn Marketplace,
    force_login: &'a HashSet<String>,
}

impl<'a> CredentialService<'a> {
    pub fn new(store: &'a dyn Store, marketplace: &'a dyn Marketplace, force_login: &'a HashSet<String>) -> Self {
        Self {
            store,
            marketplace,
            force_login,
        }
    }

    /// Returns `None` when the user has to be skipped for this run
    pub async fn ensure_session(&self, user: &User, now: DateTime<Utc>) -> Result<Option<Session>, RunError> {
        if self.force_login.contains(&user.email) || user.credentials == CredentialState::Absent {
            tracing::info!("User {} new login", user.email);

            let credentials = self.marketplace.login(&user.email).await?;
            self.store
                .update_user(
                    &user.email,
                    &credentials.user_id,
                    &CredentialState::Valid(credentials.clone()),
                )
                .await?;

            return Ok(Some(Session::issued(credentials, now)));
        }

        match &user.credentials {
            CredentialState::Valid(credentials) => Ok(Some(Session::stored(credentials.clone()))),
            _ => {
                tracing::info!("User {} new login needed using --login", user.email);
                Ok(None)
            }
        }
    }
}
