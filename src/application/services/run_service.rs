//! One batch pass over every registered user

use std::collections::HashSet;
use std::sync::Arc;

use crate::application::errors::{ApiError, RunError};
use crate::application::services::reconcile_service::notify;
use crate::application::services::{CredentialService, ReconcileService, RunContext};
use crate::domain::entities::{CredentialState, User};
use crate::domain::traits::{Marketplace, Notifier, Session, Store};

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub users: usize,
    pub skipped: usize,
    pub notifications: usize,
}

/// Drives the login, fetch, reconcile and persist cycle for all users
pub struct RunService {
    store: Arc<dyn Store>,
    marketplace: Arc<dyn Marketplace>,
    notifier: Arc<dyn Notifier>,
    force_login: HashSet<String>,
}

impl RunService {
    pub fn new(store: Arc<dyn Store>, marketplace: Arc<dyn Marketplace>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            marketplace,
            notifier,
            force_login: HashSet::new(),
        }
    }

    pub fn with_force_login(mut self, emails: impl IntoIterator<Item = String>) -> Self {
        self.force_login.extend(emails);
        self
    }

    /// Process users in storage order; the first fatal error stops the run
    pub async fn run(&self, context: &RunContext) -> Result<RunSummary, RunError> {
        let users = self.store.get_users().await?;
        let mut summary = RunSummary::default();

        tracing::info!("Processing {} users", users.len());

        for user in &users {
            summary.users += 1;
            match self.process_user(user, context).await? {
                Some(sent) => summary.notifications += sent,
                None => summary.skipped += 1,
            }
        }

        Ok(summary)
    }

    /// Returns the number of delivered notifications, or `None` if the user was skipped
    async fn process_user(&self, user: &User, context: &RunContext) -> Result<Option<usize>, RunError> {
        let credentials = CredentialService::new(self.store.as_ref(), self.marketplace.as_ref(), &self.force_login);
        let Some(mut session) = credentials.ensure_session(user, context.now_utc()).await? else {
            return Ok(None);
        };

        tracing::info!("User {}", user.email);

        let before = session.credentials.clone();
        let fetched = self.marketplace.get_items(&mut session).await;

        // Rotated tokens are stored before the fetch result is looked at
        if session.credentials != before {
            tracing::debug!("Storing refreshed credentials for user {}", user.email);
            self.store
                .update_user(
                    &user.email,
                    &session.credentials.user_id,
                    &CredentialState::Valid(session.credentials.clone()),
                )
                .await?;
        }

        let snapshots = match fetched {
            Ok(snapshots) => snapshots,
            Err(e) => return Err(self.fetch_failed(user, &session, e).await),
        };

        let user_id = session.credentials.user_id.as_str();
        let sent = ReconcileService::new(self.store.as_ref(), self.notifier.as_ref(), context)
            .reconcile(user, user_id, &snapshots)
            .await?;

        Ok(Some(sent.len()))
    }

    /// Invalidate rejected credentials, then hand the error back to abort the run
    async fn fetch_failed(&self, user: &User, session: &Session, error: ApiError) -> RunError {
        tracing::error!("Fetching items for user {} resulted in API error: {}", user.email, error);

        if error.is_unauthorized() {
            let text = format!("clearing credentials for user {}", user.email);
            tracing::info!("{}", text);
            notify(self.notifier.as_ref(), user, &text).await;

            if let Err(e) = self
                .store
                .update_user(&user.email, &session.credentials.user_id, &CredentialState::Invalid)
                .await
            {
                tracing::error!("Failed to invalidate credentials for user {}: {}", user.email, e);
                return e.into();
            }
        }

        error.into()
    }
}
