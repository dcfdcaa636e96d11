//! Reconciliation of fetched availability against stored favorites

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;

use crate::application::errors::RunError;
use crate::application::services::RunContext;
use crate::domain::entities::{FavoriteStore, StoreSnapshot, User};
use crate::domain::traits::{Notifier, Store};

/// Pickup timestamps carry whole minutes only
pub const PICKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:00Z";

/// Parse a UTC pickup timestamp and move it into the local zone
pub fn parse_pickup_timestamp(value: &str, tz: &Tz) -> Result<DateTime<Tz>, RunError> {
    let naive = NaiveDateTime::parse_from_str(value, PICKUP_TIMESTAMP_FORMAT).map_err(|_| {
        RunError::MalformedTimestamp {
            value: value.to_string(),
        }
    })?;
    Ok(naive.and_utc().with_timezone(tz))
}

/// Day label for a pickup window, `None` when it spans several days
pub fn day_label(from: &DateTime<Tz>, to: &DateTime<Tz>, context: &RunContext) -> Option<String> {
    let (from_day, to_day) = (from.date_naive(), to.date_naive());

    if from_day != to_day {
        None
    } else if from_day == context.today {
        Some("today".to_string())
    } else if from_day == context.tomorrow {
        Some("tomorrow".to_string())
    } else {
        Some(from.format("%d-%m-%Y").to_string())
    }
}

/// Human-readable message for a favorite that just became available
pub fn describe_availability(snapshot: &StoreSnapshot, context: &RunContext) -> Result<String, RunError> {
    let interval = snapshot
        .pickup_interval
        .as_ref()
        .ok_or(RunError::MissingPickupInterval {
            store_id: snapshot.store_id,
            item_id: snapshot.item_id,
        })?;

    let pickup_from = parse_pickup_timestamp(&interval.start, &context.tz)?;
    let pickup_latest = parse_pickup_timestamp(&interval.end, &context.tz)?;

    let text = match day_label(&pickup_from, &pickup_latest, context) {
        Some(day) => format!(
            "{} new {} at {} {}, pickup {} between {} and {}",
            snapshot.items_available,
            snapshot.item_name,
            snapshot.store_name,
            snapshot.branch,
            day,
            pickup_from.format("%H:%M"),
            pickup_latest.format("%H:%M"),
        ),
        None => format!(
            "{} new {} at {} {}, pickup between {} and {}",
            snapshot.items_available,
            snapshot.item_name,
            snapshot.store_name,
            snapshot.branch,
            pickup_from.format("%d-%m-%Y %H:%M"),
            pickup_latest.format("%d-%m-%Y %H:%M"),
        ),
    };

    Ok(text)
}

/// Send a notification, logging instead of failing when delivery breaks
pub(crate) async fn notify(notifier: &dyn Notifier, user: &User, text: &str) -> bool {
    match notifier.send_notification(user, text).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Failed to notify {} via {}: {}", user.email, notifier.name(), e);
            false
        }
    }
}

/// Diffs one user's snapshots against their stored favorites
pub struct ReconcileService<'a> {
    store: &'a dyn Store,
    notifier: &'a dyn Notifier,
    context: &'a RunContext,
}

impl<'a> ReconcileService<'a> {
    pub fn new(store: &'a dyn Store, notifier: &'a dyn Notifier, context: &'a RunContext) -> Self {
        Self {
            store,
            notifier,
            context,
        }
    }

    /// Notify newly available favorites and record every observed count.
    ///
    /// Returns the delivered notification texts in snapshot order.
    pub async fn reconcile(
        &self,
        user: &User,
        user_id: &str,
        snapshots: &[StoreSnapshot],
    ) -> Result<Vec<String>, RunError> {
        let mut favorites = self.store.user_favorite_stores(user_id).await?;
        let mut notifications = Vec::new();

        for snapshot in snapshots {
            if snapshot.items_available > 0 && is_newly_available(&favorites, snapshot) {
                let text = describe_availability(snapshot, self.context)?;
                tracing::info!("{}", text);
                if notify(self.notifier, user, &text).await {
                    notifications.push(text);
                }
            }

            self.store
                .update_create_favorite_store(
                    user_id,
                    snapshot.store_id,
                    snapshot.item_id,
                    snapshot.items_available,
                )
                .await?;
            remember(&mut favorites, user_id, snapshot);
        }

        Ok(notifications)
    }
}

fn is_newly_available(favorites: &[FavoriteStore], snapshot: &StoreSnapshot) -> bool {
    favorites
        .iter()
        .any(|f| f.matches(snapshot.store_id, snapshot.item_id) && f.is_empty())
}

// Keeps the in-pass view in line with what was just written.
fn remember(favorites: &mut Vec<FavoriteStore>, user_id: &str, snapshot: &StoreSnapshot) {
    match favorites
        .iter_mut()
        .find(|f| f.matches(snapshot.store_id, snapshot.item_id))
    {
        Some(favorite) => favorite.items_available = snapshot.items_available,
        None => favorites.push(FavoriteStore::new(
            user_id,
            snapshot.store_id,
            snapshot.item_id,
            snapshot.items_available,
        )),
    }
}
