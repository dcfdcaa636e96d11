//! Immutable time context shared by every reconciliation pass of a run

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Default zone pickup windows are rendered in
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;

/// Clock snapshot taken once at run start.
///
/// `today` and `tomorrow` are local dates in `tz` and are never re-evaluated
/// while the run is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub now: DateTime<Tz>,
    pub today: NaiveDate,
    pub tomorrow: NaiveDate,
    pub tz: Tz,
}

impl RunContext {
    pub fn new(now: DateTime<Utc>, tz: Tz) -> Self {
        let now = now.with_timezone(&tz);
        let today = now.date_naive();
        Self {
            now,
            today,
            tomorrow: today.succ_opt().unwrap_or(today),
            tz,
        }
    }

    pub fn now_utc(&self) -> DateTime<Utc> {
        self.now.with_timezone(&Utc)
    }
}
