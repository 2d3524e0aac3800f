mod daily_schedule;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

pub use daily_schedule::DailySchedule;

/// Date format used by the source table, e.g. "16.01.2026".
pub const SOURCE_DATE_FORMAT: &str = "%d.%m.%Y";

/// One failed egress path, in the order it was attempted.
#[derive(Debug, Clone)]
pub struct AttemptFailure {
    pub path: String,
    pub detail: String,
}

#[derive(Debug, Error)]
#[error("schedule source unreachable, {} path(s) failed", attempts.len())]
pub struct SourceUnreachable {
    pub attempts: Vec<AttemptFailure>,
}

/// Produces the current set of daily schedules from the published source.
/// Implemented by the connectivity resolver; stubbed out in tests.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn fetch_schedules(&self) -> Result<Vec<DailySchedule>, SourceUnreachable>;
}

/// Durable storage for daily schedules, keyed by the source date string.
/// The queue→hours mapping must round-trip exactly, including the
/// distinction between an absent queue and a queue with no outages.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn save_schedule(
        &self,
        date: &str,
        queue_hours: &BTreeMap<String, Vec<String>>,
    ) -> anyhow::Result<()>;

    async fn load_all_schedules(&self) -> anyhow::Result<Vec<DailySchedule>>;

    /// Timestamp of the most recent persisted write, used for staleness
    /// reporting after a restart.
    async fn latest_schedule_update(&self) -> anyhow::Result<Option<DateTime<Utc>>>;
}

/// Receives a single message per failed refresh cycle.
#[async_trait]
pub trait AdminAlertSink: Send + Sync {
    async fn notify(&self, message: &str) -> anyhow::Result<()>;
}
