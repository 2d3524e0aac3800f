//! In-memory snapshot of every known daily schedule.
//!
//! The snapshot is replaced atomically by `refresh` and only by `refresh`;
//! a failed fetch never destroys the last good data. On startup the
//! snapshot is rehydrated from the store so the process serves data even
//! while the source is down.

use chrono::NaiveDate;
use itertools::Itertools;
use shared_kernel::date_time::kyiv_date_time::KyivTZDateTime;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::contracts::{
    AdminAlertSink, DailySchedule, ScheduleSource, ScheduleStore, SourceUnreachable,
    SOURCE_DATE_FORMAT,
};

/// How often the snapshot is refreshed from the source, independent of
/// whether the previous cycle succeeded.
pub const REFRESH_PERIOD: Duration = Duration::from_secs(30 * 60);

pub struct ScheduleCache {
    source: Arc<dyn ScheduleSource>,
    store: Arc<dyn ScheduleStore>,
    alert_sink: Option<Arc<dyn AdminAlertSink>>,
    snapshot: RwLock<Arc<Vec<DailySchedule>>>,
    last_update: RwLock<Option<KyivTZDateTime>>,
    last_fetch_failed: AtomicBool,
}

impl ScheduleCache {
    pub fn new(
        source: Arc<dyn ScheduleSource>,
        store: Arc<dyn ScheduleStore>,
        alert_sink: Option<Arc<dyn AdminAlertSink>>,
    ) -> Self {
        Self {
            source,
            store,
            alert_sink,
            snapshot: RwLock::new(Arc::new(Vec::new())),
            last_update: RwLock::new(None),
            last_fetch_failed: AtomicBool::new(false),
        }
    }

    /// Rebuilds the snapshot from durable storage. Runs once at startup,
    /// before the first network attempt. `last_update` is taken from the
    /// store's own write timestamp so staleness survives restarts.
    #[tracing::instrument(skip(self))]
    pub async fn hydrate(&self) {
        let stored = match self.store.load_all_schedules().await {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(error = ?err, "failed to load schedules from the store");
                return;
            }
        };
        if stored.is_empty() {
            tracing::info!("no schedules in the store");
            return;
        }

        let days = stored.len();
        *self.snapshot.write().expect("snapshot lock poisoned") = Arc::new(stored);
        match self.store.latest_schedule_update().await {
            Ok(Some(timestamp)) => {
                *self.last_update.write().expect("last_update lock poisoned") =
                    Some(timestamp.into());
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = ?err, "failed to read the store update timestamp");
            }
        }
        tracing::info!(days, "schedule snapshot rehydrated from the store");
    }

    /// The only mutator. On success the snapshot is swapped wholesale and
    /// persisted; on failure the previous snapshot and `last_update` stay
    /// untouched and the admin sink (when configured) is notified once.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) {
        match self.source.fetch_schedules().await {
            Ok(schedules) => {
                *self.snapshot.write().expect("snapshot lock poisoned") =
                    Arc::new(schedules.clone());
                *self.last_update.write().expect("last_update lock poisoned") =
                    Some(KyivTZDateTime::now());
                self.last_fetch_failed.store(false, Ordering::Relaxed);
                self.persist(&schedules).await;
                tracing::info!(days = schedules.len(), "schedule cache refreshed");
            }
            Err(err) => {
                self.last_fetch_failed.store(true, Ordering::Relaxed);
                tracing::warn!(
                    attempts = err.attempts.len(),
                    "all schedule fetch paths failed, keeping the current snapshot"
                );
                self.alert_admin(&err).await;
            }
        }
    }

    /// Out-of-cycle refresh for the admin command.
    pub async fn force_refresh(&self) {
        self.refresh().await;
    }

    async fn persist(&self, schedules: &[DailySchedule]) {
        for schedule in schedules {
            if let Err(err) = self
                .store
                .save_schedule(schedule.date(), schedule.queue_hours())
                .await
            {
                tracing::warn!(date = schedule.date(), error = ?err, "failed to persist schedule");
            }
        }
    }

    async fn alert_admin(&self, failure: &SourceUnreachable) {
        let Some(sink) = &self.alert_sink else {
            return;
        };
        let errors = failure
            .attempts
            .iter()
            .map(|attempt| format!("• {}: {}", attempt.path, attempt.detail))
            .join("\n");
        let message = format!(
            "⚠️ *Не вдалося оновити графіки*\n\nЧас: {}\n\n*Помилки:*\n{}\n\n_Дані з БД використовуються як резерв_",
            KyivTZDateTime::now().naive_local().format("%d.%m.%Y %H:%M"),
            errors
        );
        if let Err(err) = sink.notify(&message).await {
            tracing::warn!(error = ?err, "failed to notify the admin");
        }
    }

    /// Complete, consistent view of every known day. Cheap to clone.
    pub fn snapshot(&self) -> Arc<Vec<DailySchedule>> {
        self.snapshot
            .read()
            .expect("snapshot lock poisoned")
            .clone()
    }

    pub fn has_data(&self) -> bool {
        !self.snapshot().is_empty()
    }

    pub fn last_update(&self) -> Option<KyivTZDateTime> {
        self.last_update
            .read()
            .expect("last_update lock poisoned")
            .clone()
    }

    pub fn last_fetch_failed(&self) -> bool {
        self.last_fetch_failed.load(Ordering::Relaxed)
    }

    /// "Showing possibly-stale data": the last fetch failed but a previous
    /// snapshot is still being served. Distinct from "showing nothing".
    pub fn is_source_unavailable(&self) -> bool {
        self.last_fetch_failed() && self.has_data()
    }

    /// Never returns an absent value: a date missing from the snapshot
    /// comes back as a pending schedule carrying the requested date.
    pub fn schedule_for_date(&self, date: NaiveDate) -> DailySchedule {
        let date_str = date.format(SOURCE_DATE_FORMAT).to_string();
        self.snapshot()
            .iter()
            .find(|schedule| schedule.date() == date_str)
            .cloned()
            .unwrap_or_else(|| DailySchedule::new(date_str))
    }

    pub fn today_schedule(&self) -> DailySchedule {
        self.schedule_for_date(KyivTZDateTime::now().date())
    }

    pub fn tomorrow_schedule(&self) -> DailySchedule {
        self.schedule_for_date(KyivTZDateTime::now().date() + chrono::Duration::days(1))
    }
}
