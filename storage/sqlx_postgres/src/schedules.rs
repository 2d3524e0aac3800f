//! Persistence of daily schedules, one row per source date.
//!
//! The queue→hours mapping is stored as a JSON object so the
//! absent-vs-empty distinction survives the round trip: a pending queue is
//! simply missing from the object, a confirmed no-outage day is `[]`.

use crate::repository::Repository;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scheduled_outages::contracts::{DailySchedule, ScheduleStore};
use std::collections::BTreeMap;

#[async_trait]
impl ScheduleStore for Repository {
    #[tracing::instrument(err, skip(self, queue_hours), level = "info")]
    async fn save_schedule(
        &self,
        date: &str,
        queue_hours: &BTreeMap<String, Vec<String>>,
    ) -> anyhow::Result<()> {
        let payload = serde_json::to_string(queue_hours)
            .with_context(|| format!("Failed to serialize schedule for {date}"))?;

        sqlx::query(
            "
            INSERT INTO schedules (schedule_date, schedule_data, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (schedule_date)
            DO UPDATE SET schedule_data = EXCLUDED.schedule_data, updated_at = NOW()
            ",
        )
        .bind(date)
        .bind(payload)
        .execute(self.pool())
        .await
        .context("Failed to save schedule")?;

        Ok(())
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    async fn load_all_schedules(&self) -> anyhow::Result<Vec<DailySchedule>> {
        let records: Vec<(String, String)> =
            sqlx::query_as("SELECT schedule_date, schedule_data FROM schedules")
                .fetch_all(self.pool())
                .await
                .context("Failed to load schedules")?;

        let mut schedules = Vec::with_capacity(records.len());
        for (date, payload) in records {
            match serde_json::from_str::<BTreeMap<String, Vec<String>>>(&payload) {
                Ok(queue_hours) => schedules.push(DailySchedule::from_parts(date, queue_hours)),
                Err(err) => {
                    // One corrupt row must not take the whole snapshot down.
                    tracing::warn!(date, error = ?err, "skipping unreadable stored schedule");
                }
            }
        }
        Ok(schedules)
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    async fn latest_schedule_update(&self) -> anyhow::Result<Option<DateTime<Utc>>> {
        let (latest,): (Option<DateTime<Utc>>,) =
            sqlx::query_as("SELECT MAX(updated_at) FROM schedules")
                .fetch_one(self.pool())
                .await
                .context("Failed to read the schedules update timestamp")?;
        Ok(latest)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    #[test]
    fn stored_payload_round_trips_absent_vs_empty() {
        let mut queue_hours: BTreeMap<String, Vec<String>> = BTreeMap::new();
        queue_hours.insert(
            "1.1".to_string(),
            vec!["08:00 - 12:00".to_string(), "20:00 - 23:59".to_string()],
        );
        queue_hours.insert("1.2".to_string(), vec![]);
        // "2.1" is deliberately absent: still pending.

        let payload = serde_json::to_string(&queue_hours).unwrap();
        let restored: BTreeMap<String, Vec<String>> = serde_json::from_str(&payload).unwrap();

        assert_eq!(restored, queue_hours);
        assert_eq!(restored.get("1.2").map(Vec::len), Some(0));
        assert!(!restored.contains_key("2.1"));
    }
}
