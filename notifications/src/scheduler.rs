//! Minute-by-minute evaluation of upcoming outages.
//!
//! Each tick walks every subscriber with notifications enabled and decides,
//! per outage range and lead time, whether a warning is due. A warning is
//! sent at most once per (subscriber, range, lead time, date); the dedup
//! set lives in memory and is pruned to today and tomorrow.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use scheduled_outages::cache::ScheduleCache;
use scheduled_outages::contracts::DailySchedule;
use scheduled_outages::hours::time_range_bounds;
use shared_kernel::date_time::kyiv_date_time::KyivTZDateTime;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use subscribers::contracts::SubscriberStore;

use crate::contracts::{outage_warning_message, Sender};

/// How often upcoming outages are evaluated.
pub const CHECK_PERIOD: Duration = Duration::from_secs(60);

/// Minutes before an outage start at which a warning fires.
const LEAD_MINUTES: [i64; 2] = [30, 5];

/// Window below each lead time; wider than the tick period so a late tick
/// cannot fall through it.
const WINDOW_MINUTES: i64 = 3;

/// Tomorrow's ranges are only interesting while they can still trigger a
/// warning tonight, i.e. outages starting before this hour.
const EARLY_MORNING_CUTOFF_HOUR: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SentNotificationKey {
    chat_id: i64,
    hour_range: String,
    lead_minutes: i64,
    outage_date: NaiveDate,
}

pub struct NotificationScheduler {
    cache: Arc<ScheduleCache>,
    subscribers: Arc<dyn SubscriberStore>,
    sender: Arc<dyn Sender>,
    sent: Mutex<HashSet<SentNotificationKey>>,
}

impl NotificationScheduler {
    pub fn new(
        cache: Arc<ScheduleCache>,
        subscribers: Arc<dyn SubscriberStore>,
        sender: Arc<dyn Sender>,
    ) -> Self {
        Self {
            cache,
            subscribers,
            sender,
            sent: Mutex::new(HashSet::new()),
        }
    }

    pub async fn tick(&self) {
        self.tick_at(KyivTZDateTime::now()).await;
    }

    #[tracing::instrument(skip_all)]
    pub(crate) async fn tick_at(&self, now: KyivTZDateTime) {
        let now = now.naive_local();
        let today = now.date();
        let tomorrow = today + chrono::Duration::days(1);

        self.prune_sent(today, tomorrow);

        let subscribers = match self.subscribers.subscribers_with_notifications().await {
            Ok(subscribers) => subscribers,
            Err(err) => {
                tracing::warn!(error = ?err, "failed to load subscribers, skipping tick");
                return;
            }
        };

        let today_schedule = self.cache.schedule_for_date(today);
        let tomorrow_schedule = self.cache.schedule_for_date(tomorrow);

        for preference in subscribers {
            let Some(queue) = preference.queue else {
                continue;
            };
            if !preference.notifications_enabled {
                continue;
            }

            for range in queue_ranges(&today_schedule, &queue) {
                self.consider(preference.chat_id, &queue, range, now, today)
                    .await;
            }

            // A warning for an outage starting just after midnight has to
            // fire the evening before, out of tomorrow's schedule.
            for range in queue_ranges(&tomorrow_schedule, &queue) {
                let Some(bounds) = time_range_bounds(range) else {
                    continue;
                };
                if bounds.from.hour() < EARLY_MORNING_CUTOFF_HOUR {
                    self.consider(preference.chat_id, &queue, range, now, tomorrow)
                        .await;
                }
            }
        }
    }

    async fn consider(
        &self,
        chat_id: i64,
        queue: &str,
        hour_range: &str,
        now: NaiveDateTime,
        outage_date: NaiveDate,
    ) {
        let Some(bounds) = time_range_bounds(hour_range) else {
            return;
        };

        // A midnight start that continues yesterday's outage is already in
        // progress, not an upcoming outage.
        if bounds.from == NaiveTime::MIN
            && self.is_continuation_of_previous_outage(queue, outage_date)
        {
            return;
        }

        let outage_at = NaiveDateTime::new(outage_date, bounds.from);
        if outage_at <= now {
            return;
        }
        let minutes_until = (outage_at - now).num_minutes();

        for lead_minutes in LEAD_MINUTES {
            if minutes_until <= lead_minutes && minutes_until > lead_minutes - WINDOW_MINUTES {
                let key = SentNotificationKey {
                    chat_id,
                    hour_range: hour_range.to_string(),
                    lead_minutes,
                    outage_date,
                };
                let first_time = self.sent.lock().expect("sent lock poisoned").insert(key);
                if !first_time {
                    continue;
                }

                tracing::info!(chat_id, lead_minutes, hour_range, %outage_date, "sending outage warning");
                let message = outage_warning_message(queue, hour_range, lead_minutes);
                if let Err(err) = self.sender.send(chat_id, &message).await {
                    // At-most-once: the key is already recorded, a dropped
                    // message is not retried.
                    tracing::warn!(chat_id, error = ?err, "failed to deliver outage warning");
                }
            }
        }
    }

    /// True when the queue's schedule for the day before `outage_date`
    /// contains a range ending exactly at midnight.
    pub(crate) fn is_continuation_of_previous_outage(
        &self,
        queue: &str,
        outage_date: NaiveDate,
    ) -> bool {
        let previous_day = outage_date - chrono::Duration::days(1);
        let previous_schedule = self.cache.schedule_for_date(previous_day);
        if !previous_schedule.has_data() {
            return false;
        }

        let Some(hours) = previous_schedule.hours_for_queue(queue) else {
            return false;
        };
        hours.iter().any(|range| {
            time_range_bounds(range).map_or(false, |bounds| bounds.to == NaiveTime::MIN)
        })
    }

    fn prune_sent(&self, today: NaiveDate, tomorrow: NaiveDate) {
        self.sent
            .lock()
            .expect("sent lock poisoned")
            .retain(|key| key.outage_date == today || key.outage_date == tomorrow);
    }

    #[cfg(test)]
    fn sent_len(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

fn queue_ranges<'a>(schedule: &'a DailySchedule, queue: &str) -> &'a [String] {
    if !schedule.has_data() {
        return &[];
    }
    schedule.hours_for_queue(queue).unwrap_or(&[])
}
