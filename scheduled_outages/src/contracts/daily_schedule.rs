use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use shared_kernel::queues::QUEUES;
use std::collections::BTreeMap;

use crate::contracts::SOURCE_DATE_FORMAT;

/// Month names in the genitive case, as the date is rendered to users.
const UKRAINIAN_MONTHS: [&str; 12] = [
    "січня",
    "лютого",
    "березня",
    "квітня",
    "травня",
    "червня",
    "липня",
    "серпня",
    "вересня",
    "жовтня",
    "листопада",
    "грудня",
];

/// Outage hours for every queue on a single day.
///
/// A queue absent from the mapping means the source has not published its
/// hours yet; a queue mapped to an empty list is a confirmed "no outage".
/// Hour lists are only ever replaced wholesale during a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySchedule {
    date: String,
    queue_hours: BTreeMap<String, Vec<String>>,
}

impl DailySchedule {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            queue_hours: BTreeMap::new(),
        }
    }

    pub fn from_parts(date: impl Into<String>, queue_hours: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            date: date.into(),
            queue_hours,
        }
    }

    /// Date in the source format "dd.mm.yyyy".
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Replaces the hour list for a queue.
    pub fn set_queue_hours(&mut self, queue: impl Into<String>, hours: Vec<String>) {
        self.queue_hours.insert(queue.into(), hours);
    }

    /// `None` means the hours are still pending, an empty slice means a
    /// confirmed day without outages for that queue.
    pub fn hours_for_queue(&self, queue: &str) -> Option<&[String]> {
        self.queue_hours.get(queue).map(Vec::as_slice)
    }

    pub fn queue_hours(&self) -> &BTreeMap<String, Vec<String>> {
        &self.queue_hours
    }

    pub fn has_data(&self) -> bool {
        !self.queue_hours.is_empty()
    }

    /// Date rendered for display, e.g. "16 січня 2026 р.". Falls back to
    /// the raw source string when it does not parse.
    pub fn formatted_date(&self) -> String {
        match NaiveDate::parse_from_str(&self.date, SOURCE_DATE_FORMAT) {
            Ok(date) => {
                let month = UKRAINIAN_MONTHS[date.month0() as usize];
                format!("{} {} {} р.", date.day(), month, date.year())
            }
            Err(_) => self.date.clone(),
        }
    }

    pub fn format_for_queue(&self, queue: &str) -> String {
        let mut out = format!("📅 {}\n🔌 Черга {}\n", self.date, queue);
        match self.hours_for_queue(queue) {
            None | Some([]) => out.push_str("⏳ Очікується"),
            Some(hours) => {
                out.push_str("⏰ Години відключень:\n");
                for hour in hours {
                    out.push_str(&format!("   • {hour}\n"));
                }
            }
        }
        out
    }

    /// Full-day view over every queue, with the user's own queue (when
    /// selected) surfaced at the top.
    pub fn format_all(&self, user_queue: Option<&str>) -> String {
        let mut out = format!("📅 *{}*\n\n", self.formatted_date());

        if !self.has_data() {
            out.push_str("⏳ _Графік очікується..._");
            return out;
        }

        if let Some(queue) = user_queue {
            if let Some(hours) = self.hours_for_queue(queue) {
                if !hours.is_empty() {
                    out.push_str(&format!("🔌 *Черга {queue}:*\n"));
                    out.push_str(&format!("⏰ *{}*\n", hours.join(", ")));
                    out.push_str("\n· · · · · · · · · · · · · · · · · · · · ·\n\n");
                }
            }
        }

        for queue in QUEUES {
            let hours = self.hours_for_queue(queue);
            let hours_str = match hours {
                None | Some([]) => "⏳ очікується".to_string(),
                Some(hours) => hours.join(", "),
            };
            let highlighted =
                user_queue == Some(queue) && hours.map_or(false, |hours| !hours.is_empty());
            if highlighted {
                out.push_str(&format!("*{queue}:* *{hours_str}*\n"));
            } else {
                out.push_str(&format!("*{queue}:* {hours_str}\n"));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::DailySchedule;

    #[test]
    fn pending_queue_is_distinct_from_confirmed_empty() {
        let mut schedule = DailySchedule::new("16.01.2026");
        schedule.set_queue_hours("1.2", vec![]);

        assert_eq!(schedule.hours_for_queue("1.1"), None);
        assert_eq!(schedule.hours_for_queue("1.2"), Some(&[][..]));
    }

    #[test]
    fn has_data_reflects_presence_of_any_queue() {
        let mut schedule = DailySchedule::new("16.01.2026");
        assert!(!schedule.has_data());

        schedule.set_queue_hours("1.1", vec!["08:00 - 12:00".to_string()]);
        assert!(schedule.has_data());
    }

    #[test]
    fn formatted_date_uses_ukrainian_month() {
        let schedule = DailySchedule::new("16.01.2026");
        assert_eq!(schedule.formatted_date(), "16 січня 2026 р.");
    }

    #[test]
    fn formatted_date_falls_back_to_raw_string() {
        let schedule = DailySchedule::new("not-a-date");
        assert_eq!(schedule.formatted_date(), "not-a-date");
    }

    #[test]
    fn format_all_marks_pending_day() {
        let schedule = DailySchedule::new("16.01.2026");
        let text = schedule.format_all(None);
        assert!(text.contains("Графік очікується"));
    }

    #[test]
    fn format_all_highlights_user_queue() {
        let mut schedule = DailySchedule::new("16.01.2026");
        schedule.set_queue_hours("2.1", vec!["08:00 - 12:00".to_string()]);

        let text = schedule.format_all(Some("2.1"));
        assert!(text.contains("*Черга 2.1:*"));
        assert!(text.contains("*2.1:* *08:00 - 12:00*"));
    }
}
