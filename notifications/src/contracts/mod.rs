use async_trait::async_trait;

/// Delivers one message to one chat. Fire and forget from the scheduler's
/// perspective; retries and rate limiting are the implementation's concern.
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send(&self, chat_id: i64, message: &str) -> anyhow::Result<()>;
}

/// Warning text shown to subscribers. The short-lead variant is marked
/// urgent.
pub(crate) fn outage_warning_message(queue: &str, hour_range: &str, lead_minutes: i64) -> String {
    let (emoji, urgency) = if lead_minutes <= 5 {
        ("🚨", "ТЕРМІНОВО! ")
    } else {
        ("⚠️", "")
    };
    format!(
        "{emoji} *{urgency}Увага!*\n\n\
         Через *{lead_minutes} хвилин* можливе відключення електроенергії!\n\n\
         🔌 Черга: *{queue}*\n\
         ⏰ Час: *{hour_range}*\n\n\
         Підготуйтесь заздалегідь!"
    )
}

#[cfg(test)]
mod tests {
    use super::outage_warning_message;

    #[test]
    fn long_lead_is_a_plain_warning() {
        let message = outage_warning_message("1.1", "08:00 - 12:00", 30);
        assert!(message.contains("⚠️"));
        assert!(message.contains("Через *30 хвилин*"));
        assert!(message.contains("Черга: *1.1*"));
        assert!(message.contains("08:00 - 12:00"));
        assert!(!message.contains("ТЕРМІНОВО"));
    }

    #[test]
    fn short_lead_is_urgent() {
        let message = outage_warning_message("2.2", "08:00 - 12:00", 5);
        assert!(message.contains("🚨"));
        assert!(message.contains("ТЕРМІНОВО!"));
    }
}
