use anyhow::bail;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_kernel::queues::is_known_queue;

/// What a subscriber has configured: the queue they belong to (unset until
/// they pick one) and whether outage warnings are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberPreference {
    pub chat_id: i64,
    pub queue: Option<String>,
    pub notifications_enabled: bool,
}

/// Rejects queue identifiers outside the deployment's fixed set before
/// they reach the store.
pub fn validate_queue(queue: &str) -> anyhow::Result<()> {
    if !is_known_queue(queue) {
        bail!("unknown queue: {queue}");
    }
    Ok(())
}

/// Durable subscriber preferences. The chat front-end writes through the
/// same trait the notification scheduler reads from.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    async fn set_queue(&self, chat_id: i64, queue: &str) -> anyhow::Result<()>;

    async fn queue_for(&self, chat_id: i64) -> anyhow::Result<Option<String>>;

    async fn set_notifications_enabled(&self, chat_id: i64, enabled: bool) -> anyhow::Result<()>;

    async fn notifications_enabled(&self, chat_id: i64) -> anyhow::Result<bool>;

    /// Everyone with warnings switched on, queue included so the caller
    /// does not fan out one query per subscriber each minute.
    async fn subscribers_with_notifications(&self) -> anyhow::Result<Vec<SubscriberPreference>>;
}

#[cfg(test)]
mod tests {
    use super::validate_queue;

    #[test]
    fn accepts_known_queues() {
        assert!(validate_queue("1.1").is_ok());
        assert!(validate_queue("6.2").is_ok());
    }

    #[test]
    fn rejects_unknown_queues() {
        assert!(validate_queue("9.9").is_err());
        assert!(validate_queue("").is_err());
    }
}
