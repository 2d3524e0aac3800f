use crate::repository::Repository;
use anyhow::Context;
use async_trait::async_trait;
use subscribers::contracts::{SubscriberPreference, SubscriberStore};

#[async_trait]
impl SubscriberStore for Repository {
    #[tracing::instrument(err, skip(self), level = "info")]
    async fn set_queue(&self, chat_id: i64, queue: &str) -> anyhow::Result<()> {
        sqlx::query(
            "
            INSERT INTO user_settings (chat_id, queue) VALUES ($1, $2)
            ON CONFLICT (chat_id)
            DO UPDATE SET queue = EXCLUDED.queue, updated_at = NOW()
            ",
        )
        .bind(chat_id)
        .bind(queue)
        .execute(self.pool())
        .await
        .context("Failed to set the subscriber queue")?;
        Ok(())
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    async fn queue_for(&self, chat_id: i64) -> anyhow::Result<Option<String>> {
        let record: Option<(Option<String>,)> =
            sqlx::query_as("SELECT queue FROM user_settings WHERE chat_id = $1")
                .bind(chat_id)
                .fetch_optional(self.pool())
                .await
                .context("Failed to fetch the subscriber queue")?;
        Ok(record.and_then(|(queue,)| queue))
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    async fn set_notifications_enabled(&self, chat_id: i64, enabled: bool) -> anyhow::Result<()> {
        sqlx::query(
            "
            INSERT INTO user_settings (chat_id, notifications_enabled) VALUES ($1, $2)
            ON CONFLICT (chat_id)
            DO UPDATE SET notifications_enabled = EXCLUDED.notifications_enabled,
                          updated_at = NOW()
            ",
        )
        .bind(chat_id)
        .bind(enabled)
        .execute(self.pool())
        .await
        .context("Failed to update the notification preference")?;
        Ok(())
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    async fn notifications_enabled(&self, chat_id: i64) -> anyhow::Result<bool> {
        let record: Option<(bool,)> =
            sqlx::query_as("SELECT notifications_enabled FROM user_settings WHERE chat_id = $1")
                .bind(chat_id)
                .fetch_optional(self.pool())
                .await
                .context("Failed to fetch the notification preference")?;
        Ok(record.map_or(false, |(enabled,)| enabled))
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    async fn subscribers_with_notifications(&self) -> anyhow::Result<Vec<SubscriberPreference>> {
        let records: Vec<(i64, Option<String>, bool)> = sqlx::query_as(
            "
            SELECT chat_id, queue, notifications_enabled
            FROM user_settings
            WHERE notifications_enabled = TRUE
            ",
        )
        .fetch_all(self.pool())
        .await
        .context("Failed to list subscribers with notifications")?;

        Ok(records
            .into_iter()
            .map(|(chat_id, queue, notifications_enabled)| SubscriberPreference {
                chat_id,
                queue,
                notifications_enabled,
            })
            .collect())
    }
}
