//! Wires the schedule cache and the notification scheduler together and
//! keeps both periodic activities running until the process is stopped.

use anyhow::Context;
use async_trait::async_trait;
use notifications::contracts::Sender;
use notifications::scheduler::{NotificationScheduler, CHECK_PERIOD};
use scheduled_outages::cache::{ScheduleCache, REFRESH_PERIOD};
use scheduled_outages::connectivity::ConnectivityResolver;
use scheduled_outages::contracts::AdminAlertSink;
use sqlx_postgres::repository::Repository;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shared_kernel::tracing::config_telemetry();
    start().await
}

async fn start() -> anyhow::Result<()> {
    let repository = Repository::new().await?;
    repository.migrate().await?;

    let resolver = Arc::new(ConnectivityResolver::new()?);
    tracing::info!(
        proxies = resolver.proxy_count(),
        timeout_seconds = resolver.timeout_seconds(),
        "connectivity resolver configured"
    );
    let alert_sink: Option<Arc<dyn AdminAlertSink>> = resolver
        .notify_admin_on_failure()
        .then(|| Arc::new(LogAlertSink) as Arc<dyn AdminAlertSink>);

    let cache = Arc::new(ScheduleCache::new(
        resolver,
        Arc::new(repository.clone()),
        alert_sink,
    ));

    // Serve whatever the store has before touching the network, then try
    // to get fresh data once before the periodic refresh takes over.
    cache.hydrate().await;
    cache.refresh().await;

    let scheduler = Arc::new(NotificationScheduler::new(
        cache.clone(),
        Arc::new(repository),
        Arc::new(LogSender),
    ));

    let refresh_cache = cache.clone();
    let refresh_loop = async move {
        let mut interval = tokio::time::interval(REFRESH_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;
        loop {
            interval.tick().await;
            refresh_cache.refresh().await;
        }
    };

    let notification_loop = async move {
        let mut interval = tokio::time::interval(CHECK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;
        loop {
            interval.tick().await;
            scheduler.tick().await;
        }
    };

    tokio::select! {
        _ = refresh_loop => {}
        _ = notification_loop => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for the shutdown signal")?;
            tracing::info!("shutdown requested, stopping timers");
        }
    }

    Ok(())
}

/// Stand-in alert sink until the chat front-end plugs in a real one; a
/// failed refresh cycle still ends up in the logs.
struct LogAlertSink;

#[async_trait]
impl AdminAlertSink for LogAlertSink {
    async fn notify(&self, message: &str) -> anyhow::Result<()> {
        tracing::error!(alert = message, "schedule refresh failed on every path");
        Ok(())
    }
}

/// Stand-in sender; the chat front-end replaces this with real delivery.
struct LogSender;

#[async_trait]
impl Sender for LogSender {
    async fn send(&self, chat_id: i64, message: &str) -> anyhow::Result<()> {
        tracing::info!(chat_id, text = message, "outage warning ready for delivery");
        Ok(())
    }
}
