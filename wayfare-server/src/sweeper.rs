//! Idle-session sweeper.
//!
//! Sessions untouched for longer than `ttl_minutes` are evicted on every tick.
//! A session whose turn is in flight is never evicted.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::broadcast;
use wayfare_core::config::SessionConfig;
use wayfare_core::SessionStore;

pub async fn run_session_sweeper(
    sessions: Arc<dyn SessionStore>,
    config: SessionConfig,
    mut shutdown: broadcast::Receiver<()>,
) {
    let interval = tokio::time::Duration::from_secs(config.sweep_interval_seconds.max(1));
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    tracing::info!(
        "Session sweeper started (ttl: {}min, interval: {}s)",
        config.ttl_minutes,
        config.sweep_interval_seconds
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let evicted = sweep_once(sessions.as_ref(), &config).await;
                if evicted > 0 {
                    let remaining = sessions.len().await;
                    tracing::info!(evicted, remaining, "Evicted idle sessions");
                } else {
                    tracing::debug!("Session sweep: nothing to evict");
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("Session sweeper shutting down");
                break;
            }
        }
    }
}

pub async fn sweep_once(sessions: &dyn SessionStore, config: &SessionConfig) -> usize {
    let minutes = i64::try_from(config.ttl_minutes)
        .unwrap_or(i64::MAX)
        .min(i64::MAX / 60_000);
    let ttl = Duration::minutes(minutes);
    sessions.evict_idle(Utc::now(), ttl).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfare_core::InMemorySessionStore;

    #[tokio::test]
    async fn test_sweep_keeps_fresh_sessions() {
        let store = InMemorySessionStore::new();
        store.get_or_create(Some("a")).await;
        let config = SessionConfig::default();
        assert_eq!(sweep_once(&store, &config).await, 0);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_evicts_idle_sessions() {
        let store = InMemorySessionStore::new();
        store.get_or_create(Some("a")).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let config = SessionConfig {
            ttl_minutes: 0,
            sweep_interval_seconds: 1,
        };
        assert_eq!(sweep_once(&store, &config).await, 1);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_loop_stops_on_shutdown() {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(run_session_sweeper(store, SessionConfig::default(), rx));
        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
