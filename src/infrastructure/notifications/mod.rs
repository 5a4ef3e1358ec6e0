//! # Notifications
//!
//! Fire-and-forget reporting of startup and cycle results.
//!
//! A notifier never fails a cycle: delivery errors are logged and dropped.

use crate::domain::entities::SweepCycleResult;
use crate::domain::value_objects::{Network, Wei};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod event_log;
pub mod telegram;

pub use event_log::EventLogNotifier;
pub use telegram::TelegramNotifier;

/// What the sweeper announces when it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupSummary {
    /// Address being swept.
    pub deposit_address: String,
    /// Address receiving every transfer.
    pub vault_address: String,
    /// Networks in sweep order.
    pub networks: Vec<Network>,
    /// Minimum transfer amount.
    pub min_transfer: Wei,
    /// Interval between cycles, in milliseconds.
    pub interval_ms: u64,
    /// Whether transfers are only computed.
    pub dry_run: bool,
}

/// Receives sweeper lifecycle events.
#[async_trait]
pub trait SweepNotifier: Send + Sync + std::fmt::Debug {
    /// Called once after configuration is validated.
    async fn notify_startup(&self, _summary: &StartupSummary) {}

    /// Called once when the process is stopping.
    async fn notify_shutdown(&self) {}

    /// Called after every completed cycle.
    async fn notify_cycle(&self, result: &SweepCycleResult);
}

/// Notifier that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl SweepNotifier for NoopNotifier {
    async fn notify_cycle(&self, _result: &SweepCycleResult) {}
}

/// Returns a shared [`NoopNotifier`].
#[must_use]
pub fn noop_notifier() -> Arc<dyn SweepNotifier> {
    Arc::new(NoopNotifier)
}

/// Forwards every event to each inner notifier in order.
#[derive(Debug, Default)]
pub struct FanoutNotifier {
    inner: Vec<Arc<dyn SweepNotifier>>,
}

impl FanoutNotifier {
    /// Creates a fan-out over `inner`.
    #[must_use]
    pub fn new(inner: Vec<Arc<dyn SweepNotifier>>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl SweepNotifier for FanoutNotifier {
    async fn notify_startup(&self, summary: &StartupSummary) {
        for notifier in &self.inner {
            notifier.notify_startup(summary).await;
        }
    }

    async fn notify_shutdown(&self) {
        for notifier in &self.inner {
            notifier.notify_shutdown().await;
        }
    }

    async fn notify_cycle(&self, result: &SweepCycleResult) {
        for notifier in &self.inner {
            notifier.notify_cycle(result).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Debug, Default)]
    struct Recording {
        events: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl SweepNotifier for Recording {
        async fn notify_startup(&self, _summary: &StartupSummary) {
            self.events.lock().unwrap().push("startup");
        }

        async fn notify_cycle(&self, _result: &SweepCycleResult) {
            self.events.lock().unwrap().push("cycle");
        }
    }

    #[tokio::test]
    async fn fanout_reaches_every_notifier() {
        let a = Arc::new(Recording::default());
        let b = Arc::new(Recording::default());
        let fanout = FanoutNotifier::new(vec![
            a.clone() as Arc<dyn SweepNotifier>,
            b.clone() as Arc<dyn SweepNotifier>,
            noop_notifier(),
        ]);

        let summary = StartupSummary {
            deposit_address: "0xd0".to_string(),
            vault_address: "0xaa".to_string(),
            networks: Network::DEFAULT_SET.to_vec(),
            min_transfer: Wei::new(1),
            interval_ms: 60_000,
            dry_run: false,
        };
        fanout.notify_startup(&summary).await;
        fanout.notify_shutdown().await;
        fanout
            .notify_cycle(&SweepCycleResult {
                cycle_id: Uuid::new_v4(),
                started_at: Utc::now(),
                finished_at: Utc::now(),
                outcomes: Vec::new(),
            })
            .await;

        assert_eq!(*a.events.lock().unwrap(), vec!["startup", "cycle"]);
        assert_eq!(*b.events.lock().unwrap(), vec!["startup", "cycle"]);
    }
}
