//! # Sweep Scheduler
//!
//! Fires a sweep cycle on a fixed interval and fans it out across networks.
//!
//! At most one cycle is ever active. The `Idle`/`Running` flag is taken
//! with a single compare-and-swap and released by a guard on every exit
//! path, so a tick that lands on a running cycle is dropped without
//! touching any chain client.
//!
//! Each network is swept in its own task; the cycle joins them in
//! configured order before it completes.

use crate::application::services::sweep_engine::SweepEngine;
use crate::domain::entities::{NetworkOutcome, OutcomeKind, SweepCycleResult};
use crate::domain::services::NetworkRegistry;
use crate::domain::value_objects::Network;
use crate::infrastructure::blockchain::ChainClientFactory;
use crate::infrastructure::notifications::{SweepNotifier, noop_notifier};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No cycle in progress.
    Idle,
    /// A cycle is in progress.
    Running,
}

/// Releases the running flag when dropped.
#[derive(Debug)]
struct CycleGuard {
    running: Arc<AtomicBool>,
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Interval-driven sweep scheduler.
#[derive(Debug)]
pub struct SweepScheduler {
    registry: Arc<NetworkRegistry>,
    factory: Arc<dyn ChainClientFactory>,
    engine: Arc<SweepEngine>,
    notifier: Arc<dyn SweepNotifier>,
    networks: Vec<Network>,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl SweepScheduler {
    /// Creates a scheduler sweeping `networks` in order every `interval`.
    #[must_use]
    pub fn new(
        registry: Arc<NetworkRegistry>,
        factory: Arc<dyn ChainClientFactory>,
        engine: Arc<SweepEngine>,
        networks: Vec<Network>,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            factory,
            engine,
            notifier: noop_notifier(),
            networks,
            interval,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sets the notifier that receives every cycle result.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn SweepNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        if self.running.load(Ordering::Acquire) {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    fn try_begin(&self) -> Option<CycleGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleGuard {
                running: Arc::clone(&self.running),
            })
    }

    /// Runs one cycle across every configured network.
    ///
    /// Returns `None` without doing anything if a cycle is already running.
    pub async fn run_cycle(&self) -> Option<SweepCycleResult> {
        let Some(_guard) = self.try_begin() else {
            warn!("previous sweep cycle still running; skipping tick");
            return None;
        };

        let cycle_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(cycle_id = %cycle_id, networks = self.networks.len(), "sweep cycle started");

        let handles: Vec<(Network, JoinHandle<NetworkOutcome>)> = self
            .networks
            .iter()
            .map(|&network| {
                let registry = Arc::clone(&self.registry);
                let factory = Arc::clone(&self.factory);
                let engine = Arc::clone(&self.engine);
                let span = info_span!("sweep", cycle_id = %cycle_id, network = %network);
                let handle = tokio::spawn(
                    async move { sweep_network(network, &registry, factory.as_ref(), &engine).await }
                        .instrument(span),
                );
                (network, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (network, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(cycle_id = %cycle_id, network = %network, "sweep task panicked: {}", e);
                    NetworkOutcome::failed(network, format!("sweep task panicked: {e}"))
                }
            };
            outcomes.push(outcome);
        }

        let result = SweepCycleResult {
            cycle_id,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };
        for outcome in &result.outcomes {
            info!(cycle_id = %cycle_id, "{}", outcome);
        }
        info!(
            cycle_id = %cycle_id,
            swept = result.swept_count(),
            failed = result.failed_count(),
            "sweep cycle finished"
        );

        self.notifier.notify_cycle(&result).await;
        Some(result)
    }

    /// Runs cycles every interval until `shutdown` resolves.
    ///
    /// The first cycle fires one interval after start. Each tick's cycle
    /// runs in its own task so a slow cycle never delays the timer; ticks
    /// landing on a running cycle are dropped by the overlap guard. On
    /// shutdown the timer stops and any in-flight cycle is awaited.
    pub async fn run<S>(self: Arc<Self>, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(interval = ?self.interval, "scheduler started");
        let mut in_flight: Vec<JoinHandle<Option<SweepCycleResult>>> = Vec::new();

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("shutdown requested; stopping scheduler");
                    break;
                }
                _ = ticker.tick() => {
                    in_flight.retain(|handle| !handle.is_finished());
                    let scheduler = Arc::clone(&self);
                    in_flight.push(tokio::spawn(async move { scheduler.run_cycle().await }));
                }
            }
        }

        in_flight.retain(|handle| !handle.is_finished());
        if !in_flight.is_empty() {
            info!("waiting for in-flight sweep cycle");
        }
        for handle in in_flight {
            if let Err(e) = handle.await {
                error!("sweep cycle task failed: {}", e);
            }
        }
    }
}

async fn sweep_network(
    network: Network,
    registry: &NetworkRegistry,
    factory: &dyn ChainClientFactory,
    engine: &SweepEngine,
) -> NetworkOutcome {
    let config = match registry.lookup(network) {
        Ok(config) => config,
        Err(reason) => {
            warn!("network not configured: {}", reason);
            return NetworkOutcome::new(
                network,
                OutcomeKind::Unconfigured {
                    reason: reason.to_string(),
                },
            );
        }
    };

    let client = match factory.connect(config) {
        Ok(client) => client,
        Err(e) => {
            error!("failed to connect: {}", e);
            return NetworkOutcome::failed(network, e);
        }
    };

    match engine.sweep(client.as_ref()).await {
        Ok(kind) => NetworkOutcome::new(network, kind),
        Err(e) => {
            error!("sweep failed: {}", e);
            NetworkOutcome::failed(network, e)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::services::retry::RetryPolicy;
    use crate::application::services::sweep_engine::SweepSettings;
    use crate::domain::entities::SkipReason;
    use crate::domain::services::NetworkConfig;
    use crate::domain::value_objects::Wei;
    use crate::infrastructure::blockchain::ChainError;
    use crate::infrastructure::blockchain::mock::{DEPOSIT, MockCall, MockChainClient, MockChainFactory};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::{Notify, Semaphore};

    const VAULT: &str = "0x00000000000000000000000000000000000000aa";
    const ONE_ETHER: Wei = Wei::new(1_000_000_000_000_000_000);

    fn registry(networks: &[Network]) -> Arc<NetworkRegistry> {
        Arc::new(NetworkRegistry::new(networks.iter().map(|&network| {
            NetworkConfig::new(network, format!("http://{network}.invalid"), 1)
        })))
    }

    fn engine() -> Arc<SweepEngine> {
        Arc::new(SweepEngine::new(
            SweepSettings::new(VAULT).with_retry(RetryPolicy::new(2, Duration::from_secs(1))),
        ))
    }

    fn scheduler(factory: Arc<MockChainFactory>, configured: &[Network], swept: &[Network]) -> SweepScheduler {
        SweepScheduler::new(
            registry(configured),
            factory,
            engine(),
            swept.to_vec(),
            Duration::from_secs(60),
        )
    }

    #[derive(Debug, Default)]
    struct Collecting {
        cycles: Mutex<Vec<SweepCycleResult>>,
        notify: Notify,
    }

    #[async_trait]
    impl SweepNotifier for Collecting {
        async fn notify_cycle(&self, result: &SweepCycleResult) {
            self.cycles.lock().unwrap().push(result.clone());
            self.notify.notify_one();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cycle_reports_every_network_in_order() {
        let eth = Arc::new(MockChainClient::new(Network::Ethereum).with_balance(ONE_ETHER));
        let bsc = Arc::new(MockChainClient::new(Network::Bsc));
        let factory = Arc::new(MockChainFactory::new().with_client(eth.clone()).with_client(bsc));
        let scheduler = scheduler(
            factory,
            &[Network::Ethereum, Network::Bsc],
            &[Network::Ethereum, Network::Bsc, Network::Base],
        );

        let result = scheduler.run_cycle().await.unwrap();

        let networks: Vec<Network> = result.outcomes.iter().map(|o| o.network).collect();
        assert_eq!(networks, vec![Network::Ethereum, Network::Bsc, Network::Base]);
        assert!(result.outcomes[0].is_swept());
        assert!(matches!(
            result.outcomes[1].kind,
            OutcomeKind::Skipped(SkipReason::InsufficientBalance { .. })
        ));
        assert!(matches!(result.outcomes[2].kind, OutcomeKind::Unconfigured { .. }));
        assert_eq!(result.swept_count(), 1);
        assert_eq!(eth.submit_count(), 1);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_on_one_network_does_not_block_others() {
        let eth = Arc::new(
            MockChainClient::new(Network::Ethereum)
                .with_balance(ONE_ETHER)
                .push_submit(Err(ChainError::rejected("nonce too low"))),
        );
        let base = Arc::new(MockChainClient::new(Network::Base).with_balance(ONE_ETHER));
        let factory = Arc::new(MockChainFactory::new().with_client(eth).with_client(base.clone()));
        let networks = [Network::Ethereum, Network::Base];
        let scheduler = scheduler(factory, &networks, &networks);

        let result = scheduler.run_cycle().await.unwrap();

        assert!(result.outcomes[0].is_failed());
        assert!(result.outcomes[1].is_swept());
        assert_eq!(base.submit_count(), 1);
        assert_eq!(result.failed_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_network_becomes_failed_and_flag_resets() {
        let eth = Arc::new(MockChainClient::new(Network::Ethereum).panicking());
        let bsc = Arc::new(MockChainClient::new(Network::Bsc));
        let factory = Arc::new(MockChainFactory::new().with_client(eth).with_client(bsc));
        let networks = [Network::Ethereum, Network::Bsc];
        let scheduler = scheduler(factory, &networks, &networks);

        let result = scheduler.run_cycle().await.unwrap();

        match &result.outcomes[0].kind {
            OutcomeKind::Failed { error } => assert!(error.contains("panicked")),
            other => unreachable!("unexpected outcome: {other:?}"),
        }
        assert!(matches!(result.outcomes[1].kind, OutcomeKind::Skipped(_)));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.run_cycle().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_cycle_is_a_no_op() {
        let gate = Arc::new(Semaphore::new(0));
        let eth = Arc::new(MockChainClient::new(Network::Ethereum).with_balance_gate(gate.clone()));
        let factory = Arc::new(MockChainFactory::new().with_client(eth.clone()));
        let networks = [Network::Ethereum];
        let scheduler = Arc::new(scheduler(factory.clone(), &networks, &networks));

        let first = tokio::spawn({
            let scheduler = Arc::clone(&scheduler);
            async move { scheduler.run_cycle().await }
        });
        while eth.calls().is_empty() {
            tokio::task::yield_now().await;
        }
        assert_eq!(scheduler.state(), SchedulerState::Running);

        let calls_before = factory.total_calls();
        let connects_before = factory.connect_count();
        assert!(scheduler.run_cycle().await.is_none());
        assert_eq!(factory.total_calls(), calls_before);
        assert_eq!(factory.connect_count(), connects_before);

        gate.add_permits(1);
        let result = first.await.unwrap().unwrap();
        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_failure_is_reported_as_failed() {
        let factory = Arc::new(MockChainFactory::new());
        let networks = [Network::Polygon];
        let scheduler = scheduler(factory, &networks, &networks);

        let result = scheduler.run_cycle().await.unwrap();

        assert!(result.outcomes[0].is_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn run_fires_after_one_interval_and_stops_on_shutdown() {
        let eth = Arc::new(MockChainClient::new(Network::Ethereum));
        let factory = Arc::new(MockChainFactory::new().with_client(eth.clone()));
        let networks = [Network::Ethereum];
        let collecting = Arc::new(Collecting::default());
        let scheduler = Arc::new(
            scheduler(factory, &networks, &networks).with_notifier(collecting.clone()),
        );
        let shutdown = Arc::new(Notify::new());

        let runner = tokio::spawn({
            let scheduler = Arc::clone(&scheduler);
            let shutdown = Arc::clone(&shutdown);
            async move { scheduler.run(async move { shutdown.notified().await }).await }
        });

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert!(eth.calls().is_empty());

        collecting.notify.notified().await;
        collecting.notify.notified().await;
        assert_eq!(collecting.cycles.lock().unwrap().len(), 2);

        shutdown.notify_one();
        runner.await.unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn tick_during_slow_cycle_is_dropped() {
        let gate = Arc::new(Semaphore::new(0));
        let eth = Arc::new(MockChainClient::new(Network::Ethereum).with_balance_gate(gate.clone()));
        let factory = Arc::new(MockChainFactory::new().with_client(eth.clone()));
        let networks = [Network::Ethereum];
        let collecting = Arc::new(Collecting::default());
        let scheduler = Arc::new(
            scheduler(factory.clone(), &networks, &networks).with_notifier(collecting.clone()),
        );
        let shutdown = Arc::new(Notify::new());

        let runner = tokio::spawn({
            let scheduler = Arc::clone(&scheduler);
            let shutdown = Arc::clone(&shutdown);
            async move { scheduler.run(async move { shutdown.notified().await }).await }
        });

        // Ticks at 60s and 120s; the first cycle is still stuck on its balance read.
        tokio::time::sleep(Duration::from_secs(130)).await;
        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert_eq!(eth.calls(), vec![MockCall::Balance(DEPOSIT.to_string())]);
        assert_eq!(factory.connect_count(), 1);
        assert!(collecting.cycles.lock().unwrap().is_empty());

        gate.add_permits(8);
        collecting.notify.notified().await;

        let cycles = collecting.cycles.lock().unwrap().clone();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].outcomes.len(), 1);
        assert_eq!(eth.calls(), vec![MockCall::Balance(DEPOSIT.to_string())]);
        assert_eq!(factory.connect_count(), 1);

        shutdown.notify_one();
        runner.await.unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }
}
