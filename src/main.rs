//! Vault sweeper entry point.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use vault_sweeper::application::services::{SweepEngine, SweepScheduler};
use vault_sweeper::infrastructure::config::SweeperConfig;
use vault_sweeper::infrastructure::notifications::{
    EventLogNotifier, FanoutNotifier, SweepNotifier, TelegramNotifier,
};
use vault_sweeper::infrastructure::telemetry::{LogFormat, init_tracing};

#[derive(Debug, Parser)]
#[command(name = "vault-sweeper", version, about = "Sweeps deposit balances to a vault on EVM networks")]
struct Cli {
    /// Optional configuration file (TOML, JSON or YAML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single sweep cycle and exit.
    #[arg(long)]
    once: bool,

    /// Compute transfers without submitting them.
    #[arg(long)]
    dry_run: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let log_format = LogFormat::resolve(cli.json_logs, std::env::var("LOG_FORMAT").ok().as_deref());
    init_tracing(log_format).context("failed to initialize logging")?;
    if let Ok(path) = &dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    let mut config = match SweeperConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            return Err(e).context("invalid configuration");
        }
    };
    if cli.dry_run {
        config.dry_run = true;
    }

    log_startup(&config);

    let notifier = build_notifier(&config);
    notifier.notify_startup(&config.startup_summary()).await;

    let scheduler = Arc::new(
        SweepScheduler::new(
            Arc::new(config.registry.clone()),
            Arc::new(config.deposit.clone()),
            Arc::new(SweepEngine::new(config.sweep_settings())),
            config.networks.clone(),
            config.interval,
        )
        .with_notifier(Arc::clone(&notifier)),
    );

    if cli.once {
        scheduler.run_cycle().await;
    } else {
        Arc::clone(&scheduler).run(shutdown_signal()).await;
    }

    notifier.notify_shutdown().await;
    info!("vault sweeper stopped");
    Ok(())
}

fn log_startup(config: &SweeperConfig) {
    info!("vault sweeper starting");
    info!("  deposit: {}", config.deposit_address);
    info!("  vault: {}", config.vault_address);
    info!("  interval: {:?}", config.interval);
    info!(
        "  minimum transfer: {} (native units)",
        config.min_transfer.to_ether_string()
    );
    info!(
        "  retry: {} attempts, {:?} apart",
        config.retry.max_attempts(),
        config.retry.delay()
    );
    if config.dry_run {
        info!("  dry run: transfers will not be submitted");
    }

    let configured = config.registry.configured();
    for network in &config.networks {
        if configured.contains(network) {
            info!("  network: {}", network);
        } else {
            warn!(network = %network, "no usable RPC configuration; network will be skipped");
        }
    }
}

fn build_notifier(config: &SweeperConfig) -> Arc<dyn SweepNotifier> {
    let mut sinks: Vec<Arc<dyn SweepNotifier>> = Vec::new();
    if let Some(telegram) = &config.telegram {
        sinks.push(Arc::new(TelegramNotifier::new(
            &telegram.bot_token,
            telegram.chat_id.clone(),
        )));
    }
    if let Some(path) = &config.event_log_path {
        sinks.push(Arc::new(EventLogNotifier::new(path.clone())));
    }
    Arc::new(FanoutNotifier::new(sinks))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
