// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `arkive serve` and `arkive sweep` command implementations.
//!
//! Wires the GitHub blob store, the Telegram notifier, the archiver, the
//! sweep scheduler, and the HTTP gateway together.

use std::sync::Arc;
use std::time::Instant;

use arkive_agent::Archiver;
use arkive_agent::shutdown;
use arkive_config::model::ArkiveConfig;
use arkive_core::{ArkiveError, BlobStore, Notifier};
use arkive_cron::SweepScheduler;
use arkive_gateway::{GatewayState, ServerConfig, start_server};
use arkive_github::GithubBlobStore;
use arkive_storage::{DeletionQueue, RecordStore};
use arkive_telegram::TelegramNotifier;
use tracing::info;

/// Builds the record store and deletion queue over the configured repository.
pub fn build_stores(config: &ArkiveConfig) -> Result<(RecordStore, DeletionQueue), ArkiveError> {
    let store: Arc<dyn BlobStore> = Arc::new(GithubBlobStore::new(&config.github)?);
    let records = RecordStore::new(store.clone(), config.github.records_path.as_str());
    let queue = DeletionQueue::new(
        store,
        config.github.queue_path.as_str(),
        config.sweep.max_attempts,
    );
    Ok((records, queue))
}

/// Builds the archiver with real GitHub and Telegram adapters.
pub fn build_archiver(config: &ArkiveConfig) -> Result<Archiver, ArkiveError> {
    let (records, queue) = build_stores(config)?;
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(&config.telegram)?);
    Ok(Archiver::new(records, queue, notifier, &config.bot))
}

/// Runs the gateway and the in-process scheduler until SIGINT/SIGTERM.
pub async fn run_serve(config: ArkiveConfig) -> Result<(), ArkiveError> {
    init_tracing(&config.bot.log_level);

    let archiver = build_archiver(&config)?;
    let cancel = shutdown::install_signal_handler();

    if config.sweep.enabled {
        let scheduler = SweepScheduler::new(
            archiver.queue().clone(),
            archiver.notifier().clone(),
            &config.sweep.schedule,
        )?;
        tokio::spawn(scheduler.run(cancel.clone()));
        info!(schedule = %config.sweep.schedule, "deletion sweep scheduler enabled");
    } else {
        info!("in-process sweep disabled; trigger POST /sweep or `arkive sweep` externally");
    }

    let state = GatewayState {
        archiver,
        allowed_users: Arc::from(config.telegram.allowed_users.clone()),
        webhook_secret: config.telegram.webhook_secret.clone(),
        sweep_token: config.gateway.sweep_token.clone(),
        start_time: Instant::now(),
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    info!(name = %config.bot.name, "arkive starting");
    let served = start_server(&server_config, state, cancel.clone()).await;
    // Stop the scheduler even when the server exited on its own.
    cancel.cancel();
    served
}

/// Runs one sweep against the current time and prints the outcome.
pub async fn run_sweep(config: ArkiveConfig) -> Result<(), ArkiveError> {
    init_tracing(&config.bot.log_level);

    let archiver = build_archiver(&config)?;
    let now = chrono::Utc::now().timestamp_millis();
    let report = archiver
        .queue()
        .sweep(now, archiver.notifier().as_ref())
        .await?;

    println!(
        "due: {}, deleted: {}, retried: {}, dropped: {}, remaining: {}",
        report.due, report.deleted, report.retried, report.dropped, report.remaining
    );
    Ok(())
}

/// Initialize the tracing subscriber with an EnvFilter.
///
/// `RUST_LOG` wins over `bot.log_level` when set.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    // Target directives match by prefix, so `arkive` also covers the `arkive_*` crates.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("arkive={log_level},tower_http={log_level},warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
