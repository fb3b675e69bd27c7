mod api;
mod cli;
mod db;
mod router;
mod state;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wastewatch_core::Config;
use wastewatch_notify::email::EmailNotifier;
use wastewatch_notify::log::LogNotifier;
use wastewatch_notify::{Dispatcher, Notifier};
use wastewatch_pipeline::Pipeline;

use crate::cli::{Cli, Command, RunArgs};
use crate::db::PgStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    wastewatch_core::config::load_dotenv();
    let config = Config::from_env();
    config.log_summary();

    match cli.command {
        Command::Serve { dry_run } => serve(&config, dry_run).await,
        Command::Run(args) => run_once(&config, &args).await,
    }
}

/// Pick the send capability: log-only for dry runs, SMTP otherwise.
fn build_notifier(config: &Config, dry_run: bool) -> anyhow::Result<Arc<dyn Notifier>> {
    if dry_run {
        info!("dry run: notifications will be logged, not sent");
        return Ok(Arc::new(LogNotifier));
    }
    if !config.smtp.is_configured() {
        anyhow::bail!("SMTP_HOST is not set; configure SMTP or pass --dry-run");
    }
    let email = EmailNotifier::from_smtp_config(&config.smtp)
        .context("failed to build SMTP notifier")?;
    Ok(Arc::new(email))
}

fn build_pipeline(
    config: &Config,
    store: Arc<PgStore>,
    notifier: Arc<dyn Notifier>,
) -> anyhow::Result<Pipeline> {
    let waste = &config.waste;
    let timeout = (waste.send_timeout_secs > 0).then(|| Duration::from_secs(waste.send_timeout_secs));
    let dispatcher = Dispatcher::new(notifier)
        .with_concurrency(waste.dispatch_concurrency)
        .with_send_timeout(timeout);

    let pipeline = Pipeline::new(store.clone(), store, dispatcher)
        .context("failed to load notification templates")?
        .with_policy(waste.fine_policy()?)
        .with_tracked_kind(waste.tracked_kind.clone());
    Ok(pipeline)
}

async fn serve(config: &Config, dry_run: bool) -> anyhow::Result<()> {
    let pool = db::init_pg_pool(&config.postgres).await?;
    let store = Arc::new(PgStore::new(pool.clone()));
    let notifier = build_notifier(config, dry_run)?;
    let pipeline = build_pipeline(config, store, notifier)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = Arc::new(AppState {
        pipeline: Arc::new(pipeline),
        shutdown: shutdown_rx,
    });
    let app = router::build_router(state, &config.server.cors_origin);

    let addr = config.server.bind_addr();
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
                return;
            }
            info!("Shutdown requested, cancelling pending sends");
            let _ = shutdown_tx.send(true);
        })
        .await
        .context("HTTP server error")?;

    pool.close().await;
    info!("Server stopped");
    Ok(())
}

async fn run_once(config: &Config, args: &RunArgs) -> anyhow::Result<()> {
    let pool = db::init_pg_pool(&config.postgres).await?;
    let store = Arc::new(PgStore::new(pool.clone()));
    let notifier = build_notifier(config, args.dry_run)?;
    let pipeline = build_pipeline(config, store, notifier)?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let cancel_on_ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, no new sends will start");
            let _ = cancel_tx.send(true);
        }
    });

    let result = pipeline.run(&args.to_request(), Some(cancel_rx)).await;
    cancel_on_ctrl_c.abort();
    pool.close().await;

    let report = result?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
