mod actors;
mod server;

use std::sync::Arc;

use actors::TrackerActor;
use anyhow::{Context, Result};
use dwell_adapters::SqliteSessionRepository;
use dwell_core::{Config, SessionService, SystemClock};
use server::Server;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("dwell_daemon=debug".parse()?))
        .init();

    info!("dwell daemon starting");

    let config = Config::load().unwrap_or_else(|error| {
        warn!(%error, "failed to load config, using defaults");
        Config::default()
    });

    let (shutdown_sender, shutdown_receiver) = broadcast::channel::<()>(1);
    let sigint_shutdown_sender = shutdown_sender.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("SIGINT received, initiating shutdown");
        sigint_shutdown_sender.send(()).ok();
    });

    let repository = create_session_repository()?;
    let service = SessionService::new(repository, Arc::new(SystemClock));

    let (tracker_actor, tracker_handle) = TrackerActor::new(service, config);
    tokio::spawn(tracker_actor.run());

    let server = Server::new(tracker_handle)?;
    server.run(shutdown_receiver).await?;

    info!("dwell daemon stopped");
    std::process::exit(0);
}

fn create_session_repository() -> Result<Arc<SqliteSessionRepository>> {
    let data_dir = dirs::data_dir()
        .context("cannot determine data directory")?
        .join("dwell");

    std::fs::create_dir_all(&data_dir).context("failed to create data directory")?;

    let database_path = data_dir.join("sessions.db");
    let repository = SqliteSessionRepository::new(&database_path)
        .map_err(|error| anyhow::anyhow!("failed to open session store: {error}"))?;

    info!(?database_path, "session store opened");
    Ok(Arc::new(repository))
}
