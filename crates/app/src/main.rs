//! Usher - support-ticket bot
//!
//! Connects to the platform adapter, persists tickets in SQLite, and runs
//! the inactivity sweeper until the event stream ends or ctrl-c.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use usher_core::{Database, Error, Result};
use usher_net::AdapterClient;

mod config;
mod desk;
mod gateway;
mod surface;
mod sweeper;
mod transcript;

use config::Config;
use desk::{DeskConfig, TicketDesk};
use gateway::{ChatGateway, RemoteGateway};
use surface::Surface;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Usher");

    if let Err(e) = run().await {
        tracing::error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = Config::load()?;

    let db_path = Config::data_path()?.join("usher.db");
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Arc::new(Mutex::new(Database::open(&db_path)?));

    let (client, mut events) = AdapterClient::connect(config.adapter_addr, &config.token)
        .await
        .map_err(|e| Error::Gateway(e.to_string()))?;
    let gateway: Arc<dyn ChatGateway> = Arc::new(RemoteGateway::new(client));

    let desk = Arc::new(TicketDesk::new(
        gateway.clone(),
        db,
        DeskConfig {
            guild: config.guild,
            ticket_category: config.ticket_category,
            staff_role: config.staff_role,
            transcript_channel: config.transcript_channel,
            close_grace: Duration::from_secs(config.close_grace_secs),
        },
    ));
    let surface = Surface::new(desk.clone(), gateway);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = tokio::spawn(sweeper::run(
        desk,
        Duration::from_secs(config.sweep_interval_hours * 3600),
        shutdown_rx,
    ));

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(event) => surface.handle(event).await,
                    None => {
                        tracing::info!("Adapter event stream ended");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = sweeper.await;

    Ok(())
}
