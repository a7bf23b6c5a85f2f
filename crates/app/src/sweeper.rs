//! Inactivity sweeper
//!
//! Periodic task that warns idle tickets. Bound to application lifetime
//! through a watch channel; the first sweep runs at startup.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::desk::TicketDesk;

pub async fn run(desk: Arc<TicketDesk>, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match desk.sweep_inactive().await {
                    Ok(0) => debug!("Inactivity sweep found nothing"),
                    Ok(warned) => info!(warned, "Inactivity sweep warned tickets"),
                    Err(e) => error!(error = %e, "Inactivity sweep failed"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("Sweeper stopping");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desk::tests::{desk_config, mock_gateway, GatewayCall, GUILD, MEMBER};
    use std::sync::Mutex;
    use usher_core::{Database, GuildSettings, SettingsRepository};

    #[tokio::test]
    async fn test_sweeper_warns_then_stops_on_shutdown() {
        let gateway = Arc::new(mock_gateway());
        let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let desk = Arc::new(TicketDesk::new(
            gateway.clone(),
            db.clone(),
            desk_config(),
        ));

        // Zero-hour threshold makes the fresh ticket idle immediately
        {
            let db = db.lock().unwrap();
            let mut settings = GuildSettings::defaults_for(GUILD);
            settings.auto_close_hours = 0;
            db.save_guild_settings(&settings).unwrap();
        }
        desk.open_ticket(MEMBER, "Subject", "Description", "medium")
            .await
            .unwrap();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(desk, Duration::from_secs(3600), shutdown_rx));

        // First tick fires immediately
        tokio::time::sleep(Duration::from_millis(200)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert!(gateway.calls().iter().any(|c| matches!(
            c,
            GatewayCall::SendMessage { content, .. } if content.contains("no activity")
        )));
    }

    #[tokio::test]
    async fn test_sweeper_stops_when_sender_dropped() {
        let gateway = Arc::new(mock_gateway());
        let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let desk = Arc::new(TicketDesk::new(gateway, db, desk_config()));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(desk, Duration::from_secs(3600), shutdown_rx));

        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(shutdown_tx);
        handle.await.unwrap();
    }
}
