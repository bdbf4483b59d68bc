//! Bot command consumer
//!
//! Drains the store's command channel. The standalone dashboard has no
//! trading engine behind it, so commands are applied to the store status
//! and logged.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::info;

use super::snapshot::{BotCommand, BotStatus};
use super::state::BotStore;

/// Consume bot commands until shutdown or until every sender is gone
pub async fn command_task(
    store: Arc<BotStore>,
    mut commands_rx: mpsc::UnboundedReceiver<BotCommand>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    info!("Command task started");
    let mut handled: u64 = 0;

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!(total_commands = handled, "Command task shutting down");
                break;
            }
            command = commands_rx.recv() => match command {
                Some(command) => {
                    handled += 1;
                    apply_command(&store, command);
                }
                None => break,
            }
        }
    }
}

fn apply_command(store: &BotStore, command: BotCommand) {
    match command {
        BotCommand::Stop => {
            store.update(|s| s.status = BotStatus::Stopped);
            info!(event_type = "BOT_STOPPED", command = %command, "Bot stopped");
        }
        BotCommand::ExecuteRecentRoute => {
            info!(
                event_type = "ROUTE_EXECUTION_REQUESTED",
                command = %command,
                "Execution of the most recent route requested"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::BusinessSnapshot;
    use crate::core::state::SnapshotProvider;
    use std::time::Duration;

    #[tokio::test]
    async fn test_stop_command_marks_bot_stopped() {
        let (store, commands_rx) = BotStore::new(BusinessSnapshot::default(), 10);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let task = tokio::spawn(command_task(store.clone(), commands_rx, shutdown_rx));

        store.set_status(BotCommand::Stop);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.snapshot().status, BotStatus::Stopped);

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_execute_command_leaves_status() {
        let (store, commands_rx) = BotStore::new(BusinessSnapshot::default(), 10);
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
        store.update(|s| s.status = BotStatus::Running);
        let task = tokio::spawn(command_task(store.clone(), commands_rx, shutdown_rx));

        store.set_status(BotCommand::ExecuteRecentRoute);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.snapshot().status, BotStatus::Running);
        task.abort();
    }
}
