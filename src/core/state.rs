//! Bot store: the business-side state the dashboard reads from
//!
//! The bot owns this store. The dashboard only sees it through the
//! `SnapshotProvider` trait: a cloned snapshot per render, a revision
//! counter on a `watch` channel for change notifications, and a command
//! sink for user-triggered actions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{mpsc, watch};
use tracing::warn;

use super::snapshot::{BotCommand, BotStatus, BusinessSnapshot, LogEntry};

/// Read-only view of the bot consumed by the dashboard
pub trait SnapshotProvider: Send + Sync {
    /// Consistent point-in-time copy; must not block
    fn snapshot(&self) -> BusinessSnapshot;

    /// Change notifications; the value is a monotonically increasing revision
    fn subscribe(&self) -> watch::Receiver<u64>;

    /// Forward a user-triggered command to the bot
    fn set_status(&self, command: BotCommand);
}

/// Type alias for the store shared between the bot tasks and the dashboard
pub type SharedBotStore = Arc<BotStore>;

/// In-memory bot store with change notifications
#[derive(Debug)]
pub struct BotStore {
    state: RwLock<BusinessSnapshot>,
    revision: watch::Sender<u64>,
    commands: mpsc::UnboundedSender<BotCommand>,
    log_capacity: usize,
    dropped_logs: AtomicU64,
}

impl BotStore {
    /// Create a store and the receiving end of its command channel
    pub fn new(
        initial: BusinessSnapshot,
        log_capacity: usize,
    ) -> (SharedBotStore, mpsc::UnboundedReceiver<BotCommand>) {
        let (revision, _) = watch::channel(0);
        let (commands, commands_rx) = mpsc::unbounded_channel();

        let store = Arc::new(Self {
            state: RwLock::new(initial),
            revision,
            commands,
            log_capacity: log_capacity.max(1),
            dropped_logs: AtomicU64::new(0),
        });

        (store, commands_rx)
    }

    /// Mutate the snapshot and notify subscribers
    pub fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut BusinessSnapshot),
    {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            mutate(&mut state);
        }
        self.revision.send_modify(|rev| *rev += 1);
    }

    /// Current revision (number of published updates)
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Append a log line without blocking.
    ///
    /// Log capture runs inside tracing callbacks that may fire while this
    /// store's lock is held by the same thread, so this only ever uses
    /// `try_write()`; contended lines are counted and dropped. Log lines do
    /// not bump the revision, otherwise every log emitted while rendering
    /// the mini view would schedule another mini render.
    pub fn try_push_log(&self, entry: LogEntry) -> bool {
        match self.state.try_write() {
            Ok(mut state) => {
                while state.logs.len() >= self.log_capacity {
                    state.logs.pop_front();
                }
                state.logs.push_back(entry);
                true
            }
            Err(_) => {
                self.dropped_logs.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Log lines dropped under lock contention
    pub fn dropped_logs(&self) -> u64 {
        self.dropped_logs.load(Ordering::Relaxed)
    }
}

impl SnapshotProvider for BotStore {
    fn snapshot(&self) -> BusinessSnapshot {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn set_status(&self, command: BotCommand) {
        if command == BotCommand::Stop {
            self.update(|s| s.status = BotStatus::Stopping);
        }
        if self.commands.send(command).is_err() {
            warn!(event_type = "COMMAND_DROPPED", command = %command, "Bot command receiver is gone");
        }
    }
}
