//! Dashboard worker and handle
//!
//! One worker task owns the `DashboardContext` and the keyboard
//! dispatcher. It selects over three sources, in priority order:
//! - queued events (key presses, late registrations, render and shutdown
//!   requests), in arrival order
//! - the mini-mode snapshot subscription, while mini mode is live
//! - the render-loop ticker (period `1000ms / fps`)
//!
//! Everything that writes to the output surface runs on this task, so a
//! transition's forced render can never race a timer frame.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use super::app::{DashboardContext, RenderStats, RenderStatsSnapshot};
use super::bindings::register_builtin_bindings;
use super::keyboard::{Chord, KeyHandler, KeyboardDispatcher};
use super::state::{UiState, UiStateStore};
use super::surface::{LinkOpener, OutputSurface};
use crate::config::DashboardConfig;
use crate::core::SnapshotProvider;
use crate::error::AppError;

/// Work queued for the dashboard worker
pub enum DashboardEvent {
    /// Key press to dispatch
    Key(Chord),
    /// Bind a handler (last registration wins)
    Register(Chord, KeyHandler),
    /// Render immediately with the current screen's cadence
    Render,
    /// Acknowledged once every earlier event has been processed
    Sync(oneshot::Sender<()>),
    Shutdown,
}

/// Dashboard worker state
pub struct Dashboard {
    keyboard: KeyboardDispatcher,
    ctx: DashboardContext,
    frame_period: Duration,
}

impl Dashboard {
    /// Validate `config` and spawn the worker.
    ///
    /// An invalid configuration (e.g. fps above 14) is returned before
    /// anything is spawned or written.
    pub fn start(
        config: DashboardConfig,
        provider: Arc<dyn SnapshotProvider>,
        surface: Box<dyn OutputSurface>,
        opener: Arc<dyn LinkOpener>,
    ) -> Result<DashboardHandle, AppError> {
        config.validate()?;

        let store = UiStateStore::new(UiState::new(config.allow_clear_console));
        let stats = Arc::new(RenderStats::default());
        let ctx = DashboardContext::new(
            &config,
            store.clone(),
            provider,
            surface,
            opener,
            Arc::clone(&stats),
        );

        let mut keyboard = KeyboardDispatcher::new();
        register_builtin_bindings(&mut keyboard);

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (finished_tx, finished_rx) = watch::channel(false);

        info!(
            event_type = "DASHBOARD_STARTED",
            fps = config.fps,
            allow_clear_console = config.allow_clear_console,
            width = config.width,
            height = config.height,
            "Dashboard started"
        );

        let dashboard = Dashboard {
            keyboard,
            ctx,
            frame_period: config.frame_period(),
        };
        tokio::spawn(dashboard.run(events_rx, finished_tx));

        Ok(DashboardHandle {
            events_tx,
            store,
            stats,
            finished: finished_rx,
        })
    }

    async fn run(
        mut self,
        mut events_rx: mpsc::UnboundedReceiver<DashboardEvent>,
        finished_tx: watch::Sender<bool>,
    ) {
        let mut ticker = interval(self.frame_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                event = events_rx.recv() => self.handle_event(event),

                Some(()) = self.ctx.screens_mut().mini_changed() => {
                    self.ctx.on_snapshot_changed();
                }

                _ = ticker.tick() => self.ctx.on_tick(),
            }

            if self.ctx.is_shutdown_requested() {
                break;
            }
        }

        self.ctx.screens_mut().stop_subscriptions();
        drop(ticker);
        // Refuse further events before reporting the stop
        drop(events_rx);
        info!(
            event_type = "DASHBOARD_STOPPED",
            frames_written = self.ctx.render_stats().frames_written,
            "Dashboard stopped"
        );
        let _ = finished_tx.send(true);
    }

    fn handle_event(&mut self, event: Option<DashboardEvent>) {
        match event {
            Some(DashboardEvent::Key(chord)) => {
                let _ = self.keyboard.dispatch(&chord, &mut self.ctx);
            }
            Some(DashboardEvent::Register(chord, handler)) => {
                self.keyboard.register(chord, handler);
            }
            Some(DashboardEvent::Render) => self.ctx.render_now(),
            Some(DashboardEvent::Sync(ack)) => {
                let _ = ack.send(());
            }
            Some(DashboardEvent::Shutdown) => self.ctx.request_shutdown(),
            None => {
                debug!("All dashboard handles dropped");
                self.ctx.request_shutdown();
            }
        }
    }
}

/// Cloneable handle to a running dashboard
#[derive(Clone)]
pub struct DashboardHandle {
    events_tx: mpsc::UnboundedSender<DashboardEvent>,
    store: UiStateStore,
    stats: Arc<RenderStats>,
    finished: watch::Receiver<bool>,
}

impl DashboardHandle {
    /// Bind `handler` to `chord`, replacing any earlier binding.
    ///
    /// Takes effect for every key press queued after this call.
    pub fn on_key_press<F>(&self, chord: Chord, handler: F) -> Result<(), AppError>
    where
        F: FnMut(&mut DashboardContext) -> anyhow::Result<()> + Send + 'static,
    {
        self.events_tx
            .send(DashboardEvent::Register(chord, Box::new(handler)))
            .map_err(|_| AppError::Unavailable("dashboard has stopped".to_string()))
    }

    /// Queue a key press; false once the dashboard has stopped
    pub fn press(&self, chord: Chord) -> bool {
        self.events_tx.send(DashboardEvent::Key(chord)).is_ok()
    }

    /// Queue an immediate render
    pub fn request_render(&self) -> bool {
        self.events_tx.send(DashboardEvent::Render).is_ok()
    }

    /// Ask the worker to stop; no frame is written afterwards
    pub fn shutdown(&self) {
        let _ = self.events_tx.send(DashboardEvent::Shutdown);
    }

    /// Wait until every event queued before this call has been handled.
    ///
    /// Returns false if the dashboard stopped first.
    pub async fn sync(&self) -> bool {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.events_tx.send(DashboardEvent::Sync(ack_tx)).is_err() {
            return false;
        }
        ack_rx.await.is_ok()
    }

    /// Current UI state
    pub fn ui_state(&self) -> UiState {
        self.store.get_state()
    }

    pub fn stats(&self) -> RenderStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn is_finished(&self) -> bool {
        *self.finished.borrow()
    }

    /// Resolve once the worker has stopped
    pub async fn wait(&self) {
        let mut finished = self.finished.clone();
        let _ = finished.wait_for(|done| *done).await;
    }
}
