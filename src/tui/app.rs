//! Dashboard context
//!
//! Everything a key handler or the render loop may touch: the UI state
//! store, the screen state machine, the composer and the output surface.
//! The context lives on the dashboard worker and is only ever borrowed by
//! one caller at a time, so frames never interleave.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::screens::{plan_transition, RenderCadence, ScreenStateMachine};
use super::state::{CursorBounds, CursorMove, Screen, UiStateStore};
use super::surface::{LinkOpener, OutputSurface};
use super::view::ViewComposer;
use crate::config::DashboardConfig;
use crate::core::{BotCommand, BusinessSnapshot, SnapshotProvider};
use crate::error::AppError;

/// Render counters, shared with the dashboard handle
#[derive(Debug, Default)]
pub struct RenderStats {
    frames_written: AtomicU64,
    mini_lines_written: AtomicU64,
    ticks_skipped: AtomicU64,
    degraded_frames: AtomicU64,
    write_errors: AtomicU64,
}

/// Point-in-time copy of `RenderStats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStatsSnapshot {
    pub frames_written: u64,
    pub mini_lines_written: u64,
    pub ticks_skipped: u64,
    pub degraded_frames: u64,
    pub write_errors: u64,
}

impl RenderStats {
    pub fn snapshot(&self) -> RenderStatsSnapshot {
        RenderStatsSnapshot {
            frames_written: self.frames_written.load(Ordering::Relaxed),
            mini_lines_written: self.mini_lines_written.load(Ordering::Relaxed),
            ticks_skipped: self.ticks_skipped.load(Ordering::Relaxed),
            degraded_frames: self.degraded_frames.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
        }
    }
}

/// State and collaborators available to key handlers
pub struct DashboardContext {
    store: UiStateStore,
    screens: ScreenStateMachine,
    composer: ViewComposer,
    surface: Box<dyn OutputSurface>,
    provider: Arc<dyn SnapshotProvider>,
    opener: Arc<dyn LinkOpener>,
    explorer_url_base: String,
    stats: Arc<RenderStats>,
    degraded: bool,
    shutdown_requested: bool,
}

impl DashboardContext {
    pub fn new(
        config: &DashboardConfig,
        store: UiStateStore,
        provider: Arc<dyn SnapshotProvider>,
        surface: Box<dyn OutputSurface>,
        opener: Arc<dyn LinkOpener>,
        stats: Arc<RenderStats>,
    ) -> Self {
        Self {
            store,
            screens: ScreenStateMachine::new(),
            composer: ViewComposer::from_config(config),
            surface,
            provider,
            opener,
            explorer_url_base: config.explorer_url_base.clone(),
            stats,
            degraded: false,
            shutdown_requested: false,
        }
    }

    /// UI state store
    pub fn ui(&self) -> &UiStateStore {
        &self.store
    }

    pub fn current_screen(&self) -> Screen {
        self.store.get_state().current_screen
    }

    /// Latest business snapshot
    pub fn snapshot(&self) -> BusinessSnapshot {
        self.provider.snapshot()
    }

    pub fn render_stats(&self) -> RenderStatsSnapshot {
        self.stats.snapshot()
    }

    pub(crate) fn screens_mut(&mut self) -> &mut ScreenStateMachine {
        &mut self.screens
    }

    /// Move to `requested`.
    ///
    /// Order: publish the new screen, apply state effects, render the new
    /// screen once, then print any banner.
    pub fn set_current_screen(&mut self, requested: Screen) {
        let current = self.current_screen();
        let transition = plan_transition(current, requested);

        self.store.update(|s| s.current_screen = transition.to);
        self.screens
            .apply(&transition, &self.store, self.provider.as_ref());

        if transition.from != transition.to {
            info!(
                event_type = "SCREEN_TRANSITION",
                from = %transition.from,
                to = %transition.to,
                "Screen changed"
            );
        }

        self.render_now();
        for line in transition.announcements() {
            self.announce(line);
        }
    }

    /// `main` → `mini`; any other screen → `main`
    pub fn toggle_mini(&mut self) {
        let target = match self.current_screen() {
            Screen::Main => Screen::Mini,
            _ => Screen::Main,
        };
        self.set_current_screen(target);
    }

    /// Step the trade-table cursor and re-render
    pub fn move_cursor(&mut self, movement: CursorMove) {
        let rows = self.provider.snapshot().trade_history.len();
        self.store
            .update(|s| s.cursor.step(movement, CursorBounds::trade_table(rows)));
        self.render_now();
    }

    /// Render immediately with the current screen's cadence.
    ///
    /// Always writes, even a mini line identical to the previous one.
    pub fn render_now(&mut self) {
        match self.current_screen().cadence() {
            RenderCadence::Timer => self.render_frame(),
            RenderCadence::SnapshotChanges => self.render_mini(true),
        }
    }

    /// Render-loop tick
    pub fn on_tick(&mut self) {
        match self.current_screen().cadence() {
            RenderCadence::Timer => self.render_frame(),
            RenderCadence::SnapshotChanges => {
                self.stats.ticks_skipped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Snapshot change seen by the mini subscription
    pub fn on_snapshot_changed(&mut self) {
        if self.current_screen().cadence() == RenderCadence::SnapshotChanges {
            self.render_mini(false);
        }
    }

    /// Compose and write one full frame
    pub fn render_frame(&mut self) {
        if self.shutdown_requested {
            return;
        }

        let snapshot = self.provider.snapshot();
        // The table may have shrunk since the cursor last moved
        let bounds = CursorBounds::trade_table(snapshot.trade_history.len());
        self.store.update(|s| s.cursor.clamp(bounds));
        let ui = self.store.get_state();

        let text = match self.composer.compose(&snapshot, &ui) {
            Ok(text) => {
                if self.degraded {
                    info!(event_type = "RENDER_RECOVERED", screen = %ui.current_screen, "Frame composition recovered");
                    self.degraded = false;
                }
                text
            }
            Err(e) => {
                self.stats.degraded_frames.fetch_add(1, Ordering::Relaxed);
                // Only the first failure of a streak is logged
                if !self.degraded {
                    warn!(
                        event_type = "RENDER_DEGRADED",
                        screen = %ui.current_screen,
                        error = %e,
                        "Frame composition failed, showing placeholder"
                    );
                    self.degraded = true;
                }
                self.composer.placeholder(&e)
            }
        };

        if ui.allow_clear_console {
            if let Err(e) = self.surface.clear() {
                self.write_failed(e);
                return;
            }
        }
        match self.surface.write(&text) {
            Ok(()) => {
                self.stats.frames_written.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => self.write_failed(e),
        }
    }

    /// Write the condensed mini line; unless `force`, a line repeating the
    /// previous one is dropped
    pub fn render_mini(&mut self, force: bool) {
        if self.shutdown_requested {
            return;
        }

        let snapshot = self.provider.snapshot();
        let ui = self.store.get_state();
        let line = self.composer.compose_mini(&snapshot, &ui);

        let fresh = self.screens.accept_mini_line(&line);
        if !fresh && !force {
            return;
        }
        match self.surface.write(&format!("{}\n", line)) {
            Ok(()) => {
                self.stats.mini_lines_written.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => self.write_failed(e),
        }
    }

    /// Print a single line outside the frame (banners, exit notices)
    pub fn announce(&mut self, line: &str) {
        if self.shutdown_requested {
            return;
        }
        if let Err(e) = self.surface.write(&format!("{}\n", line)) {
            self.write_failed(e);
        }
    }

    /// Forward a command to the bot
    pub fn send_command(&self, command: BotCommand) {
        info!(event_type = "BOT_COMMAND", command = %command, "Forwarding command to bot");
        self.provider.set_status(command);
    }

    /// Open the first wallet in the block explorer; returns the URL
    pub fn open_wallet_explorer(&self) -> Result<String, AppError> {
        let snapshot = self.provider.snapshot();
        let address = snapshot
            .primary_wallet_address()
            .ok_or_else(|| AppError::Unavailable("no wallet address available".to_string()))?;
        let url = format!("{}{}", self.explorer_url_base, address);

        match self.opener.open(&url) {
            Ok(()) => debug!(url = %url, "Opened wallet explorer"),
            Err(e) => warn!(
                event_type = "LINK_OPEN_FAILED",
                url = %url,
                error = %e,
                "Could not open wallet explorer"
            ),
        }
        Ok(url)
    }

    /// Stop the dashboard once the current event is done
    pub fn request_shutdown(&mut self) {
        if !self.shutdown_requested {
            info!(event_type = "SHUTDOWN_REQUESTED", "Dashboard shutdown requested");
        }
        self.shutdown_requested = true;
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    fn write_failed(&self, err: io::Error) {
        self.stats.write_errors.fetch_add(1, Ordering::Relaxed);
        warn!(event_type = "SURFACE_WRITE_FAILED", error = %err, "Output surface write failed");
    }
}
