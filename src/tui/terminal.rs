//! Terminal setup with RAII cleanup
//!
//! `TerminalGuard` puts the terminal in raw mode on the alternate screen
//! with the cursor hidden, and restores it when dropped.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::error;

/// Set while the terminal is in dashboard mode
static TERMINAL_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Restores the terminal on drop
pub struct TerminalGuard {
    cleaned_up: bool,
}

impl TerminalGuard {
    /// Enter raw mode and the alternate screen
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        TERMINAL_ACTIVE.store(true, Ordering::SeqCst);

        let mut guard = Self { cleaned_up: false };
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            guard.cleanup();
            return Err(e);
        }
        Ok(guard)
    }

    /// Restore the terminal; later calls are no-ops
    pub fn cleanup(&mut self) {
        if self.cleaned_up {
            return;
        }
        self.cleaned_up = true;
        restore_terminal();
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn restore_terminal() {
    if !TERMINAL_ACTIVE.swap(false, Ordering::SeqCst) {
        return;
    }
    let mut stdout = io::stdout();
    let _ = execute!(stdout, Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();
    let _ = stdout.flush();
}

/// Route panic reports to the log while the dashboard owns the terminal.
///
/// Key handler panics are caught and the dashboard keeps running, so the
/// default hook writing to stderr would land in the middle of a frame.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if TERMINAL_ACTIVE.load(Ordering::SeqCst) {
            error!(event_type = "PANIC", panic = %info, "Panic while the dashboard owns the terminal");
        } else {
            previous(info);
        }
    }));
}
