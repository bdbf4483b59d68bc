//! Screen state machine
//!
//! `plan_transition` is a total, pure function from `(current, requested)`
//! to the next screen plus the effects of the move. `ScreenStateMachine`
//! owns the state those effects act on: the clear-console flag saved on
//! entering mini mode and the mini-mode snapshot subscription.

use tokio::sync::watch;
use tracing::debug;

use super::state::{Screen, UiStateStore};
use crate::core::SnapshotProvider;

/// Printed once on every entry into mini mode
pub const MINI_ENTER_BANNER: [&str; 4] = [
    "",
    "Entering mini mode. Press 'm' to exit.",
    "WARNING: mini mode is experimental and may change.",
    "",
];

/// Printed when leaving mini mode
pub const MINI_EXIT_LINE: &str = "Exiting mini mode.";

/// How a screen gets its frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderCadence {
    /// Full frame on every render-loop tick
    Timer,
    /// One condensed line per snapshot change; ticks are skipped
    SnapshotChanges,
}

impl Screen {
    pub fn cadence(self) -> RenderCadence {
        match self {
            Screen::Mini => RenderCadence::SnapshotChanges,
            Screen::Main | Screen::Config | Screen::Wallet | Screen::Logs => RenderCadence::Timer,
        }
    }
}

/// Side effect of a transition, applied in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEffect {
    /// Save `allow_clear_console` and force it off
    SuspendClearConsole,
    /// Put back the value saved on mini entry
    RestoreClearConsole,
    StartMiniSubscription,
    StopMiniSubscription,
    /// Lines printed after the forced render
    Announce(&'static [&'static str]),
}

/// Planned move between two screens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Screen,
    pub to: Screen,
    pub effects: Vec<TransitionEffect>,
}

impl Transition {
    /// Lines announced once the new screen has rendered
    pub fn announcements(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.effects.iter().flat_map(|effect| {
            let lines: &'static [&'static str] = match effect {
                TransitionEffect::Announce(lines) => *lines,
                _ => &[],
            };
            lines.iter().copied()
        })
    }
}

/// Plan the move from `current` to `requested`.
///
/// Every screen can reach every screen. Re-entering the current screen
/// has no effects.
pub fn plan_transition(current: Screen, requested: Screen) -> Transition {
    let mut effects = Vec::new();

    if current != requested {
        if current == Screen::Mini {
            effects.push(TransitionEffect::RestoreClearConsole);
            effects.push(TransitionEffect::StopMiniSubscription);
            effects.push(TransitionEffect::Announce(&[MINI_EXIT_LINE]));
        }
        if requested == Screen::Mini {
            effects.push(TransitionEffect::SuspendClearConsole);
            effects.push(TransitionEffect::StartMiniSubscription);
            effects.push(TransitionEffect::Announce(&MINI_ENTER_BANNER));
        }
    }

    Transition {
        from: current,
        to: requested,
        effects,
    }
}

/// Live mini-mode subscription
#[derive(Debug)]
struct MiniSubscription {
    changes: watch::Receiver<u64>,
    last_line: Option<String>,
}

/// State behind the transition effects
#[derive(Debug, Default)]
pub struct ScreenStateMachine {
    saved_clear_console: Option<bool>,
    mini: Option<MiniSubscription>,
}

impl ScreenStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mini_active(&self) -> bool {
        self.mini.is_some()
    }

    /// Apply the state effects of `transition` (announcements are left to
    /// the caller, which prints them after the forced render)
    pub fn apply(
        &mut self,
        transition: &Transition,
        store: &UiStateStore,
        provider: &dyn SnapshotProvider,
    ) {
        for effect in &transition.effects {
            match effect {
                TransitionEffect::SuspendClearConsole => {
                    let mut previous = true;
                    store.update(|s| {
                        previous = s.allow_clear_console;
                        s.allow_clear_console = false;
                    });
                    self.saved_clear_console = Some(previous);
                }
                TransitionEffect::RestoreClearConsole => {
                    let restored = self.saved_clear_console.take().unwrap_or(true);
                    store.update(|s| s.allow_clear_console = restored);
                }
                TransitionEffect::StartMiniSubscription => {
                    let mut changes = provider.subscribe();
                    // Only changes after entry count; entry renders on its own
                    let _ = changes.borrow_and_update();
                    self.mini = Some(MiniSubscription {
                        changes,
                        last_line: None,
                    });
                    debug!(screen = %transition.to, "Mini subscription started");
                }
                TransitionEffect::StopMiniSubscription => {
                    if self.mini.take().is_some() {
                        debug!(screen = %transition.from, "Mini subscription stopped");
                    }
                }
                TransitionEffect::Announce(_) => {}
            }
        }
    }

    /// Resolves on the next snapshot change while mini mode is live.
    ///
    /// Returns `None` when there is no subscription or the provider went
    /// away; the subscription is dropped in the latter case.
    pub async fn mini_changed(&mut self) -> Option<()> {
        let subscription = self.mini.as_mut()?;
        match subscription.changes.changed().await {
            Ok(()) => Some(()),
            Err(_) => {
                self.mini = None;
                None
            }
        }
    }

    /// Record `line` as the latest mini line; false if it repeats the
    /// previous one
    pub fn accept_mini_line(&mut self, line: &str) -> bool {
        match self.mini.as_mut() {
            Some(subscription) => {
                if subscription.last_line.as_deref() == Some(line) {
                    return false;
                }
                subscription.last_line = Some(line.to_string());
                true
            }
            None => true,
        }
    }

    /// Drop every live subscription (shutdown)
    pub fn stop_subscriptions(&mut self) {
        self.mini = None;
    }
}
