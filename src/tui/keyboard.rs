//! Key chords and the keyboard dispatcher
//!
//! A chord names a key plus modifiers (`m`, `up`, `ctrl+s`). Each chord is
//! bound to at most one handler; registering a chord again replaces the
//! previous handler (last registration wins).
//!
//! Handlers run on the dashboard worker, one at a time, in arrival order.
//! A failing or panicking handler is contained here and logged; it never
//! takes the dispatcher down.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, error, trace, warn};

use super::app::DashboardContext;
use crate::error::AppError;

/// Handler bound to a chord
pub type KeyHandler = Box<dyn FnMut(&mut DashboardContext) -> anyhow::Result<()> + Send>;

/// Chord parse failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid key chord '{input}': {reason}")]
pub struct ChordParseError {
    pub input: String,
    pub reason: &'static str,
}

/// Key plus modifiers, normalized to lowercase
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chord {
    ctrl: bool,
    alt: bool,
    key: String,
}

impl Chord {
    /// Unmodified key (`"m"`, `"up"`, `"escape"`)
    pub fn key(name: &str) -> Self {
        Self {
            ctrl: false,
            alt: false,
            key: normalize_key(name),
        }
    }

    /// Key with the control modifier
    pub fn ctrl(name: &str) -> Self {
        Self {
            ctrl: true,
            ..Self::key(name)
        }
    }

    /// Same chord with the alt modifier added
    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn key_name(&self) -> &str {
        &self.key
    }

    pub fn has_ctrl(&self) -> bool {
        self.ctrl
    }

    pub fn has_alt(&self) -> bool {
        self.alt
    }
}

fn normalize_key(name: &str) -> String {
    match name.trim().to_lowercase().as_str() {
        "esc" => "escape".to_string(),
        "return" => "enter".to_string(),
        " " => "space".to_string(),
        other => other.to_string(),
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.alt {
            f.write_str("alt+")?;
        }
        f.write_str(&self.key)
    }
}

impl FromStr for Chord {
    type Err = ChordParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let fail = |reason| ChordParseError {
            input: input.to_string(),
            reason,
        };

        let mut parts: Vec<&str> = input.split('+').map(str::trim).collect();
        let key = parts.pop().filter(|k| !k.is_empty()).ok_or_else(|| fail("missing key"))?;

        let mut chord = Chord::key(key);
        for modifier in parts {
            match modifier.to_lowercase().as_str() {
                "ctrl" | "control" => chord.ctrl = true,
                "alt" | "meta" => chord.alt = true,
                "" => return Err(fail("empty modifier")),
                _ => return Err(fail("unknown modifier")),
            }
        }

        Ok(chord)
    }
}

/// Result of dispatching one chord
#[derive(Debug)]
pub enum DispatchOutcome {
    /// No handler bound; nothing happened
    Unbound,
    /// Handler ran to completion
    Handled,
    /// Handler returned an error or panicked; already logged
    Failed(AppError),
}

/// Chord → handler registry, owned by the dashboard worker
#[derive(Default)]
pub struct KeyboardDispatcher {
    bindings: HashMap<Chord, KeyHandler>,
}

impl KeyboardDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `chord`; returns true if a previous handler was replaced
    pub fn on_key_press<F>(&mut self, chord: Chord, handler: F) -> bool
    where
        F: FnMut(&mut DashboardContext) -> anyhow::Result<()> + Send + 'static,
    {
        self.register(chord, Box::new(handler))
    }

    /// Bind an already boxed handler (see `on_key_press`)
    pub fn register(&mut self, chord: Chord, handler: KeyHandler) -> bool {
        let label = chord.to_string();
        let replaced = self.bindings.insert(chord, handler).is_some();
        if replaced {
            debug!(chord = %label, "Replacing existing key binding");
        }
        replaced
    }

    pub fn is_bound(&self, chord: &Chord) -> bool {
        self.bindings.contains_key(chord)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Run the handler bound to `chord`, containing any failure
    pub fn dispatch(&mut self, chord: &Chord, ctx: &mut DashboardContext) -> DispatchOutcome {
        let Some(handler) = self.bindings.get_mut(chord) else {
            trace!(chord = %chord, "Unbound key chord ignored");
            return DispatchOutcome::Unbound;
        };

        match catch_unwind(AssertUnwindSafe(|| handler(ctx))) {
            Ok(Ok(())) => DispatchOutcome::Handled,
            Ok(Err(e)) => {
                warn!(
                    event_type = "HANDLER_FAILED",
                    chord = %chord,
                    error = %e,
                    "Key handler failed"
                );
                DispatchOutcome::Failed(AppError::Handler(format!("{}: {:#}", chord, e)))
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(
                    event_type = "HANDLER_PANICKED",
                    chord = %chord,
                    error = %reason,
                    "Key handler panicked"
                );
                DispatchOutcome::Failed(AppError::Handler(format!(
                    "{}: handler panicked: {}",
                    chord, reason
                )))
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
