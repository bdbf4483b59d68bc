//! Dashboard UI state and its store
//!
//! `UiState` is the only mutable state shared between the render loop,
//! the key handlers and the screen state machine. It is never written in
//! place: `UiStateStore::set_state` applies an updater to a draft copy and
//! publishes the draft only if the updater succeeds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::constants::TRADE_TABLE_COLUMNS;

/// Screens of the dashboard (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    #[default]
    Main,
    Mini,
    Config,
    Wallet,
    Logs,
}

impl Screen {
    /// Every screen, in tab order
    pub const ALL: [Screen; 5] = [
        Screen::Main,
        Screen::Mini,
        Screen::Config,
        Screen::Wallet,
        Screen::Logs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Main => "main",
            Screen::Mini => "mini",
            Screen::Config => "config",
            Screen::Wallet => "wallet",
            Screen::Logs => "logs",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-step cursor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Up,
    Down,
    Left,
    Right,
}

/// Inclusive upper bounds for the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorBounds {
    pub x_max: usize,
    pub y_max: usize,
}

impl CursorBounds {
    /// Bounds of the trade history table for `rows` entries
    pub fn trade_table(rows: usize) -> Self {
        Self {
            x_max: TRADE_TABLE_COLUMNS.len() - 1,
            y_max: rows.saturating_sub(1),
        }
    }
}

/// Table cursor; only ever moved one step at a time within bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    x: usize,
    y: usize,
}

impl Cursor {
    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    /// Move one step, staying inside `[0, x_max] × [0, y_max]`.
    ///
    /// Bounds can shrink between steps (e.g. fewer table rows), so the
    /// result is clamped as well.
    pub fn step(&mut self, movement: CursorMove, bounds: CursorBounds) {
        match movement {
            CursorMove::Up => self.y = self.y.saturating_sub(1),
            CursorMove::Down => self.y = self.y.saturating_add(1),
            CursorMove::Left => self.x = self.x.saturating_sub(1),
            CursorMove::Right => self.x = self.x.saturating_add(1),
        }
        self.clamp(bounds);
    }

    /// Pull the cursor back inside `bounds` (table shrank since last move)
    pub fn clamp(&mut self, bounds: CursorBounds) {
        self.x = self.x.min(bounds.x_max);
        self.y = self.y.min(bounds.y_max);
    }
}

/// Ephemeral view state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub current_screen: Screen,
    pub allow_clear_console: bool,
    pub cursor: Cursor,
}

impl UiState {
    pub fn new(allow_clear_console: bool) -> Self {
        Self {
            current_screen: Screen::Main,
            allow_clear_console,
            cursor: Cursor::default(),
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Atomic UI state store shared by clone
#[derive(Debug, Clone, Default)]
pub struct UiStateStore {
    inner: Arc<Mutex<UiState>>,
}

impl UiStateStore {
    pub fn new(initial: UiState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial)),
        }
    }

    /// Consistent point-in-time copy
    pub fn get_state(&self) -> UiState {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply a fallible updater atomically.
    ///
    /// Concurrent callers are serialized. The updater works on a draft; on
    /// `Err` (or panic) the published state is left untouched and the
    /// error (or panic) reaches the caller.
    pub fn set_state<F, E>(&self, updater: F) -> Result<(), E>
    where
        F: FnOnce(&mut UiState) -> Result<(), E>,
    {
        // A panicking updater poisons the mutex, but the published value
        // was never touched, so recovering the guard is sound.
        let mut published = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let mut draft = published.clone();
        updater(&mut draft)?;
        *published = draft;
        Ok(())
    }

    /// Apply an infallible updater atomically
    pub fn update<F>(&self, updater: F)
    where
        F: FnOnce(&mut UiState),
    {
        let _ = self.set_state(|draft| {
            updater(draft);
            Ok::<(), std::convert::Infallible>(())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_bounds() -> CursorBounds {
        CursorBounds {
            x_max: 1_000,
            y_max: 1_000,
        }
    }

    #[test]
    fn test_ui_state_defaults() {
        let state = UiState::default();
        assert_eq!(state.current_screen, Screen::Main);
        assert!(state.allow_clear_console);
        assert_eq!(state.cursor, Cursor::default());
    }

    #[test]
    fn test_screen_display_and_serde() {
        assert_eq!(Screen::Wallet.to_string(), "wallet");
        let screen: Screen = serde_yaml::from_str("mini").unwrap();
        assert_eq!(screen, Screen::Mini);
        assert_eq!(Screen::ALL.len(), 5);
    }

    #[test]
    fn test_cursor_left_burst_at_zero() {
        let mut cursor = Cursor::default();
        for _ in 0..100 {
            cursor.step(CursorMove::Left, CursorBounds::trade_table(5));
        }
        assert_eq!(cursor.x(), 0);
    }

    #[test]
    fn test_cursor_right_stops_at_last_column() {
        let mut cursor = Cursor::default();
        for _ in 0..100 {
            cursor.step(CursorMove::Right, CursorBounds::trade_table(5));
        }
        assert_eq!(cursor.x(), 7);
    }

    #[test]
    fn test_cursor_down_with_empty_table_stays_at_zero() {
        let mut cursor = Cursor::default();
        cursor.step(CursorMove::Down, CursorBounds::trade_table(0));
        assert_eq!(cursor.y(), 0);
    }

    #[test]
    fn test_cursor_clamped_when_bounds_shrink() {
        let mut cursor = Cursor::default();
        for _ in 0..9 {
            cursor.step(CursorMove::Down, CursorBounds::trade_table(10));
        }
        assert_eq!(cursor.y(), 9);

        cursor.step(CursorMove::Left, CursorBounds::trade_table(3));
        assert_eq!(cursor.y(), 2);
    }

    #[test]
    fn test_cursor_clamp_without_moving() {
        let mut cursor = Cursor::default();
        for _ in 0..30 {
            cursor.step(CursorMove::Down, CursorBounds::trade_table(50));
            cursor.step(CursorMove::Right, CursorBounds::trade_table(50));
        }
        assert_eq!((cursor.x(), cursor.y()), (7, 30));

        cursor.clamp(CursorBounds::trade_table(3));
        assert_eq!((cursor.x(), cursor.y()), (7, 2));

        cursor.clamp(CursorBounds::trade_table(0));
        assert_eq!(cursor.y(), 0);
    }

    #[test]
    fn test_set_state_publishes_on_ok() {
        let store = UiStateStore::default();
        store.update(|s| s.current_screen = Screen::Logs);
        assert_eq!(store.get_state().current_screen, Screen::Logs);
    }

    #[test]
    fn test_set_state_error_preserves_prior_state() {
        let store = UiStateStore::default();
        let result: Result<(), &str> = store.set_state(|s| {
            s.current_screen = Screen::Config;
            s.allow_clear_console = false;
            Err("rejected")
        });

        assert_eq!(result, Err("rejected"));
        assert_eq!(store.get_state(), UiState::default());
    }

    #[test]
    fn test_set_state_panic_preserves_prior_state() {
        let store = UiStateStore::default();
        let store_clone = store.clone();

        let result = std::thread::spawn(move || {
            store_clone.update(|s| {
                s.current_screen = Screen::Wallet;
                panic!("updater blew up");
            });
        })
        .join();

        assert!(result.is_err());
        assert_eq!(store.get_state().current_screen, Screen::Main);

        // Store stays usable after the panic
        store.update(|s| s.current_screen = Screen::Config);
        assert_eq!(store.get_state().current_screen, Screen::Config);
    }

    // =========================================================================
    // Property-based tests (proptest)
    // =========================================================================
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn movement() -> impl Strategy<Value = CursorMove> {
            prop_oneof![
                Just(CursorMove::Up),
                Just(CursorMove::Down),
                Just(CursorMove::Left),
                Just(CursorMove::Right),
            ]
        }

        proptest! {
            #[test]
            fn cursor_never_leaves_bounds(
                moves in prop::collection::vec(movement(), 0..300),
                x_max in 0usize..10,
                y_max in 0usize..10,
            ) {
                let bounds = CursorBounds { x_max, y_max };
                let mut cursor = Cursor::default();
                for mv in moves {
                    cursor.step(mv, bounds);
                    prop_assert!(cursor.x() <= x_max);
                    prop_assert!(cursor.y() <= y_max);
                }
            }

            #[test]
            fn concurrent_updates_equal_sequential_composition(
                per_thread in prop::collection::vec(
                    prop::collection::vec(movement(), 1..40),
                    2..6,
                ),
            ) {
                let store = UiStateStore::default();
                let applied = Arc::new(Mutex::new(Vec::new()));

                let handles: Vec<_> = per_thread
                    .into_iter()
                    .map(|moves| {
                        let store = store.clone();
                        let applied = Arc::clone(&applied);
                        std::thread::spawn(move || {
                            for mv in moves {
                                // Recorded inside the updater, i.e. in the
                                // order the store actually applied them
                                store.update(|s| {
                                    s.cursor.step(mv, wide_bounds());
                                    applied.lock().unwrap().push(mv);
                                });
                                std::thread::yield_now();
                            }
                        })
                    })
                    .collect();

                for handle in handles {
                    handle.join().unwrap();
                }

                let mut expected = Cursor::default();
                for mv in applied.lock().unwrap().iter() {
                    expected.step(*mv, wide_bounds());
                }

                prop_assert_eq!(store.get_state().cursor, expected);
            }
        }
    }
}
