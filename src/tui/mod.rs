//! Terminal dashboard
//!
//! # Module Architecture
//! - `state`: UI state and its atomic store
//! - `keyboard`: chords and the key dispatcher
//! - `screens`: screen transitions and render cadence
//! - `view`: frame composition
//! - `app`: the context handlers and the render loop act on
//! - `runtime`: the worker task and its handle
//! - `event`: crossterm input forwarding
//! - `terminal`: raw mode / alternate screen guard
//!
//! # Keyboard Controls
//! - `m`: toggle mini mode
//! - `c` / `w` / `l`: config, wallet, logs screens; `Esc`: main
//! - arrows: move the trade-table cursor
//! - `Ctrl+S`: open wallet in explorer
//! - `Ctrl+E`: execute recent route
//! - `Ctrl+C`: stop the bot and quit

pub mod app;
pub mod bindings;
pub mod event;
pub mod keyboard;
pub mod logging;
pub mod runtime;
pub mod screens;
pub mod state;
pub mod surface;
pub mod terminal;
pub mod view;

pub use app::{DashboardContext, RenderStatsSnapshot};
pub use keyboard::{Chord, ChordParseError, DispatchOutcome, KeyHandler, KeyboardDispatcher};
pub use logging::DashboardLogLayer;
pub use runtime::{Dashboard, DashboardEvent, DashboardHandle};
pub use screens::{plan_transition, RenderCadence, Transition, TransitionEffect};
pub use state::{Cursor, CursorBounds, CursorMove, Screen, UiState, UiStateStore};
pub use surface::{BufferSurface, LinkOpener, OutputSurface, SurfaceOp, SystemLinkOpener, TerminalSurface};
pub use view::{CompositionError, ViewComposer};
