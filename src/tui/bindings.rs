//! Built-in key bindings
//!
//! | Chord         | Action                              |
//! |---------------|-------------------------------------|
//! | `m`           | toggle mini mode                    |
//! | `c` `w` `l`   | config / wallet / logs screen       |
//! | `escape`      | back to main                        |
//! | arrows        | move the trade-table cursor         |
//! | `ctrl+s`      | open the first wallet in explorer   |
//! | `ctrl+e`      | execute the most recent route       |
//! | `ctrl+c`      | stop the bot and quit               |
//!
//! Bindings registered later (e.g. through `DashboardHandle::on_key_press`)
//! replace these.

use tracing::warn;

use super::keyboard::{Chord, KeyboardDispatcher};
use super::state::{CursorMove, Screen};
use crate::core::{BotCommand, BotStatus};

/// Printed once on ctrl+c
pub const EXIT_MESSAGE: &str = "Exiting by user request...";

/// Line to repeat on the restored terminal once the dashboard is gone.
///
/// The copy written by the ctrl+c binding lands on the alternate screen,
/// which is discarded when the terminal is restored.
pub fn exit_notice(status: BotStatus) -> Option<&'static str> {
    matches!(status, BotStatus::Stopping | BotStatus::Stopped).then_some(EXIT_MESSAGE)
}

pub fn register_builtin_bindings(keyboard: &mut KeyboardDispatcher) {
    keyboard.on_key_press(Chord::key("m"), |ctx| {
        ctx.toggle_mini();
        Ok(())
    });

    for (key, screen) in [
        ("c", Screen::Config),
        ("w", Screen::Wallet),
        ("l", Screen::Logs),
        ("escape", Screen::Main),
    ] {
        keyboard.on_key_press(Chord::key(key), move |ctx| {
            ctx.set_current_screen(screen);
            Ok(())
        });
    }

    for (key, movement) in [
        ("up", CursorMove::Up),
        ("down", CursorMove::Down),
        ("left", CursorMove::Left),
        ("right", CursorMove::Right),
    ] {
        keyboard.on_key_press(Chord::key(key), move |ctx| {
            ctx.move_cursor(movement);
            Ok(())
        });
    }

    keyboard.on_key_press(Chord::ctrl("s"), |ctx| {
        // No wallet yet is expected early on; nothing to open
        if let Err(e) = ctx.open_wallet_explorer() {
            warn!(event_type = "EXPLORER_UNAVAILABLE", error = %e, "Cannot open wallet explorer");
        }
        Ok(())
    });

    keyboard.on_key_press(Chord::ctrl("e"), |ctx| {
        ctx.send_command(BotCommand::ExecuteRecentRoute);
        Ok(())
    });

    keyboard.on_key_press(Chord::ctrl("c"), |ctx| {
        ctx.send_command(BotCommand::Stop);
        ctx.announce(EXIT_MESSAGE);
        ctx.request_shutdown();
        Ok(())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SnapshotProvider, WalletInfo};
    use crate::tui::app::test_support::TestContext;

    fn keyboard() -> KeyboardDispatcher {
        let mut keyboard = KeyboardDispatcher::new();
        register_builtin_bindings(&mut keyboard);
        keyboard
    }

    #[test]
    fn test_all_builtin_chords_bound() {
        let keyboard = keyboard();
        for chord in [
            "m", "c", "w", "l", "escape", "up", "down", "left", "right", "ctrl+s", "ctrl+e",
            "ctrl+c",
        ] {
            let chord: Chord = chord.parse().unwrap();
            assert!(keyboard.is_bound(&chord), "{} not bound", chord);
        }
        assert_eq!(keyboard.len(), 12);
    }

    #[test]
    fn test_screen_keys() {
        let mut keyboard = keyboard();
        let mut t = TestContext::new();

        keyboard.dispatch(&Chord::key("w"), &mut t.ctx);
        assert_eq!(t.ctx.current_screen(), Screen::Wallet);
        keyboard.dispatch(&Chord::key("l"), &mut t.ctx);
        assert_eq!(t.ctx.current_screen(), Screen::Logs);
        keyboard.dispatch(&Chord::key("escape"), &mut t.ctx);
        assert_eq!(t.ctx.current_screen(), Screen::Main);
        keyboard.dispatch(&Chord::key("m"), &mut t.ctx);
        assert_eq!(t.ctx.current_screen(), Screen::Mini);
        keyboard.dispatch(&Chord::key("c"), &mut t.ctx);
        assert_eq!(t.ctx.current_screen(), Screen::Config);
        assert!(t.ctx.ui().get_state().allow_clear_console);
    }

    #[test]
    fn test_ctrl_s_without_wallet_is_harmless() {
        let mut keyboard = keyboard();
        let mut t = TestContext::new();
        let before = t.ctx.ui().get_state();

        let outcome = keyboard.dispatch(&Chord::ctrl("s"), &mut t.ctx);

        assert!(matches!(outcome, crate::tui::keyboard::DispatchOutcome::Handled));
        assert!(t.opener.urls.lock().unwrap().is_empty());
        assert_eq!(t.ctx.ui().get_state(), before);
    }

    #[test]
    fn test_ctrl_s_opens_first_wallet() {
        let mut keyboard = keyboard();
        let mut t = TestContext::new();
        t.bot.update(|s| {
            s.wallets.push(WalletInfo {
                address: "So1anaWa11et".into(),
                label: None,
                balances: vec![],
            })
        });

        keyboard.dispatch(&Chord::ctrl("s"), &mut t.ctx);

        assert_eq!(
            *t.opener.urls.lock().unwrap(),
            vec!["https://solscan.io/address/So1anaWa11et".to_string()]
        );
    }

    #[test]
    fn test_ctrl_c_stops_bot_and_requests_shutdown() {
        let mut keyboard = keyboard();
        let mut t = TestContext::new();

        keyboard.dispatch(&Chord::ctrl("c"), &mut t.ctx);

        assert_eq!(t.commands.try_recv().unwrap(), BotCommand::Stop);
        assert_eq!(t.bot.snapshot().status, BotStatus::Stopping);
        assert_eq!(t.surface.writes(), vec![format!("{}\n", EXIT_MESSAGE)]);
        assert!(t.ctx.is_shutdown_requested());
    }

    #[test]
    fn test_exit_notice_after_stop() {
        let mut keyboard = keyboard();
        let mut t = TestContext::new();
        assert_eq!(exit_notice(t.bot.snapshot().status), None);

        keyboard.dispatch(&Chord::ctrl("c"), &mut t.ctx);
        assert_eq!(exit_notice(t.bot.snapshot().status), Some(EXIT_MESSAGE));
        assert_eq!(exit_notice(BotStatus::Stopped), Some(EXIT_MESSAGE));
        assert_eq!(exit_notice(BotStatus::Running), None);
    }

    #[test]
    fn test_ctrl_e_executes_recent_route() {
        let mut keyboard = keyboard();
        let mut t = TestContext::new();
        keyboard.dispatch(&Chord::ctrl("e"), &mut t.ctx);
        assert_eq!(
            t.commands.try_recv().unwrap(),
            BotCommand::ExecuteRecentRoute
        );
    }
}
