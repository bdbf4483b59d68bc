//! Async terminal input for the dashboard
//!
//! Uses crossterm's `EventStream` (futures-based) so reading keys never
//! blocks a tokio worker thread. Key presses are converted to chords and
//! queued on the dashboard in arrival order; the dashboard decides what
//! they mean.

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::keyboard::Chord;
use super::runtime::DashboardHandle;

/// Convert a crossterm key event into a chord; `None` for keys the
/// dashboard has no name for and for key releases
pub fn chord_from_key_event(key: &KeyEvent) -> Option<Chord> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let name = match key.code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_lowercase().to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Esc => "escape".to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "pageup".to_string(),
        KeyCode::PageDown => "pagedown".to_string(),
        KeyCode::F(n) => format!("f{}", n),
        _ => return None,
    };

    let mut chord = if key.modifiers.contains(KeyModifiers::CONTROL) {
        Chord::ctrl(&name)
    } else {
        Chord::key(&name)
    };
    if key.modifiers.contains(KeyModifiers::ALT) {
        chord = chord.with_alt();
    }
    Some(chord)
}

/// Forward terminal key presses to the dashboard until shutdown.
///
/// Ends when the shutdown signal fires, the dashboard stops accepting
/// events, or the terminal input stream closes (which also stops the
/// dashboard). I/O errors are logged as warnings rather than silently
/// swallowed.
pub async fn forward_terminal_input(
    dashboard: DashboardHandle,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let mut event_stream = EventStream::new();

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Terminal input task shutting down");
                break;
            }
            maybe_event = event_stream.next() => match maybe_event {
                // Stream ended (terminal closed)
                None => {
                    warn!(event_type = "TERMINAL_CLOSED", "Terminal input stream ended");
                    dashboard.shutdown();
                    break;
                }
                Some(Err(e)) => {
                    warn!(event_type = "TERMINAL_IO_ERROR", error = %e, "Terminal I/O error during event polling");
                }
                Some(Ok(Event::Key(key))) => {
                    if let Some(chord) = chord_from_key_event(&key) {
                        if !dashboard.press(chord) {
                            break;
                        }
                    }
                }
                Some(Ok(Event::Resize(_, _))) => {
                    dashboard.request_render();
                }
                Some(Ok(_)) => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(
            chord_from_key_event(&key(KeyCode::Char('m'), KeyModifiers::NONE)),
            Some(Chord::key("m"))
        );
        assert_eq!(
            chord_from_key_event(&key(KeyCode::Esc, KeyModifiers::NONE)),
            Some(Chord::key("escape"))
        );
        assert_eq!(
            chord_from_key_event(&key(KeyCode::Left, KeyModifiers::NONE)),
            Some(Chord::key("left"))
        );
    }

    #[test]
    fn test_modified_keys() {
        assert_eq!(
            chord_from_key_event(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Chord::ctrl("c"))
        );
        // Shift only changes the character case
        assert_eq!(
            chord_from_key_event(&key(KeyCode::Char('M'), KeyModifiers::SHIFT)),
            Some(Chord::key("m"))
        );
        assert_eq!(
            chord_from_key_event(&key(
                KeyCode::Char('x'),
                KeyModifiers::CONTROL | KeyModifiers::ALT
            )),
            Some(Chord::ctrl("x").with_alt())
        );
    }

    #[test]
    fn test_release_and_unknown_keys_ignored() {
        let mut release = key(KeyCode::Char('m'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(chord_from_key_event(&release), None);
        assert_eq!(
            chord_from_key_event(&key(KeyCode::CapsLock, KeyModifiers::NONE)),
            None
        );
    }
}
