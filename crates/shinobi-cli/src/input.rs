use crate::config::Hotkey;
use crate::shutdown::ShutdownSignal;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use shinobi::Operation;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// What the keyboard monitor forwards to the dispatch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellEvent {
    Run(Operation),
    Quit,
}

/// Spawn a thread that turns key presses into shell events.
///
/// Bound hotkeys become `ShellEvent::Run`. Esc, `q` and Ctrl+C trigger
/// shutdown and send `ShellEvent::Quit`. The thread never touches the
/// target process; all dispatch happens on the receiving side.
pub fn spawn_keyboard_monitor(
    bindings: Vec<(Hotkey, Operation)>,
    shutdown: Arc<ShutdownSignal>,
    events: Sender<ShellEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        debug!("Keyboard monitor started");

        while !shutdown.is_shutdown() {
            // Poll with a timeout so a shutdown from elsewhere is noticed
            if event::poll(Duration::from_millis(100)).unwrap_or(false)
                && let Ok(Event::Key(key_event)) = event::read()
                && let Some(shell_event) = classify(&key_event, &bindings)
            {
                if shell_event == ShellEvent::Quit {
                    debug!("Shutdown key pressed: {:?}", key_event.code);
                    shutdown.trigger();
                }
                if events.send(shell_event).is_err() || shell_event == ShellEvent::Quit {
                    break;
                }
            }
        }

        debug!("Keyboard monitor stopped");
    })
}

fn classify(event: &KeyEvent, bindings: &[(Hotkey, Operation)]) -> Option<ShellEvent> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    if should_shutdown(event) {
        return Some(ShellEvent::Quit);
    }

    let hotkey = Hotkey::from_key_code(event.code)?;
    bindings
        .iter()
        .find(|(bound, _)| *bound == hotkey)
        .map(|(_, op)| ShellEvent::Run(*op))
}

fn should_shutdown(event: &KeyEvent) -> bool {
    match event.code {
        KeyCode::Esc => true,
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn bindings() -> Vec<(Hotkey, Operation)> {
        vec![
            (Hotkey::Function(2), Operation::ToggleStealth),
            (Hotkey::Char('p'), Operation::SavePosition),
        ]
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_bound_keys_run_operations() {
        assert_eq!(
            classify(&press(KeyCode::F(2), KeyModifiers::NONE), &bindings()),
            Some(ShellEvent::Run(Operation::ToggleStealth))
        );
        assert_eq!(
            classify(&press(KeyCode::Char('P'), KeyModifiers::SHIFT), &bindings()),
            Some(ShellEvent::Run(Operation::SavePosition))
        );
    }

    #[test]
    fn test_unbound_keys_ignored() {
        assert_eq!(
            classify(&press(KeyCode::F(3), KeyModifiers::NONE), &bindings()),
            None
        );
        assert_eq!(
            classify(&press(KeyCode::Enter, KeyModifiers::NONE), &bindings()),
            None
        );
    }

    #[test]
    fn test_quit_keys() {
        for (code, modifiers) in [
            (KeyCode::Esc, KeyModifiers::NONE),
            (KeyCode::Char('q'), KeyModifiers::NONE),
            (KeyCode::Char('Q'), KeyModifiers::SHIFT),
            (KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            assert_eq!(
                classify(&press(code, modifiers), &bindings()),
                Some(ShellEvent::Quit),
                "{code:?}"
            );
        }
    }

    #[test]
    fn test_plain_c_is_not_quit() {
        assert!(!should_shutdown(&press(KeyCode::Char('c'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_release_events_ignored() {
        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::F(2),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );
        assert_eq!(classify(&release, &bindings()), None);
    }
}
