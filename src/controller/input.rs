//! Key event handling

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::audio::MediaElement;
use crate::config::SEEK_STEP_SECS;
use crate::model::{InputMode, SessionServer, UiState};

use super::PlaybackClient;
use super::action::Action;

/// Translate a key press into an [`Action`] for the current UI state.
pub fn map_key(key: &KeyEvent, ui: &UiState) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    // Command line swallows everything
    if ui.input_mode == InputMode::Command {
        return match key.code {
            KeyCode::Enter => Some(Action::SubmitCommand),
            KeyCode::Esc => Some(Action::CancelCommand),
            KeyCode::Backspace => Some(Action::CommandBackspace),
            KeyCode::Char(c) => Some(Action::CommandChar(c)),
            _ => None,
        };
    }

    if ui.show_help_popup {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => Some(Action::CloseHelp),
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(Action::Quit),
            _ => None,
        };
    }

    if ui.show_queue {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => return Some(Action::QueueUp),
            KeyCode::Down | KeyCode::Char('j') => return Some(Action::QueueDown),
            KeyCode::Enter => return Some(Action::PlaySelected),
            KeyCode::Esc => return Some(Action::ToggleQueuePanel),
            _ => {}
        }
    }

    match key.code {
        KeyCode::Esc if ui.notification.is_some() => Some(Action::DismissNotification),
        KeyCode::Esc if ui.fullscreen_visualizer => Some(Action::ToggleFullscreen),
        KeyCode::Char(' ') => Some(Action::TogglePlayback),
        KeyCode::Right => Some(Action::Forward(SEEK_STEP_SECS)),
        KeyCode::Left => Some(Action::Rewind(SEEK_STEP_SECS)),
        KeyCode::Up => Some(Action::VolumeUp),
        KeyCode::Down => Some(Action::VolumeDown),
        KeyCode::Char(']') => Some(Action::SpeedUp),
        KeyCode::Char('[') => Some(Action::SpeedDown),
        KeyCode::Char(c @ '0'..='9') => {
            let tenth = c.to_digit(10).unwrap_or(0);
            Some(Action::SeekFraction(f64::from(tenth) / 10.0))
        }
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'n' => Some(Action::Next),
            'p' => Some(Action::Previous),
            'm' => Some(Action::ToggleMute),
            'r' => Some(Action::ToggleRepeat),
            's' => Some(Action::ToggleShuffle),
            'f' => Some(Action::ToggleFullscreen),
            'x' => Some(Action::Stop),
            'u' => Some(Action::ToggleQueuePanel),
            'h' | '?' => Some(Action::ToggleHelp),
            ':' => Some(Action::EnterCommand),
            'q' => Some(Action::Quit),
            _ => None,
        },
        _ => None,
    }
}

impl<S: SessionServer, M: MediaElement> PlaybackClient<S, M> {
    pub async fn handle_key_event(&self, key: KeyEvent) {
        let ui = self.model.get_ui_state().await;
        if let Some(action) = map_key(&key, &ui) {
            self.dispatch(action).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Notification, NotificationLevel};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn player_shortcuts() {
        let ui = UiState::default();
        assert_eq!(map_key(&press(KeyCode::Char(' ')), &ui), Some(Action::TogglePlayback));
        assert_eq!(map_key(&press(KeyCode::Right), &ui), Some(Action::Forward(10.0)));
        assert_eq!(map_key(&press(KeyCode::Left), &ui), Some(Action::Rewind(10.0)));
        assert_eq!(map_key(&press(KeyCode::Up), &ui), Some(Action::VolumeUp));
        assert_eq!(map_key(&press(KeyCode::Char('N')), &ui), Some(Action::Next));
        assert_eq!(map_key(&press(KeyCode::Char('p')), &ui), Some(Action::Previous));
        assert_eq!(map_key(&press(KeyCode::Char('m')), &ui), Some(Action::ToggleMute));
        assert_eq!(map_key(&press(KeyCode::Char('R')), &ui), Some(Action::ToggleRepeat));
        assert_eq!(map_key(&press(KeyCode::Char('s')), &ui), Some(Action::ToggleShuffle));
        assert_eq!(map_key(&press(KeyCode::Char('f')), &ui), Some(Action::ToggleFullscreen));
        assert_eq!(map_key(&press(KeyCode::Char('7')), &ui), Some(Action::SeekFraction(0.7)));
        assert_eq!(map_key(&press(KeyCode::Char(':')), &ui), Some(Action::EnterCommand));
        assert_eq!(map_key(&press(KeyCode::Tab), &ui), None);
    }

    #[test]
    fn command_mode_captures_letters() {
        let ui = UiState {
            input_mode: InputMode::Command,
            ..UiState::default()
        };
        assert_eq!(map_key(&press(KeyCode::Char('q')), &ui), Some(Action::CommandChar('q')));
        assert_eq!(map_key(&press(KeyCode::Enter), &ui), Some(Action::SubmitCommand));
        assert_eq!(map_key(&press(KeyCode::Esc), &ui), Some(Action::CancelCommand));
        assert_eq!(
            map_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), &ui),
            Some(Action::Quit)
        );
    }

    #[test]
    fn overlays_take_precedence() {
        let help = UiState {
            show_help_popup: true,
            ..UiState::default()
        };
        assert_eq!(map_key(&press(KeyCode::Char(' ')), &help), None);
        assert_eq!(map_key(&press(KeyCode::Esc), &help), Some(Action::CloseHelp));

        let queue = UiState {
            show_queue: true,
            ..UiState::default()
        };
        assert_eq!(map_key(&press(KeyCode::Down), &queue), Some(Action::QueueDown));
        assert_eq!(map_key(&press(KeyCode::Enter), &queue), Some(Action::PlaySelected));
        assert_eq!(map_key(&press(KeyCode::Char(' ')), &queue), Some(Action::TogglePlayback));

        let toast = UiState {
            notification: Some(Notification::new("x", NotificationLevel::Info)),
            ..UiState::default()
        };
        assert_eq!(map_key(&press(KeyCode::Esc), &toast), Some(Action::DismissNotification));
    }

    #[test]
    fn releases_are_ignored() {
        let mut key = press(KeyCode::Char(' '));
        key.kind = KeyEventKind::Release;
        assert_eq!(map_key(&key, &UiState::default()), None);
    }
}
