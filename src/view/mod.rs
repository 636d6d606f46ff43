//! View module - UI rendering
//!
//! - `utils`: Shared helpers (time formatting, popup geometry)
//! - `layout`: Top bar and now-playing panel
//! - `queue`: Queue panel
//! - `visualizer`: Spectrum bars
//! - `progress`: Progress bar
//! - `overlays`: Notification toast and help popup

mod utils;
mod layout;
mod queue;
mod visualizer;
mod progress;
mod overlays;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::model::{PlaybackState, QueueView, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, playback: &PlaybackState, queue: &QueueView, ui_state: &UiState, bars: &[f32]) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Command bar + device
                Constraint::Min(0),    // Main area
                Constraint::Length(3), // Progress bar with playback info
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state);

        if ui_state.fullscreen_visualizer {
            visualizer::render_visualizer(frame, chunks[1], bars, true);
        } else {
            let main_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(chunks[1]);

            if ui_state.show_queue {
                queue::render_queue(frame, main_chunks[0], queue, ui_state.queue_selected);
            } else {
                layout::render_now_playing(frame, main_chunks[0], playback);
            }
            visualizer::render_visualizer(frame, main_chunks[1], bars, false);
        }

        progress::render_progress_bar(frame, chunks[2], playback);

        if let Some(notification) = &ui_state.notification {
            overlays::render_notification(frame, notification);
        }

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MediaKind, Notification, NotificationLevel, PlayerState, Track};
    use ratatui::{Terminal, backend::TestBackend};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn renders_track_progress_and_toast() {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        let mut playback = PlaybackState::default();
        playback.track = Some(Track {
            id: 42,
            kind: MediaKind::Song,
            title: "Blue".to_string(),
            subtitle: "Joni Mitchell".to_string(),
            audio_url: String::new(),
            cover_url: String::new(),
            duration: Some(200.0),
            lyrics: Some("Blue, songs are like tattoos".to_string()),
        });
        playback.duration = Some(200.0);
        playback.elapsed = 30.0;
        playback.state = PlayerState::Playing;
        playback.is_playing = true;

        let ui = UiState {
            notification: Some(Notification::new("Now playing: Blue", NotificationLevel::Success)),
            device_name: "mediaplayer-rs@test".to_string(),
            server_label: "localhost".to_string(),
            ..UiState::default()
        };

        terminal
            .draw(|f| AppView::render(f, &playback, &QueueView::default(), &ui, &[0.5; 64]))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("0:30 / 3:20"));
        assert!(text.contains("Now playing: Blue"));
        assert!(text.contains("songs are like tattoos"));
        assert!(text.contains("Vol: 70%"));
    }

    #[test]
    fn unreachable_server_is_flagged_in_top_bar() {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        let ui = UiState {
            server_label: "localhost".to_string(),
            server_unreachable: true,
            ..UiState::default()
        };
        terminal
            .draw(|f| AppView::render(f, &PlaybackState::default(), &QueueView::default(), &ui, &[]))
            .unwrap();
        assert!(screen_text(&terminal).contains("localhost (offline)"));
    }

    #[test]
    fn help_and_queue_render_on_tiny_terminal() {
        let mut terminal = Terminal::new(TestBackend::new(30, 10)).unwrap();
        let ui = UiState {
            show_help_popup: true,
            show_queue: true,
            ..UiState::default()
        };
        terminal
            .draw(|f| AppView::render(f, &PlaybackState::default(), &QueueView::default(), &ui, &[]))
            .unwrap();
    }
}
