//! Input-independent actions and their dispatch

use crate::audio::MediaElement;
use crate::model::{MediaKind, NotificationLevel, SessionServer};

use super::PlaybackClient;

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    // Transport
    TogglePlayback,
    Play,
    Pause,
    Stop,
    Forward(f64),
    Rewind(f64),
    SeekFraction(f64),
    SpeedUp,
    SpeedDown,
    SetSpeed(f64),

    // Output
    VolumeUp,
    VolumeDown,
    ToggleMute,

    // Queue
    Next,
    Previous,
    ToggleRepeat,
    ToggleShuffle,
    PlayTrack(u64, MediaKind),
    PlayFromQueue(usize),
    ToggleQueuePanel,
    QueueUp,
    QueueDown,
    PlaySelected,

    // Display
    ToggleHelp,
    CloseHelp,
    ToggleFullscreen,
    DismissNotification,

    // Command line
    EnterCommand,
    CommandChar(char),
    CommandBackspace,
    SubmitCommand,
    CancelCommand,

    Quit,
}

/// Parse a `:` command line into an action.
///
/// `song <id>`, `episode <id>`, `queue <n>` (1-based), `speed <rate>`, `seek <percent>`,
/// plus the bare `play`, `pause`, `stop` and `quit`.
pub fn parse_command(input: &str) -> Result<Action, String> {
    let mut parts = input.split_whitespace();
    let Some(verb) = parts.next() else {
        return Err("Empty command".to_string());
    };
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(format!("Too many arguments: {input}"));
    }

    if let Some(kind) = MediaKind::parse(verb) {
        let id = arg
            .and_then(|a| a.parse::<u64>().ok())
            .ok_or_else(|| format!("Usage: {verb} <id>"))?;
        return Ok(Action::PlayTrack(id, kind));
    }

    match verb.to_ascii_lowercase().as_str() {
        "queue" | "q" => {
            let n = arg
                .and_then(|a| a.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .ok_or_else(|| "Usage: queue <position>".to_string())?;
            Ok(Action::PlayFromQueue(n - 1))
        }
        "speed" => arg
            .and_then(|a| a.trim_end_matches('x').parse::<f64>().ok())
            .map(Action::SetSpeed)
            .ok_or_else(|| "Usage: speed <rate>".to_string()),
        "seek" => arg
            .and_then(|a| a.trim_end_matches('%').parse::<f64>().ok())
            .map(|pct| Action::SeekFraction(pct / 100.0))
            .ok_or_else(|| "Usage: seek <percent>".to_string()),
        "play" if arg.is_none() => Ok(Action::Play),
        "pause" if arg.is_none() => Ok(Action::Pause),
        "stop" if arg.is_none() => Ok(Action::Stop),
        "quit" if arg.is_none() => Ok(Action::Quit),
        _ => Err(format!("Unknown command: {verb}")),
    }
}

impl<S: SessionServer, M: MediaElement> PlaybackClient<S, M> {
    /// Run one action. Failures have already been reported to the user.
    pub async fn dispatch(&self, action: Action) {
        tracing::trace!(?action, "Dispatch");
        let result = match action {
            Action::TogglePlayback => self.toggle_playback().await,
            Action::Play => self.play().await,
            Action::Pause => self.pause().await,
            Action::Stop => self.stop().await,
            Action::Forward(seconds) => self.forward(seconds).await,
            Action::Rewind(seconds) => self.rewind(seconds).await,
            Action::SeekFraction(fraction) => self.seek_to(fraction).await,
            Action::SpeedUp => self.speed_up().await,
            Action::SpeedDown => self.speed_down().await,
            Action::SetSpeed(rate) => self.set_playback_speed(rate).await,
            Action::VolumeUp => {
                self.volume_up().await;
                Ok(())
            }
            Action::VolumeDown => {
                self.volume_down().await;
                Ok(())
            }
            Action::ToggleMute => {
                self.toggle_mute().await;
                Ok(())
            }
            Action::Next => self.play_next().await,
            Action::Previous => self.play_previous().await,
            Action::ToggleRepeat => {
                self.toggle_repeat().await;
                Ok(())
            }
            Action::ToggleShuffle => {
                self.toggle_shuffle().await;
                Ok(())
            }
            Action::PlayTrack(id, kind) => self.play_track(id, kind).await,
            Action::PlayFromQueue(index) => self.play_from_queue(index).await,
            Action::ToggleQueuePanel => {
                self.model.toggle_queue_panel().await;
                Ok(())
            }
            Action::QueueUp => {
                self.model.queue_move_up().await;
                Ok(())
            }
            Action::QueueDown => {
                self.model.queue_move_down().await;
                Ok(())
            }
            Action::PlaySelected => {
                let index = self.model.selected_queue_index().await;
                self.play_from_queue(index).await
            }
            Action::ToggleHelp => {
                self.model.toggle_help_popup().await;
                Ok(())
            }
            Action::CloseHelp => {
                self.model.hide_help_popup().await;
                Ok(())
            }
            Action::ToggleFullscreen => {
                self.model.toggle_fullscreen_visualizer().await;
                Ok(())
            }
            Action::DismissNotification => {
                self.model.clear_notification().await;
                Ok(())
            }
            Action::EnterCommand => {
                self.model.enter_command_mode().await;
                Ok(())
            }
            Action::CommandChar(c) => {
                self.model.append_to_command(c).await;
                Ok(())
            }
            Action::CommandBackspace => {
                self.model.backspace_command().await;
                Ok(())
            }
            Action::CancelCommand => {
                self.model.leave_command_mode().await;
                Ok(())
            }
            Action::SubmitCommand => {
                let line = self.model.take_command().await;
                if line.trim().is_empty() {
                    return;
                }
                match parse_command(&line) {
                    // Boxed to keep the recursive future sized
                    Ok(action) => Box::pin(self.dispatch(action)).await,
                    Err(message) => {
                        self.model.notify(message, NotificationLevel::Warning).await;
                    }
                }
                Ok(())
            }
            Action::Quit => {
                self.save_preferences().await;
                self.model.set_should_quit(true).await;
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::debug!(error = %e, "Action did not complete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::model::Transport;

    #[test]
    fn parses_track_commands() {
        assert_eq!(parse_command("song 42"), Ok(Action::PlayTrack(42, MediaKind::Song)));
        assert_eq!(parse_command("  episode 7 "), Ok(Action::PlayTrack(7, MediaKind::Episode)));
        assert_eq!(parse_command("podcast 7"), Ok(Action::PlayTrack(7, MediaKind::Episode)));
        assert!(parse_command("song").is_err());
        assert!(parse_command("song abc").is_err());
    }

    #[test]
    fn parses_queue_speed_and_seek() {
        assert_eq!(parse_command("queue 2"), Ok(Action::PlayFromQueue(1)));
        assert!(parse_command("queue 0").is_err());
        assert_eq!(parse_command("speed 1.5x"), Ok(Action::SetSpeed(1.5)));
        assert_eq!(parse_command("seek 50%"), Ok(Action::SeekFraction(0.5)));
        assert_eq!(parse_command("stop"), Ok(Action::Stop));
        assert_eq!(parse_command("pause"), Ok(Action::Pause));
        assert_eq!(parse_command("play"), Ok(Action::Play));
        assert_eq!(parse_command("dance"), Err("Unknown command: dance".to_string()));
        assert!(parse_command("song 1 2").is_err());
    }

    #[tokio::test]
    async fn submitted_command_plays_the_track() {
        let h = Harness::new().await;
        h.server.add_track(MediaKind::Song, payload(8, 120.0, 0.0));

        h.client.dispatch(Action::EnterCommand).await;
        for c in "song 8".chars() {
            h.client.dispatch(Action::CommandChar(c)).await;
        }
        h.client.dispatch(Action::SubmitCommand).await;

        let state = h.client.model.get_playback_state().await;
        assert_eq!(state.track.map(|t| t.id), Some(8));
        assert!(state.is_playing);
    }

    #[tokio::test]
    async fn pause_and_play_commands_go_through_the_server() {
        let h = Harness::with_songs(&[3]).await;
        h.client.play_from_queue(0).await.unwrap();

        for line in ["pause", "play"] {
            h.client.dispatch(Action::EnterCommand).await;
            for c in line.chars() {
                h.client.dispatch(Action::CommandChar(c)).await;
            }
            h.client.dispatch(Action::SubmitCommand).await;
            if line == "pause" {
                assert!(!h.client.model.is_playing().await);
            }
        }

        assert!(h.client.model.is_playing().await);
        assert!(h.server.calls().contains(&Call::Transport(MediaKind::Song, Transport::Pause)));
        assert!(h.server.calls().contains(&Call::Transport(MediaKind::Song, Transport::Resume)));
    }

    #[tokio::test]
    async fn bad_command_warns() {
        let h = Harness::new().await;
        h.client.dispatch(Action::EnterCommand).await;
        h.client.dispatch(Action::CommandChar('x')).await;
        h.client.dispatch(Action::SubmitCommand).await;

        let note = h.client.model.get_ui_state().await.notification.unwrap();
        assert_eq!(note.level, NotificationLevel::Warning);
        assert!(h.server.calls().is_empty());
    }

    #[tokio::test]
    async fn quit_saves_preferences() {
        let h = Harness::new().await;
        h.client.dispatch(Action::Quit).await;
        assert!(h.client.model.should_quit().await);
        assert!(h.store.path().exists());
    }
}
