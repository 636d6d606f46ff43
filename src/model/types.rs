//! Core type definitions for the application

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::config::NOTIFICATION_TTL;

/// What kind of media a track is; selects the endpoint family on the server
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Song,
    #[serde(rename = "podcast")]
    Episode,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Song => "song",
            MediaKind::Episode => "podcast",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "song" | "s" => Some(MediaKind::Song),
            "episode" | "podcast" | "e" => Some(MediaKind::Episode),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session lifecycle
///
/// `Idle → Loading → Ready → Playing ⇄ Paused → Stopped`, with
/// `Loading → Error → Idle` when the source fails to load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerState {
    #[default]
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Stopped,
    Error,
}

impl PlayerState {
    pub fn label(self) -> &'static str {
        match self {
            PlayerState::Idle => "Idle",
            PlayerState::Loading => "Loading",
            PlayerState::Ready => "Ready",
            PlayerState::Playing => "Playing",
            PlayerState::Paused => "Paused",
            PlayerState::Stopped => "Stopped",
            PlayerState::Error => "Error",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient toast shown over the UI
#[derive(Clone, Debug)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub created: Instant,
    pub shown_at: DateTime<Local>,
}

impl Notification {
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            message: message.into(),
            level,
            created: Instant::now(),
            shown_at: Local::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created.elapsed() > NOTIFICATION_TTL
    }
}

/// Which input surface receives key presses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Command,
}

/// UI state for the application
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub input_mode: InputMode,
    pub command_input: String,
    pub notification: Option<Notification>,
    pub loading: bool,
    pub show_queue: bool,
    pub queue_selected: usize,
    pub show_help_popup: bool,
    pub fullscreen_visualizer: bool,
    pub device_name: String,
    pub server_label: String,
    /// Whether playback was paused because the terminal lost focus
    pub paused_on_blur: bool,
    /// The last server request got no reply at all
    pub server_unreachable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_parses_command_aliases() {
        assert_eq!(MediaKind::parse("song"), Some(MediaKind::Song));
        assert_eq!(MediaKind::parse("Episode"), Some(MediaKind::Episode));
        assert_eq!(MediaKind::parse("podcast"), Some(MediaKind::Episode));
        assert_eq!(MediaKind::parse("album"), None);
    }

    #[test]
    fn media_kind_serializes_like_the_web_events() {
        assert_eq!(serde_json::to_string(&MediaKind::Song).unwrap(), "\"song\"");
        assert_eq!(serde_json::to_string(&MediaKind::Episode).unwrap(), "\"podcast\"");
    }
}
