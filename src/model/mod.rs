//! Model module - Application state and data types
//!
//! - `types`: Core enums and UI state
//! - `track`: Track metadata and the server's track payload
//! - `playback`: The per-session playback record
//! - `queue`: Client-side play queue
//! - `preferences`: Persisted volume/speed/repeat/shuffle/mute
//! - `session_client`: HTTP contract with the playback session endpoints
//! - `app_model`: Main application model with state management methods

mod types;
mod track;
mod playback;
mod queue;
mod preferences;
mod session_client;
mod app_model;

pub use types::{InputMode, MediaKind, Notification, NotificationLevel, PlayerState, UiState};

pub use track::Track;
#[cfg(test)]
pub use track::TrackPayload;

pub use playback::{PlaybackState, clamp_rate, clamp_volume};

pub use queue::Step;

pub use preferences::{Preferences, PreferencesStore};

pub use session_client::{HttpSessionClient, SeekDirection, SessionServer, Transport};

pub use app_model::{AppModel, QueueView};
