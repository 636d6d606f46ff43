//! Controller module - playback logic and event handling
//!
//! [`PlaybackClient`] is the single owner of playback state writes. It is
//! organized into submodules by responsibility:
//!
//! - `playback`: Transport controls (play/pause/stop/seek/speed/volume)
//! - `queue`: Next/previous/shuffle/repeat and queue selection
//! - `sync`: Progress tick, periodic server sync, end of track, preferences
//! - `events`: `media:*` event broadcasting
//! - `action`: Input-independent [`Action`] values and their dispatch
//! - `input`: Key event to [`Action`] mapping
//! - `visualizer`: Frame loop feeding the spectrum bars

mod action;
mod events;
mod input;
mod playback;
mod queue;
mod sync;
mod visualizer;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::audio::MediaElement;
use crate::config::ClientConfig;
use crate::error::PlayerError;
use crate::model::{AppModel, NotificationLevel, PreferencesStore, SessionServer};

pub use events::MediaEvent;
pub use visualizer::VisualizerDriver;

const EVENT_CHANNEL_CAPACITY: usize = 64;

pub struct PlaybackClient<S, M> {
    pub(crate) model: Arc<AppModel>,
    pub(crate) server: Arc<S>,
    pub(crate) element: Arc<M>,
    pub(crate) visualizer: VisualizerDriver,
    base_url: String,
    pause_on_focus_loss: bool,
    prefs_store: PreferencesStore,
    events: broadcast::Sender<MediaEvent>,
}

impl<S, M> Clone for PlaybackClient<S, M> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            server: self.server.clone(),
            element: self.element.clone(),
            visualizer: self.visualizer.clone(),
            base_url: self.base_url.clone(),
            pause_on_focus_loss: self.pause_on_focus_loss,
            prefs_store: self.prefs_store.clone(),
            events: self.events.clone(),
        }
    }
}

impl<S: SessionServer, M: MediaElement> PlaybackClient<S, M> {
    /// Wire the client up and push the restored preferences to the element.
    pub async fn new(
        model: Arc<AppModel>,
        server: Arc<S>,
        element: Arc<M>,
        config: &ClientConfig,
        prefs_store: PreferencesStore,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let visualizer = VisualizerDriver::new(element.analyser());

        let state = model.get_playback_state().await;
        element.set_volume(state.volume);
        element.set_muted(state.muted);
        element.set_playback_rate(state.rate);
        tracing::debug!(
            volume = state.volume,
            muted = state.muted,
            rate = state.rate,
            repeat = state.repeat,
            shuffle = state.shuffle,
            "Preferences applied"
        );

        Self {
            model,
            server,
            element,
            visualizer,
            base_url: config.base_url.clone(),
            pause_on_focus_loss: config.pause_on_focus_loss,
            prefs_store,
            events,
        }
    }

    pub fn model(&self) -> &Arc<AppModel> {
        &self.model
    }

    pub fn visualizer(&self) -> &VisualizerDriver {
        &self.visualizer
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.events.subscribe()
    }

    /// Surface a failed operation to the user; precondition failures stay quiet.
    pub(crate) async fn report(&self, operation: &str, error: &PlayerError) {
        if error.is_precondition() {
            tracing::debug!(operation, error = %error, "Ignored");
            return;
        }
        tracing::error!(operation, error = %error, "Operation failed");
        self.model
            .notify(Self::format_error(error), NotificationLevel::Error)
            .await;
    }

    /// Report a failed server request, then record whether the server answered.
    pub(crate) async fn observe_reply<T>(&self, operation: &str, result: &Result<T, PlayerError>) {
        if let Err(e) = result {
            self.report(operation, e).await;
        }
        track_connection(&self.model, result).await;
    }

    pub(crate) fn format_error(error: &PlayerError) -> String {
        match error {
            PlayerError::Network(_) => "Could not reach the server. Check your connection.".to_string(),
            PlayerError::Server(message) if message.starts_with("HTTP 403") => {
                "Request forbidden. Is your session still valid?".to_string()
            }
            PlayerError::Server(message) if message.starts_with("HTTP 404") => {
                "Track not found on the server.".to_string()
            }
            PlayerError::Server(message) => message.clone(),
            PlayerError::Media(message) => format!("Failed to play media: {message}"),
            PlayerError::Precondition(what) => format!("Nothing to do: {what}"),
        }
    }
}

/// Toast when the server stops or starts answering. Any reply counts, even a rejection.
pub(crate) async fn track_connection<T>(model: &AppModel, result: &Result<T, PlayerError>) {
    let reachable = !matches!(result, Err(PlayerError::Network(_)));
    if !model.set_server_reachable(reachable).await {
        return;
    }
    if reachable {
        tracing::info!("Connection restored");
        model.notify("Connection restored", NotificationLevel::Success).await;
    } else {
        tracing::warn!("Connection lost");
        model.notify("Connection lost", NotificationLevel::Warning).await;
    }
}
