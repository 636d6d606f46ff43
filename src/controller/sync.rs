//! Progress tick, background sync with the server, and preferences

use crate::audio::MediaElement;
use crate::model::{MediaKind, PlayerState, SessionServer};

use super::{PlaybackClient, track_connection};

impl<S: SessionServer, M: MediaElement> PlaybackClient<S, M> {
    /// One-second timer body: refresh elapsed time, push periodic syncs,
    /// and advance the queue when the source played out.
    pub async fn tick(&self) {
        self.model.auto_clear_old_notifications().await;

        let state = self.model.get_playback_state().await;
        if !state.is_playing || state.state != PlayerState::Playing {
            return;
        }

        if self.element.has_ended() {
            tracing::info!(track = ?state.track.as_ref().map(|t| t.id), "Track ended");
            if let Err(e) = self.step_queue(true, true).await {
                tracing::warn!(error = %e, "Could not continue after end of track");
            }
            return;
        }

        let position = self.element.current_time();
        let due = self
            .model
            .update_playback(|p| {
                p.set_elapsed(position);
                if p.take_sync_due() {
                    p.kind().map(|kind| (kind, p.elapsed, p.rate))
                } else {
                    None
                }
            })
            .await;

        if let Some((kind, position, rate)) = due {
            self.spawn_sync(kind, position, rate);
        }
    }

    /// Fire-and-forget position push. Failures are logged, never retried or shown,
    /// apart from the connection-lost toast.
    pub(crate) fn spawn_sync(&self, kind: MediaKind, position: f64, rate: f64) {
        let server = self.server.clone();
        let model = self.model.clone();
        tokio::spawn(async move {
            let result = server.sync_progress(kind, position, rate).await;
            match &result {
                Ok(()) => tracing::debug!(kind = %kind, position, rate, "Progress synced"),
                Err(e) => tracing::warn!(kind = %kind, position, error = %e, "Progress sync failed"),
            }
            track_connection(&model, &result).await;
        });
    }

    pub async fn save_preferences(&self) {
        let prefs = self.model.preferences().await;
        match self.prefs_store.save(&prefs) {
            Ok(()) => tracing::debug!(?prefs, "Preferences saved"),
            Err(e) => tracing::warn!(error = %e, "Failed to save preferences"),
        }
    }

    /// Terminal lost focus: pause if configured to.
    pub async fn on_focus_lost(&self) {
        if !self.pause_on_focus_loss || !self.model.is_playing().await {
            return;
        }
        if self.pause().await.is_ok() {
            tracing::debug!("Paused on focus loss");
            self.model.set_paused_on_blur(true).await;
        }
    }

    /// Resume only what focus loss paused.
    pub async fn on_focus_gained(&self) {
        if !self.model.paused_on_blur().await {
            return;
        }
        self.model.set_paused_on_blur(false).await;
        if self.play().await.is_ok() {
            tracing::debug!("Resumed on focus gain");
        }
    }
}
