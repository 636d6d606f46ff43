//! Queue navigation: next/previous, shuffle and repeat

use crate::audio::MediaElement;
use crate::error::PlayerError;
use crate::model::{NotificationLevel, PlayerState, SessionServer, Step, Transport};

use super::{PlaybackClient, track_connection};
use super::events::MediaEventKind;

impl<S: SessionServer, M: MediaElement> PlaybackClient<S, M> {
    pub async fn play_next(&self) -> Result<(), PlayerError> {
        self.step_queue(true, false).await
    }

    pub async fn play_previous(&self) -> Result<(), PlayerError> {
        self.step_queue(false, false).await
    }

    /// Play the queued entry at `index`; out-of-range is a no-op.
    pub async fn play_from_queue(&self, index: usize) -> Result<(), PlayerError> {
        let Some(track) = self.model.with_queue(|q| q.get(index).cloned()).await else {
            tracing::debug!(index, "Queue index out of range");
            return Ok(());
        };
        self.play_track(track.id, track.kind).await
    }

    /// Move through the queue. Shuffle only affects forward steps.
    pub(crate) async fn step_queue(&self, forward: bool, natural_end: bool) -> Result<(), PlayerError> {
        let state = self.model.get_playback_state().await;
        let step = self
            .model
            .with_queue(|q| {
                if forward && state.shuffle {
                    q.shuffle_step(&mut rand::thread_rng())
                } else if forward {
                    q.next_step(state.repeat)
                } else {
                    q.previous_step(state.repeat)
                }
            })
            .await;

        match step {
            Some(Step::Play(index)) => {
                tracing::debug!(index, forward, shuffle = state.shuffle, "Queue step");
                let result = self.play_from_queue(index).await;
                // The ended source must not be picked up again by the next tick
                if result.is_err() && natural_end && self.model.is_playing().await {
                    self.finish_queue().await;
                }
                result
            }
            Some(Step::End) if natural_end => {
                self.finish_queue().await;
                Ok(())
            }
            Some(Step::End) => {
                tracing::debug!(forward, "Queue boundary reached");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Playback ran out: the last track ended with repeat off, or the next one failed to start.
    async fn finish_queue(&self) {
        tracing::info!("Playback finished");
        let kind = self
            .model
            .update_playback(|p| {
                p.is_playing = false;
                p.elapsed = 0.0;
                p.state = PlayerState::Stopped;
                p.kind()
            })
            .await;
        self.element.pause();
        self.visualizer.stop();
        self.emit(MediaEventKind::Stop).await;

        if let Some(kind) = kind {
            let server = self.server.clone();
            let model = self.model.clone();
            tokio::spawn(async move {
                let result = server.transport(kind, Transport::Stop).await;
                if let Err(e) = &result {
                    tracing::warn!(error = %e, "Failed to report end of playback");
                }
                track_connection(&model, &result).await;
            });
        }
    }

    pub async fn toggle_repeat(&self) {
        let repeat = self
            .model
            .update_playback(|p| {
                p.repeat = !p.repeat;
                p.repeat
            })
            .await;
        self.save_preferences().await;
        self.model
            .notify(
                if repeat { "Repeat on" } else { "Repeat off" },
                NotificationLevel::Info,
            )
            .await;
    }

    pub async fn toggle_shuffle(&self) {
        let shuffle = self
            .model
            .update_playback(|p| {
                p.shuffle = !p.shuffle;
                p.shuffle
            })
            .await;
        self.save_preferences().await;
        self.model
            .notify(
                if shuffle { "Shuffle on" } else { "Shuffle off" },
                NotificationLevel::Info,
            )
            .await;
    }
}
