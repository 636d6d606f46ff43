//! Playback control methods

use crate::audio::MediaElement;
use crate::config::{SPEED_STEP, VOLUME_STEP};
use crate::error::PlayerError;
use crate::model::{
    MediaKind, NotificationLevel, PlayerState, SeekDirection, SessionServer, Track, Transport, clamp_rate,
    clamp_volume,
};

use super::PlaybackClient;
use super::events::MediaEventKind;

/// Round to two decimals so repeated steps don't drift
fn snap(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl<S: SessionServer, M: MediaElement> PlaybackClient<S, M> {
    /// Ask the server to start `id`, then load and play it locally.
    pub async fn play_track(&self, id: u64, kind: MediaKind) -> Result<(), PlayerError> {
        tracing::info!(id, kind = %kind, "Play track requested");
        self.model.set_loading(true).await;

        let result = self.server.play(id, kind).await;
        self.observe_reply("play_track", &result).await;
        let payload = match result {
            Ok(payload) => payload,
            Err(e) => {
                self.model.set_loading(false).await;
                return Err(e);
            }
        };

        let resume = payload.resume_position();
        let rate = match payload.playback_speed {
            Some(speed) if speed.is_finite() && speed > 0.0 => clamp_rate(speed),
            _ => self.model.get_playback_state().await.rate,
        };
        let track = payload.into_track(kind, &self.base_url);

        let index = self
            .model
            .with_queue(|q| {
                let index = q.append(track.clone());
                q.select(index);
                index
            })
            .await;
        tracing::debug!(id, queue_index = index, resume, rate, "Track queued");

        self.load_and_start(track, resume, rate).await
    }

    async fn load_and_start(&self, track: Track, resume: f64, rate: f64) -> Result<(), PlayerError> {
        self.visualizer.stop();
        let title = track.title.clone();
        let url = track.audio_url.clone();
        self.model
            .update_playback(|p| p.load_track(track, resume, rate))
            .await;

        let element_duration = match self.element.load(&url).await {
            Ok(duration) => duration,
            Err(e) => {
                self.model
                    .update_playback(|p| {
                        p.state = PlayerState::Error;
                        p.is_playing = false;
                    })
                    .await;
                self.report("load", &e).await;
                self.model
                    .update_playback(|p| {
                        p.track = None;
                        p.duration = None;
                        p.elapsed = 0.0;
                        p.state = PlayerState::Idle;
                    })
                    .await;
                self.model.set_loading(false).await;
                return Err(e);
            }
        };

        let (position, rate, volume, muted) = self
            .model
            .update_playback(|p| {
                if p.duration.is_none() {
                    p.duration = element_duration.filter(|d| d.is_finite() && *d > 0.0);
                }
                let elapsed = p.elapsed;
                p.set_elapsed(elapsed);
                p.state = PlayerState::Ready;
                (p.elapsed, p.rate, p.volume, p.muted)
            })
            .await;

        self.element.set_playback_rate(rate);
        self.element.set_volume(volume);
        self.element.set_muted(muted);
        if position > 0.0 {
            self.element.set_current_time(position);
        }
        self.emit(MediaEventKind::Load).await;

        let started = self.start_element().await;
        self.model.set_loading(false).await;
        started?;

        self.model
            .notify(format!("Now playing: {title}"), NotificationLevel::Success)
            .await;
        Ok(())
    }

    /// Start the element and mark the session as playing.
    async fn start_element(&self) -> Result<(), PlayerError> {
        if let Err(e) = self.element.play() {
            self.report("play", &e).await;
            return Err(e);
        }
        self.model
            .update_playback(|p| {
                p.is_playing = true;
                p.state = PlayerState::Playing;
            })
            .await;
        self.visualizer.start();
        self.emit(MediaEventKind::Play).await;
        Ok(())
    }

    async fn loaded_kind(&self) -> Result<MediaKind, PlayerError> {
        self.model
            .get_playback_state()
            .await
            .kind()
            .ok_or(PlayerError::Precondition("no track loaded"))
    }

    pub async fn play(&self) -> Result<(), PlayerError> {
        let kind = match self.loaded_kind().await {
            Ok(kind) => kind,
            Err(e) => {
                self.report("play", &e).await;
                return Err(e);
            }
        };

        let result = self.server.transport(kind, Transport::Resume).await;
        self.observe_reply("resume", &result).await;
        result?;
        self.start_element().await?;
        tracing::info!("Playback resumed");
        Ok(())
    }

    pub async fn pause(&self) -> Result<(), PlayerError> {
        let kind = match self.loaded_kind().await {
            Ok(kind) => kind,
            Err(e) => {
                self.report("pause", &e).await;
                return Err(e);
            }
        };

        let result = self.server.transport(kind, Transport::Pause).await;
        self.observe_reply("pause", &result).await;
        result?;

        self.element.pause();
        let position = self.element.current_time();
        self.model
            .update_playback(|p| {
                p.set_elapsed(position);
                p.is_playing = false;
                p.state = PlayerState::Paused;
            })
            .await;
        self.visualizer.stop();
        self.emit(MediaEventKind::Pause).await;
        tracing::info!(position, "Playback paused");
        Ok(())
    }

    pub async fn stop(&self) -> Result<(), PlayerError> {
        let kind = match self.loaded_kind().await {
            Ok(kind) => kind,
            Err(e) => {
                self.report("stop", &e).await;
                return Err(e);
            }
        };

        let result = self.server.transport(kind, Transport::Stop).await;
        self.observe_reply("stop", &result).await;
        result?;

        self.element.pause();
        self.element.set_current_time(0.0);
        self.model
            .update_playback(|p| {
                p.elapsed = 0.0;
                p.is_playing = false;
                p.state = PlayerState::Stopped;
            })
            .await;
        self.visualizer.stop();
        self.emit(MediaEventKind::Stop).await;
        tracing::info!("Playback stopped");
        Ok(())
    }

    pub async fn toggle_playback(&self) -> Result<(), PlayerError> {
        if self.model.is_playing().await {
            self.pause().await
        } else {
            self.play().await
        }
    }

    /// Jump to `fraction` of the track; the server is told in the background.
    pub async fn seek_to(&self, fraction: f64) -> Result<(), PlayerError> {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };

        let target = self
            .model
            .update_playback(|p| {
                let kind = p.kind()?;
                let duration = p.duration.filter(|d| *d > 0.0)?;
                p.set_elapsed(fraction * duration);
                Some((kind, p.elapsed, p.rate))
            })
            .await;

        let Some((kind, position, rate)) = target else {
            let e = PlayerError::Precondition("duration unknown");
            self.report("seek", &e).await;
            return Err(e);
        };

        self.element.set_current_time(position);
        tracing::debug!(fraction, position, "Seek");
        self.spawn_sync(kind, position, rate);
        Ok(())
    }

    pub async fn forward(&self, seconds: f64) -> Result<(), PlayerError> {
        self.seek_relative(SeekDirection::Forward, seconds).await
    }

    pub async fn rewind(&self, seconds: f64) -> Result<(), PlayerError> {
        self.seek_relative(SeekDirection::Rewind, seconds).await
    }

    /// The server decides the new position; apply it as-is.
    async fn seek_relative(&self, direction: SeekDirection, seconds: f64) -> Result<(), PlayerError> {
        let kind = match self.loaded_kind().await {
            Ok(kind) => kind,
            Err(e) => {
                self.report("seek", &e).await;
                return Err(e);
            }
        };

        let result = self.server.seek_relative(kind, direction, seconds).await;
        self.observe_reply("seek", &result).await;
        let position = result?.max(0.0);

        self.model.update_playback(|p| p.elapsed = position).await;
        self.element.set_current_time(position);
        tracing::debug!(direction = ?direction, seconds, position, "Relative seek applied");
        Ok(())
    }

    /// Clamp and apply locally, then tell the server if a track is loaded.
    pub async fn set_playback_speed(&self, rate: f64) -> Result<(), PlayerError> {
        let rate = clamp_rate(rate);
        let kind = self
            .model
            .update_playback(|p| {
                p.rate = rate;
                p.kind()
            })
            .await;
        self.element.set_playback_rate(rate);
        self.save_preferences().await;
        tracing::debug!(rate, "Playback speed set");

        let Some(kind) = kind else {
            return Ok(());
        };
        let result = self.server.set_speed(kind, rate).await;
        self.observe_reply("speed", &result).await;
        result?;
        self.model
            .notify(format!("Speed: {rate}x"), NotificationLevel::Info)
            .await;
        Ok(())
    }

    pub async fn speed_up(&self) -> Result<(), PlayerError> {
        let rate = self.model.get_playback_state().await.rate;
        self.set_playback_speed(snap(rate + SPEED_STEP)).await
    }

    pub async fn speed_down(&self) -> Result<(), PlayerError> {
        let rate = self.model.get_playback_state().await.rate;
        self.set_playback_speed(snap(rate - SPEED_STEP)).await
    }

    /// Local only. A volume of zero also mutes.
    pub async fn set_volume(&self, volume: f64) {
        let volume = clamp_volume(volume);
        let muted = volume == 0.0;
        self.model
            .update_playback(|p| {
                p.volume = volume;
                p.muted = muted;
            })
            .await;
        self.element.set_volume(volume);
        self.element.set_muted(muted);
        self.save_preferences().await;
    }

    pub async fn volume_up(&self) {
        let volume = self.model.get_playback_state().await.volume;
        self.set_volume(snap(volume + VOLUME_STEP)).await;
    }

    pub async fn volume_down(&self) {
        let volume = self.model.get_playback_state().await.volume;
        self.set_volume(snap(volume - VOLUME_STEP)).await;
    }

    pub async fn toggle_mute(&self) {
        let muted = self
            .model
            .update_playback(|p| {
                p.muted = !p.muted;
                p.muted
            })
            .await;
        self.element.set_muted(muted);
        self.save_preferences().await;
    }
}
