//! Playback-related state

use crate::config::{MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE, SYNC_EVERY_SECS};

use super::preferences::Preferences;
use super::track::Track;
use super::types::{MediaKind, PlayerState};

pub fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        return 1.0;
    }
    rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE)
}

pub fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        return 0.0;
    }
    volume.clamp(0.0, 1.0)
}

/// The single per-session playback record
#[derive(Clone, Debug)]
pub struct PlaybackState {
    pub track: Option<Track>,
    pub state: PlayerState,
    /// Seconds
    pub elapsed: f64,
    pub duration: Option<f64>,
    pub rate: f64,
    pub volume: f64,
    pub muted: bool,
    pub is_playing: bool,
    pub repeat: bool,
    pub shuffle: bool,
    last_synced_second: Option<u64>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::from_preferences(&Preferences::default())
    }
}

impl PlaybackState {
    pub fn from_preferences(prefs: &Preferences) -> Self {
        Self {
            track: None,
            state: PlayerState::Idle,
            elapsed: 0.0,
            duration: None,
            rate: clamp_rate(prefs.speed),
            volume: clamp_volume(prefs.volume),
            muted: prefs.muted,
            is_playing: false,
            repeat: prefs.repeat,
            shuffle: prefs.shuffle,
            last_synced_second: None,
        }
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            volume: self.volume,
            speed: self.rate,
            repeat: self.repeat,
            shuffle: self.shuffle,
            muted: self.muted,
        }
    }

    pub fn kind(&self) -> Option<MediaKind> {
        self.track.as_ref().map(|t| t.kind)
    }

    pub fn progress_ratio(&self) -> f64 {
        match self.duration {
            Some(d) if d > 0.0 => (self.elapsed / d).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Swap in a freshly loaded track, resetting per-track fields.
    pub fn load_track(&mut self, track: Track, elapsed: f64, rate: f64) {
        self.duration = track.duration;
        self.track = Some(track);
        self.elapsed = elapsed.max(0.0);
        self.rate = clamp_rate(rate);
        self.is_playing = false;
        self.state = PlayerState::Loading;
        self.last_synced_second = None;
    }

    pub fn set_elapsed(&mut self, seconds: f64) {
        let upper = self.duration.unwrap_or(f64::MAX);
        self.elapsed = seconds.clamp(0.0, upper.max(0.0));
    }

    /// Whether the tick at `elapsed` should push a sync; marks the second as synced.
    pub fn take_sync_due(&mut self) -> bool {
        let second = self.elapsed.floor().max(0.0) as u64;
        if second == 0 || second % SYNC_EVERY_SECS != 0 {
            return false;
        }
        if self.last_synced_second == Some(second) {
            return false;
        }
        self.last_synced_second = Some(second);
        true
    }
}
