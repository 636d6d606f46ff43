//! Track metadata as returned by the play endpoints

use serde::Deserialize;

use super::types::MediaKind;

const DEFAULT_COVER_URL: &str = "/static/images/default-album-art.jpg";

/// A playable unit (song or podcast episode)
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub id: u64,
    pub kind: MediaKind,
    pub title: String,
    /// Artist for songs, podcast name for episodes
    pub subtitle: String,
    pub audio_url: String,
    pub cover_url: String,
    /// Seconds; `None` until the server or the decoder tells us
    pub duration: Option<f64>,
    pub lyrics: Option<String>,
}

impl Track {
    pub fn same_media(&self, other: &Track) -> bool {
        self.id == other.id && self.kind == other.kind
    }
}

/// `song` / `episode` object inside a play response
#[derive(Clone, Debug, Deserialize)]
pub struct TrackPayload {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub podcast: Option<String>,
    pub audio_url: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub current_time: Option<f64>,
    #[serde(default)]
    pub playback_speed: Option<f64>,
    #[serde(default)]
    pub lyrics: Option<String>,
}

impl TrackPayload {
    /// Resume position the server has on record for this session
    pub fn resume_position(&self) -> f64 {
        self.current_time.filter(|t| t.is_finite() && *t > 0.0).unwrap_or(0.0)
    }

    pub fn into_track(self, kind: MediaKind, base_url: &str) -> Track {
        let subtitle = match kind {
            MediaKind::Song => self.artist.or(self.podcast),
            MediaKind::Episode => self.podcast.or(self.artist),
        }
        .unwrap_or_default();

        Track {
            id: self.id,
            kind,
            title: self.title,
            subtitle,
            audio_url: absolute_url(base_url, &self.audio_url),
            cover_url: absolute_url(
                base_url,
                self.cover_url.as_deref().filter(|u| !u.is_empty()).unwrap_or(DEFAULT_COVER_URL),
            ),
            // The server reports 0 when it does not know the length
            duration: self.duration.filter(|d| d.is_finite() && *d > 0.0),
            lyrics: self.lyrics.filter(|l| !l.trim().is_empty()),
        }
    }
}

/// Media URLs come back site-relative (`/media/songs/x.mp3`).
pub fn absolute_url(base_url: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if url.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), url)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> TrackPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn song_payload_becomes_track_with_absolute_urls() {
        let track = payload(
            r#"{"id": 42, "title": "Blue", "artist": "Joni", "album": "Blue",
                "audio_url": "/media/songs/blue.mp3", "cover_url": "",
                "duration": 200, "current_time": 30, "playback_speed": 1.0, "is_playing": true}"#,
        )
        .into_track(MediaKind::Song, "http://localhost:8000");

        assert_eq!(track.id, 42);
        assert_eq!(track.subtitle, "Joni");
        assert_eq!(track.audio_url, "http://localhost:8000/media/songs/blue.mp3");
        assert_eq!(track.cover_url, "http://localhost:8000/static/images/default-album-art.jpg");
        assert_eq!(track.duration, Some(200.0));
        assert!(track.lyrics.is_none());
    }

    #[test]
    fn episode_uses_podcast_name_and_unknown_duration() {
        let p = payload(
            r#"{"id": 7, "title": "Pilot", "podcast": "Night Talk",
                "audio_url": "https://cdn.example.com/ep7.ogg", "duration": 0, "lyrics": "  "}"#,
        );
        assert_eq!(p.resume_position(), 0.0);

        let track = p.into_track(MediaKind::Episode, "http://localhost:8000");
        assert_eq!(track.subtitle, "Night Talk");
        assert_eq!(track.audio_url, "https://cdn.example.com/ep7.ogg");
        assert_eq!(track.duration, None);
        assert!(track.lyrics.is_none());
    }
}
