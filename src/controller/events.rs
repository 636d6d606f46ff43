//! `media:*` events for observers of the playback session

use serde::Serialize;

use crate::audio::MediaElement;
use crate::model::{MediaKind, SessionServer};

use super::PlaybackClient;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaEventKind {
    Load,
    Play,
    Pause,
    Stop,
}

impl MediaEventKind {
    pub fn name(self) -> &'static str {
        match self {
            MediaEventKind::Load => "media:load",
            MediaEventKind::Play => "media:play",
            MediaEventKind::Pause => "media:pause",
            MediaEventKind::Stop => "media:stop",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEvent {
    #[serde(skip)]
    pub kind: MediaEventKind,
    pub media_id: u64,
    pub media_type: MediaKind,
    pub is_playing: bool,
}

impl<S: SessionServer, M: MediaElement> PlaybackClient<S, M> {
    /// Publish an event for the current track. No-op when nothing is loaded.
    pub(crate) async fn emit(&self, kind: MediaEventKind) {
        let state = self.model.get_playback_state().await;
        let Some(track) = state.track.as_ref() else {
            return;
        };
        let event = MediaEvent {
            kind,
            media_id: track.id,
            media_type: track.kind,
            is_playing: state.is_playing,
        };
        tracing::debug!(event = kind.name(), media_id = event.media_id, media_type = %event.media_type, is_playing = event.is_playing, "Media event");
        // Nobody listening is fine
        let _ = self.events.send(event);
    }
}
