//! In-memory server and media element for controller tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::audio::{FrequencySource, MediaElement};
use crate::config::ClientConfig;
use crate::error::PlayerError;
use crate::model::{
    AppModel, MediaKind, Preferences, PreferencesStore, SeekDirection, SessionServer, Track, TrackPayload, Transport,
};

use super::PlaybackClient;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Play(u64, MediaKind),
    Transport(MediaKind, Transport),
    Seek(MediaKind, SeekDirection, f64),
    Speed(MediaKind, f64),
    Sync(MediaKind, f64, f64),
}

#[derive(Default)]
pub struct FakeServer {
    calls: Mutex<Vec<Call>>,
    tracks: Mutex<HashMap<(u64, MediaKind), TrackPayload>>,
    fail_play: Mutex<Option<PlayerError>>,
    fail_transport: Mutex<Option<PlayerError>>,
    fail_speed: Mutex<Option<PlayerError>>,
    fail_sync: Mutex<Option<PlayerError>>,
    seek_result: Mutex<Option<f64>>,
}

pub fn payload(id: u64, duration: f64, current_time: f64) -> TrackPayload {
    TrackPayload {
        id,
        title: format!("Track {id}"),
        artist: Some("Artist".to_string()),
        podcast: None,
        audio_url: format!("/media/songs/{id}.mp3"),
        cover_url: None,
        duration: Some(duration),
        current_time: Some(current_time),
        playback_speed: Some(1.0),
        lyrics: None,
    }
}

impl FakeServer {
    pub fn add_track(&self, kind: MediaKind, payload: TrackPayload) {
        self.tracks.lock().unwrap().insert((payload.id, kind), payload);
    }

    pub fn fail_play_with(&self, error: Option<PlayerError>) {
        *self.fail_play.lock().unwrap() = error;
    }

    pub fn fail_transport_with(&self, error: Option<PlayerError>) {
        *self.fail_transport.lock().unwrap() = error;
    }

    pub fn fail_speed_with(&self, error: Option<PlayerError>) {
        *self.fail_speed.lock().unwrap() = error;
    }

    pub fn fail_sync_with(&self, error: Option<PlayerError>) {
        *self.fail_sync.lock().unwrap() = error;
    }

    pub fn seek_returns(&self, current_time: f64) {
        *self.seek_result.lock().unwrap() = Some(current_time);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn play_calls(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Play(..))).count()
    }

    pub fn sync_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Sync(..)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SessionServer for FakeServer {
    async fn play(&self, id: u64, kind: MediaKind) -> Result<TrackPayload, PlayerError> {
        self.record(Call::Play(id, kind));
        if let Some(e) = self.fail_play.lock().unwrap().clone() {
            return Err(e);
        }
        self.tracks
            .lock()
            .unwrap()
            .get(&(id, kind))
            .cloned()
            .ok_or_else(|| PlayerError::Server("Song not found".to_string()))
    }

    async fn transport(&self, kind: MediaKind, command: Transport) -> Result<(), PlayerError> {
        self.record(Call::Transport(kind, command));
        match self.fail_transport.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn seek_relative(&self, kind: MediaKind, direction: SeekDirection, seconds: f64) -> Result<f64, PlayerError> {
        self.record(Call::Seek(kind, direction, seconds));
        self.seek_result
            .lock()
            .unwrap()
            .ok_or_else(|| PlayerError::Server("No song playing".to_string()))
    }

    async fn set_speed(&self, kind: MediaKind, speed: f64) -> Result<(), PlayerError> {
        self.record(Call::Speed(kind, speed));
        match self.fail_speed.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn sync_progress(&self, kind: MediaKind, current_time: f64, playback_speed: f64) -> Result<(), PlayerError> {
        self.record(Call::Sync(kind, current_time, playback_speed));
        match self.fail_sync.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ElementState {
    pub url: Option<String>,
    pub playing: bool,
    pub time: f64,
    pub rate: f64,
    pub volume: f64,
    pub muted: bool,
    pub ended: bool,
    pub loads: usize,
}

#[derive(Default)]
pub struct FakeElement {
    state: Mutex<ElementState>,
    fail_load: Mutex<Option<PlayerError>>,
    duration: Mutex<Option<f64>>,
    analyser: Option<Arc<dyn FrequencySource>>,
}

impl FakeElement {
    pub fn snapshot(&self) -> ElementState {
        self.state.lock().unwrap().clone()
    }

    pub fn fail_load_with(&self, error: Option<PlayerError>) {
        *self.fail_load.lock().unwrap() = error;
    }

    pub fn reports_duration(&self, duration: Option<f64>) {
        *self.duration.lock().unwrap() = duration;
    }

    /// Move the playhead as if audio had played
    pub fn advance_to(&self, seconds: f64) {
        self.state.lock().unwrap().time = seconds;
    }

    /// Simulate the source playing out
    pub fn finish(&self) {
        let mut state = self.state.lock().unwrap();
        state.ended = true;
        state.playing = false;
    }
}

impl MediaElement for FakeElement {
    async fn load(&self, url: &str) -> Result<Option<f64>, PlayerError> {
        if let Some(e) = self.fail_load.lock().unwrap().clone() {
            let mut state = self.state.lock().unwrap();
            state.url = None;
            state.playing = false;
            return Err(e);
        }
        let mut state = self.state.lock().unwrap();
        state.url = Some(url.to_string());
        state.playing = false;
        state.ended = false;
        state.time = 0.0;
        state.loads += 1;
        Ok(*self.duration.lock().unwrap())
    }

    fn play(&self) -> Result<(), PlayerError> {
        let mut state = self.state.lock().unwrap();
        if state.url.is_none() {
            return Err(PlayerError::Precondition("no source loaded"));
        }
        state.playing = true;
        state.ended = false;
        Ok(())
    }

    fn pause(&self) {
        self.state.lock().unwrap().playing = false;
    }

    fn current_time(&self) -> f64 {
        self.state.lock().unwrap().time
    }

    fn set_current_time(&self, seconds: f64) {
        self.state.lock().unwrap().time = seconds;
    }

    fn set_playback_rate(&self, rate: f64) {
        self.state.lock().unwrap().rate = rate;
    }

    fn set_volume(&self, volume: f64) {
        self.state.lock().unwrap().volume = volume;
    }

    fn set_muted(&self, muted: bool) {
        self.state.lock().unwrap().muted = muted;
    }

    fn has_ended(&self) -> bool {
        self.state.lock().unwrap().ended
    }

    fn analyser(&self) -> Option<Arc<dyn FrequencySource>> {
        self.analyser.clone()
    }
}

static STORE_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn temp_store() -> PreferencesStore {
    let n = STORE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("mediaplayer-rs-client-{}-{n}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    PreferencesStore::new(dir.join("preferences.json"))
}

pub struct Harness {
    pub client: PlaybackClient<FakeServer, FakeElement>,
    pub server: Arc<FakeServer>,
    pub element: Arc<FakeElement>,
    pub store: PreferencesStore,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_preferences(Preferences::default()).await
    }

    pub async fn with_preferences(prefs: Preferences) -> Self {
        let server = Arc::new(FakeServer::default());
        let element = Arc::new(FakeElement::default());
        let store = temp_store();
        let model = Arc::new(AppModel::new(prefs));
        let config = ClientConfig {
            base_url: "http://test.local".to_string(),
            pause_on_focus_loss: true,
            ..ClientConfig::default()
        };
        let client = PlaybackClient::new(model, server.clone(), element.clone(), &config, store.clone()).await;
        Self {
            client,
            server,
            element,
            store,
        }
    }

    /// Register songs `ids` (200 s long) and queue them without playing.
    pub async fn with_songs(ids: &[u64]) -> Self {
        let harness = Self::new().await;
        for &id in ids {
            harness.server.add_track(MediaKind::Song, payload(id, 200.0, 0.0));
            let track: Track = payload(id, 200.0, 0.0).into_track(MediaKind::Song, "http://test.local");
            harness.client.model.with_queue(|q| q.append(track)).await;
        }
        harness
    }
}

/// Let spawned fire-and-forget tasks run to completion.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
