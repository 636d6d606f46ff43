//! HTTP client for the server-side playback session

use std::future::Future;

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, COOKIE, REFERER};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::{ClientConfig, REQUEST_TIMEOUT};
use crate::error::PlayerError;
use crate::{log_api_request, log_api_result};

use super::track::TrackPayload;
use super::types::MediaKind;

/// Session commands without a payload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Pause,
    Resume,
    Stop,
}

impl Transport {
    fn action(self) -> &'static str {
        match self {
            Transport::Pause => "pause",
            Transport::Resume => "resume",
            Transport::Stop => "stop",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekDirection {
    Forward,
    Rewind,
}

impl SeekDirection {
    fn action(self) -> &'static str {
        match self {
            SeekDirection::Forward => "forward",
            SeekDirection::Rewind => "rewind",
        }
    }
}

/// The backend's playback-session contract
pub trait SessionServer: Send + Sync + 'static {
    /// Mark a track as now playing; returns canonical metadata and resume position.
    fn play(&self, id: u64, kind: MediaKind) -> impl Future<Output = Result<TrackPayload, PlayerError>> + Send;

    fn transport(&self, kind: MediaKind, command: Transport) -> impl Future<Output = Result<(), PlayerError>> + Send;

    /// Relative seek; the server answers with the new absolute position.
    fn seek_relative(
        &self,
        kind: MediaKind,
        direction: SeekDirection,
        seconds: f64,
    ) -> impl Future<Output = Result<f64, PlayerError>> + Send;

    fn set_speed(&self, kind: MediaKind, speed: f64) -> impl Future<Output = Result<(), PlayerError>> + Send;

    fn sync_progress(
        &self,
        kind: MediaKind,
        current_time: f64,
        playback_speed: f64,
    ) -> impl Future<Output = Result<(), PlayerError>> + Send;
}

#[derive(Debug, Default, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    current_time: Option<f64>,
    #[serde(default)]
    song: Option<TrackPayload>,
    #[serde(default)]
    episode: Option<TrackPayload>,
}

impl ApiResponse {
    fn failure_message(&self) -> Option<String> {
        self.message.clone().or_else(|| self.error.clone())
    }
}

/// reqwest-backed [`SessionServer`]
#[derive(Clone)]
pub struct HttpSessionClient {
    http: reqwest::Client,
    base_url: String,
    csrf_token: Option<String>,
    cookie: Option<String>,
}

impl HttpSessionClient {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            csrf_token: config.csrf_token.clone(),
            cookie: config.cookie_header(),
        })
    }

    fn session_path(kind: MediaKind, action: &str) -> String {
        match kind {
            MediaKind::Song => format!("/users/music/song/{action}/"),
            MediaKind::Episode => format!("/users/podcast/episode/{action}/"),
        }
    }

    fn play_path(kind: MediaKind, id: u64) -> String {
        match kind {
            MediaKind::Song => format!("/music/song/{id}/play/"),
            MediaKind::Episode => format!("/users/podcast/episode/{id}/play/"),
        }
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<ApiResponse, PlayerError> {
        let url = format!("{}{}", self.base_url, path);
        log_api_request!(path, %url, body = ?body);

        let mut request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(REFERER, format!("{}/", self.base_url));
        if let Some(token) = &self.csrf_token {
            request = request.header("X-CSRFToken", token);
        }
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        parse_response(status, &text)
    }
}

fn parse_response(status: StatusCode, text: &str) -> Result<ApiResponse, PlayerError> {
    let parsed = serde_json::from_str::<ApiResponse>(text);

    if !status.is_success() {
        let detail = parsed.ok().and_then(|r| r.failure_message());
        return Err(PlayerError::Server(match detail {
            Some(msg) => msg,
            None => format!("HTTP {status}"),
        }));
    }

    let body = parsed.map_err(|e| PlayerError::Server(format!("malformed response body: {e}")))?;
    if !body.success {
        return Err(PlayerError::Server(
            body.failure_message().unwrap_or_else(|| "request was rejected".to_string()),
        ));
    }
    Ok(body)
}

impl SessionServer for HttpSessionClient {
    async fn play(&self, id: u64, kind: MediaKind) -> Result<TrackPayload, PlayerError> {
        let result = self
            .post(&Self::play_path(kind, id), None)
            .await
            .and_then(|body| {
                body.song
                    .or(body.episode)
                    .ok_or_else(|| PlayerError::Server("response carried no track".to_string()))
            });
        log_api_result!("play", result);
        result
    }

    async fn transport(&self, kind: MediaKind, command: Transport) -> Result<(), PlayerError> {
        let result = self
            .post(&Self::session_path(kind, command.action()), None)
            .await
            .map(|_| ());
        log_api_result!(command.action(), result);
        result
    }

    async fn seek_relative(&self, kind: MediaKind, direction: SeekDirection, seconds: f64) -> Result<f64, PlayerError> {
        let result = self
            .post(
                &Self::session_path(kind, direction.action()),
                Some(json!({ "seconds": seconds })),
            )
            .await
            .and_then(|body| {
                body.current_time
                    .filter(|t| t.is_finite())
                    .ok_or_else(|| PlayerError::Server("response carried no current_time".to_string()))
            });
        log_api_result!(direction.action(), result);
        result
    }

    async fn set_speed(&self, kind: MediaKind, speed: f64) -> Result<(), PlayerError> {
        let result = self
            .post(&Self::session_path(kind, "speed"), Some(json!({ "speed": speed })))
            .await
            .map(|_| ());
        log_api_result!("speed", result);
        result
    }

    async fn sync_progress(&self, kind: MediaKind, current_time: f64, playback_speed: f64) -> Result<(), PlayerError> {
        self.post(
            &Self::session_path(kind, "sync"),
            Some(json!({ "current_time": current_time, "playback_speed": playback_speed })),
        )
        .await
        .map(|_| ())
    }
}
