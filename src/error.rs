//! Error taxonomy for playback operations

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlayerError {
    /// The request could not be sent or no response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx status, `success: false`, or a body we could not parse.
    #[error("server error: {0}")]
    Server(String),

    /// The media source could not be fetched, decoded or played.
    #[error("media error: {0}")]
    Media(String),

    /// The operation makes no sense in the current state (nothing loaded, unknown duration).
    #[error("precondition failed: {0}")]
    Precondition(&'static str),
}

impl PlayerError {
    pub fn is_precondition(&self) -> bool {
        matches!(self, PlayerError::Precondition(_))
    }
}

impl From<reqwest::Error> for PlayerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PlayerError::Server(format!("malformed response body: {err}"))
        } else if let Some(status) = err.status() {
            PlayerError::Server(format!("HTTP {status}"))
        } else {
            PlayerError::Network(err.to_string())
        }
    }
}
