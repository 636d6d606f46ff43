//! Client configuration and session bootstrap
//!
//! The backend is a Django site: requests are authenticated with the
//! `sessionid` cookie and must carry the `csrftoken` cookie value in the
//! `X-CSRFToken` header.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::SET_COOKIE;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Progress timer period
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Elapsed seconds between opportunistic position pushes
pub const SYNC_EVERY_SECS: u64 = 10;
/// Forward/rewind step used by the arrow keys
pub const SEEK_STEP_SECS: f64 = 10.0;
pub const VOLUME_STEP: f64 = 0.1;
pub const SPEED_STEP: f64 = 0.25;
pub const MIN_PLAYBACK_RATE: f64 = 0.5;
pub const MAX_PLAYBACK_RATE: f64 = 2.0;
/// Lifetime of a transient notification
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

const ENV_BASE_URL: &str = "MEDIAPLAYER_BASE_URL";
const ENV_SESSION_ID: &str = "MEDIAPLAYER_SESSION_ID";
const ENV_CSRF_TOKEN: &str = "MEDIAPLAYER_CSRF_TOKEN";
const ENV_PAUSE_ON_FOCUS_LOSS: &str = "MEDIAPLAYER_PAUSE_ON_FOCUS_LOSS";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub session_id: Option<String>,
    pub csrf_token: Option<String>,
    pub pause_on_focus_loss: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_id: None,
            csrf_token: None,
            pause_on_focus_loss: false,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            base_url: non_empty(ENV_BASE_URL)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            session_id: non_empty(ENV_SESSION_ID),
            csrf_token: non_empty(ENV_CSRF_TOKEN),
            pause_on_focus_loss: non_empty(ENV_PAUSE_ON_FOCUS_LOSS)
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.pause_on_focus_loss),
        }
    }

    /// Fetch a CSRF token from the site root if none was configured.
    pub async fn ensure_csrf_token(&mut self) -> Result<()> {
        if self.csrf_token.is_some() {
            return Ok(());
        }

        tracing::info!(base_url = %self.base_url, "No CSRF token configured, requesting one from the server");

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        let mut request = http.get(format!("{}/", self.base_url));
        if let Some(session_id) = &self.session_id {
            request = request.header(reqwest::header::COOKIE, format!("sessionid={session_id}"));
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Could not reach {}", self.base_url))?;

        let token = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|cookie| parse_cookie(cookie, "csrftoken"));

        match token {
            Some(token) => {
                tracing::debug!("CSRF token obtained from Set-Cookie");
                self.csrf_token = Some(token);
            }
            None => tracing::warn!("Server did not set a csrftoken cookie, requests may be rejected"),
        }

        Ok(())
    }

    /// `Cookie` header value carrying the session and CSRF cookies.
    pub fn cookie_header(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(session_id) = &self.session_id {
            parts.push(format!("sessionid={session_id}"));
        }
        if let Some(token) = &self.csrf_token {
            parts.push(format!("csrftoken={token}"));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

/// Extract `name`'s value from a single `Set-Cookie` header.
fn parse_cookie(header: &str, name: &str) -> Option<String> {
    let first = header.split(';').next()?;
    let (key, value) = first.trim().split_once('=')?;
    (key == name && !value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.session_id.is_none());
        assert!(config.csrf_token.is_none());
        assert!(!config.pause_on_focus_loss);
        assert!(config.cookie_header().is_none());
    }

    #[test]
    fn reads_overrides_and_trims_trailing_slash() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_BASE_URL, "https://tunes.example.com/"),
            (ENV_SESSION_ID, "abc123"),
            (ENV_CSRF_TOKEN, "tok"),
            (ENV_PAUSE_ON_FOCUS_LOSS, "yes"),
        ]);
        let config = ClientConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.base_url, "https://tunes.example.com");
        assert_eq!(config.cookie_header().as_deref(), Some("sessionid=abc123; csrftoken=tok"));
        assert!(config.pause_on_focus_loss);
    }

    #[test]
    fn parses_csrf_cookie_from_set_cookie_header() {
        let header = "csrftoken=Zx9; expires=Sat, 16 Oct 2027 10:00:00 GMT; Max-Age=31449600; Path=/; SameSite=Lax";
        assert_eq!(parse_cookie(header, "csrftoken").as_deref(), Some("Zx9"));
        assert_eq!(parse_cookie("sessionid=1; Path=/", "csrftoken"), None);
        assert_eq!(parse_cookie("csrftoken=; Path=/", "csrftoken"), None);
    }
}
