//! Native media primitive behind the playback client
//!
//! - `analyser`: sample tap and FFT for the visualizer
//! - `rodio_element`: rodio-backed [`MediaElement`]

mod analyser;
mod rodio_element;

use std::future::Future;
use std::sync::Arc;

use crate::error::PlayerError;

pub use rodio_element::RodioElement;

const DEVICE_NAME: &str = "mediaplayer-rs";

/// Label shown in the top bar: `mediaplayer-rs@<host>`
pub fn get_device_name() -> String {
    let hostname = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!("{DEVICE_NAME}@{hostname}")
}

/// Byte-scaled frequency magnitudes, one value per bin
pub trait FrequencySource: Send + Sync {
    fn bin_count(&self) -> usize;
    fn byte_frequency_data(&self) -> Vec<u8>;
}

/// A single audio output that can load one source at a time
pub trait MediaElement: Send + Sync + 'static {
    /// Fetch and decode `url`, replacing whatever was loaded. Returns the
    /// duration in seconds when the container reports one.
    fn load(&self, url: &str) -> impl Future<Output = Result<Option<f64>, PlayerError>> + Send;

    fn play(&self) -> Result<(), PlayerError>;
    fn pause(&self);

    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);

    fn set_playback_rate(&self, rate: f64);
    fn set_volume(&self, volume: f64);
    fn set_muted(&self, muted: bool);

    /// The loaded source played through to its end
    fn has_ended(&self) -> bool;

    fn analyser(&self) -> Option<Arc<dyn FrequencySource>>;
}
