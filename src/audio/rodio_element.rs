use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use anyhow::{Context, anyhow};
use rodio::{Decoder, OutputStreamBuilder, Sink, Source};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::block_in_place;

use crate::config::REQUEST_TIMEOUT;
use crate::error::PlayerError;

use super::analyser::{FrequencyAnalyser, SampleBuf, TappedSource, new_sample_buf};
use super::{FrequencySource, MediaElement};

/// Run a blocking call without stalling other tasks on a multi-threaded runtime.
fn off_runtime<R>(f: impl FnOnce() -> R) -> R {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => block_in_place(f),
        _ => f(),
    }
}

#[derive(Clone, Copy)]
struct Output {
    volume: f32,
    muted: bool,
}

/// rodio-backed media element
///
/// The output stream lives on its own thread for as long as this value
/// exists; everything else goes through the shared [`Sink`].
pub struct RodioElement {
    http: reqwest::Client,
    sink: Arc<Sink>,
    source: Mutex<Option<Arc<[u8]>>>,
    loaded: AtomicBool,
    output: Mutex<Output>,
    samples: SampleBuf,
    analyser: Arc<FrequencyAnalyser>,
    _shutdown: mpsc::Sender<()>,
}

impl RodioElement {
    pub fn new() -> anyhow::Result<Self> {
        let (sink_tx, sink_rx) = mpsc::channel::<Result<Sink, String>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || {
                let builder = match OutputStreamBuilder::from_default_device() {
                    Ok(builder) => builder,
                    Err(e) => {
                        let _ = sink_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                let mut stream = match builder.open_stream_or_fallback() {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = sink_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                // The TUI owns the terminal
                stream.log_on_drop(false);

                let sink = Sink::connect_new(stream.mixer());
                if sink_tx.send(Ok(sink)).is_err() {
                    return;
                }
                // Returns once the element is dropped
                let _ = shutdown_rx.recv();
                tracing::debug!("Audio output thread exiting");
            })
            .context("Failed to spawn audio output thread")?;

        let sink = sink_rx
            .recv()
            .context("Audio output thread exited during startup")?
            .map_err(|e| anyhow!("Failed to open audio output: {e}"))?;
        sink.pause();

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT * 6)
            .build()
            .context("Failed to build HTTP client")?;

        let samples = new_sample_buf();
        tracing::info!("Audio output opened");

        Ok(Self {
            http,
            sink: Arc::new(sink),
            source: Mutex::new(None),
            loaded: AtomicBool::new(false),
            output: Mutex::new(Output { volume: 1.0, muted: false }),
            analyser: Arc::new(FrequencyAnalyser::new(samples.clone())),
            samples,
            _shutdown: shutdown_tx,
        })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, PlayerError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return std::fs::read(url).map_err(|e| PlayerError::Media(format!("{url}: {e}")));
        }

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PlayerError::Media(format!("could not fetch source: {e}")))?;
        if !response.status().is_success() {
            return Err(PlayerError::Media(format!("source returned HTTP {}", response.status())));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PlayerError::Media(format!("source download interrupted: {e}")))?;
        Ok(bytes.to_vec())
    }

    /// Decode `bytes` and queue it on the (paused) sink.
    fn append_source(&self, bytes: Arc<[u8]>) -> Result<Option<f64>, PlayerError> {
        let decoder = Decoder::new(Cursor::new(bytes))
            .map_err(|e| PlayerError::Media(format!("could not decode source: {e}")))?;
        let duration = decoder.total_duration().map(|d| d.as_secs_f64());
        self.analyser.set_channels(decoder.channels());
        self.sink.append(TappedSource::new(decoder, self.samples.clone()));
        Ok(duration)
    }

    /// Re-queue the current source after it played out.
    fn ensure_source(&self) -> Result<(), PlayerError> {
        if !self.sink.empty() {
            return Ok(());
        }
        let bytes = self
            .source
            .lock()
            .ok()
            .and_then(|s| s.clone())
            .ok_or(PlayerError::Precondition("no source loaded"))?;
        self.append_source(bytes).map(|_| ())
    }

    fn apply_output(&self) {
        if let Ok(output) = self.output.lock() {
            self.sink.set_volume(if output.muted { 0.0 } else { output.volume });
        }
    }
}

impl MediaElement for RodioElement {
    async fn load(&self, url: &str) -> Result<Option<f64>, PlayerError> {
        tracing::debug!(url, "Loading media source");
        self.sink.clear();
        self.loaded.store(false, Ordering::SeqCst);
        self.analyser.clear();

        let bytes: Arc<[u8]> = self.fetch(url).await?.into();
        let duration = self.append_source(bytes.clone())?;
        if let Ok(mut source) = self.source.lock() {
            *source = Some(bytes);
        }
        self.loaded.store(true, Ordering::SeqCst);
        self.apply_output();

        tracing::info!(url, duration = ?duration, "Media source loaded");
        Ok(duration)
    }

    fn play(&self) -> Result<(), PlayerError> {
        self.ensure_source()?;
        self.sink.play();
        Ok(())
    }

    fn pause(&self) {
        self.sink.pause();
    }

    fn current_time(&self) -> f64 {
        self.sink.get_pos().as_secs_f64()
    }

    fn set_current_time(&self, seconds: f64) {
        if let Err(e) = self.ensure_source() {
            tracing::debug!(error = %e, "Seek ignored");
            return;
        }
        let target = Duration::from_secs_f64(seconds.max(0.0));
        // Waits for the output thread to acknowledge the seek
        if let Err(e) = off_runtime(|| self.sink.try_seek(target)) {
            tracing::warn!(error = %e, seconds, "Seek failed");
        }
    }

    fn set_playback_rate(&self, rate: f64) {
        self.sink.set_speed(rate as f32);
    }

    fn set_volume(&self, volume: f64) {
        if let Ok(mut output) = self.output.lock() {
            output.volume = volume as f32;
        }
        self.apply_output();
    }

    fn set_muted(&self, muted: bool) {
        if let Ok(mut output) = self.output.lock() {
            output.muted = muted;
        }
        self.apply_output();
    }

    fn has_ended(&self) -> bool {
        self.loaded.load(Ordering::SeqCst) && self.sink.empty()
    }

    fn analyser(&self) -> Option<Arc<dyn FrequencySource>> {
        Some(self.analyser.clone())
    }
}
