//! Per-frame spectrum sampling for the visualizer

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::audio::FrequencySource;

/// ~30 fps
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Pulls frequency data while something is playing and publishes bar
/// heights in `0.0..=1.0`.
#[derive(Clone)]
pub struct VisualizerDriver {
    source: Option<Arc<dyn FrequencySource>>,
    frame: Arc<Mutex<Vec<f32>>>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl VisualizerDriver {
    pub fn new(source: Option<Arc<dyn FrequencySource>>) -> Self {
        Self {
            source,
            frame: Arc::new(Mutex::new(Vec::new())),
            task: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_available(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .map(|t| t.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    pub fn start(&self) {
        let Some(source) = self.source.clone() else {
            tracing::debug!("No analysis tap, visualizer disabled");
            return;
        };
        if self.is_running() {
            return;
        }
        let Ok(mut task) = self.task.lock() else {
            return;
        };

        let frame = self.frame.clone();
        *task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(FRAME_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let heights: Vec<f32> = source
                    .byte_frequency_data()
                    .into_iter()
                    .map(|v| v as f32 / 255.0)
                    .collect();
                if let Ok(mut frame) = frame.lock() {
                    *frame = heights;
                }
            }
        }));
        tracing::debug!("Visualizer started");
    }

    pub fn stop(&self) {
        if let Ok(mut task) = self.task.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
                tracing::debug!("Visualizer stopped");
            }
        }
        if let Ok(mut frame) = self.frame.lock() {
            frame.clear();
        }
    }

    /// Latest bar heights; empty while stopped
    pub fn frame(&self) -> Vec<f32> {
        self.frame.lock().map(|f| f.clone()).unwrap_or_default()
    }
}
