//! Sample tap and FFT analysis for the visualizer

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::Source;
use rustfft::{FftPlanner, num_complex::Complex};

use super::FrequencySource;

/// Shared ring buffer of interleaved samples
pub type SampleBuf = Arc<Mutex<VecDeque<f32>>>;

pub const SAMPLE_BUF_SIZE: usize = 4096;
pub const FFT_SIZE: usize = 2048;

const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;
const SMOOTHING: f32 = 0.8;

pub fn new_sample_buf() -> SampleBuf {
    Arc::new(Mutex::new(VecDeque::with_capacity(SAMPLE_BUF_SIZE)))
}

/// Source wrapper that copies every sample into a [`SampleBuf`]
pub struct TappedSource<S> {
    inner: S,
    buf: SampleBuf,
}

impl<S> TappedSource<S>
where
    S: Source<Item = f32>,
{
    pub fn new(source: S, buf: SampleBuf) -> Self {
        TappedSource { inner: source, buf }
    }
}

impl<S> Iterator for TappedSource<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.inner.next()?;
        // Never block the audio thread on the analyser
        if let Ok(mut buf) = self.buf.try_lock() {
            if buf.len() >= SAMPLE_BUF_SIZE {
                buf.pop_front();
            }
            buf.push_back(sample);
        }
        Some(sample)
    }
}

impl<S> Source for TappedSource<S>
where
    S: Source<Item = f32>,
{
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), rodio::source::SeekError> {
        let result = self.inner.try_seek(pos);
        if result.is_ok() {
            if let Ok(mut buf) = self.buf.lock() {
                buf.clear();
            }
        }
        result
    }
}

/// Byte-scaled spectrum over the most recent samples, smoothed across calls
pub struct FrequencyAnalyser {
    samples: SampleBuf,
    channels: AtomicU16,
    smoothed: Mutex<Vec<f32>>,
    fft: Arc<dyn rustfft::Fft<f32>>,
}

impl FrequencyAnalyser {
    pub fn new(samples: SampleBuf) -> Self {
        let fft = FftPlanner::<f32>::new().plan_fft_forward(FFT_SIZE);
        Self {
            samples,
            channels: AtomicU16::new(2),
            smoothed: Mutex::new(vec![0.0; FFT_SIZE / 2]),
            fft,
        }
    }

    pub fn set_channels(&self, channels: u16) {
        self.channels.store(channels.max(1), Ordering::Relaxed);
    }

    pub fn clear(&self) {
        if let Ok(mut buf) = self.samples.lock() {
            buf.clear();
        }
        if let Ok(mut smoothed) = self.smoothed.lock() {
            smoothed.iter_mut().for_each(|m| *m = 0.0);
        }
    }

    fn mono_window(&self) -> Vec<f32> {
        let ch_count = self.channels.load(Ordering::Relaxed).max(1) as usize;
        let samples: Vec<f32> = match self.samples.lock() {
            Ok(s) => s.iter().copied().collect(),
            Err(_) => return Vec::new(),
        };
        samples
            .chunks_exact(ch_count)
            .map(|frame| frame.iter().sum::<f32>() / ch_count as f32)
            .collect()
    }
}

/// Map a linear magnitude onto 0..=255 over the analyser's decibel range.
pub fn magnitude_to_byte(magnitude: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = 255.0 * (db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
    scaled.clamp(0.0, 255.0) as u8
}

impl FrequencySource for FrequencyAnalyser {
    fn bin_count(&self) -> usize {
        FFT_SIZE / 2
    }

    fn byte_frequency_data(&self) -> Vec<u8> {
        let mono = self.mono_window();
        let mut input: Vec<Complex<f32>> = Vec::with_capacity(FFT_SIZE);

        // Hann window over the newest samples
        let window_len = mono.len().min(FFT_SIZE);
        for i in 0..window_len {
            let w = if window_len > 1 {
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (window_len as f32 - 1.0)).cos())
            } else {
                1.0
            };
            input.push(Complex::new(mono[mono.len() - window_len + i] * w, 0.0));
        }
        input.resize(FFT_SIZE, Complex::new(0.0, 0.0));

        self.fft.process(&mut input);

        let Ok(mut smoothed) = self.smoothed.lock() else {
            return vec![0; self.bin_count()];
        };
        input[..FFT_SIZE / 2]
            .iter()
            .zip(smoothed.iter_mut())
            .map(|(c, prev)| {
                let magnitude = c.norm() / FFT_SIZE as f32;
                *prev = SMOOTHING * *prev + (1.0 - SMOOTHING) * magnitude;
                magnitude_to_byte(*prev)
            })
            .collect()
    }
}
