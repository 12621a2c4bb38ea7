//! Audio capture from microphone
//!
//! One voice command is one bounded utterance: capture waits up to a start
//! timeout for speech to begin, then records until trailing silence or the
//! max utterance duration. Everything runs on a blocking thread; the cpal
//! stream never crosses an await point.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};

use crate::{Error, Result};

/// Sample rate for audio capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// Minimum audio energy threshold to consider speech
const ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum duration of speech to accept an utterance (in samples at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800; // 0.3 seconds

/// Silence duration to consider end of utterance (in samples)
const TRAILING_SILENCE_SAMPLES: usize = 8000; // 0.5 seconds

/// Interval between buffer polls while capturing
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A bounded utterance recorded from the audio source
#[derive(Debug, Clone)]
pub struct AudioClip {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioClip {
    /// Wrap raw mono samples
    #[must_use]
    pub const fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Raw samples in `[-1.0, 1.0]`
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Clip length in seconds
    #[must_use]
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Encode the clip as 16-bit PCM WAV for STT APIs
    ///
    /// # Errors
    ///
    /// Returns error if WAV encoding fails
    pub fn to_wav(&self) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| Error::Audio(e.to_string()))?;

            for &sample in &self.samples {
                #[allow(clippy::cast_possible_truncation)]
                let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                writer
                    .write_sample(sample_i16)
                    .map_err(|e| Error::Audio(e.to_string()))?;
            }

            writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
        }

        Ok(cursor.into_inner())
    }
}

/// Source of bounded voice-command recordings
///
/// The microphone is exclusively owned by whichever capture task currently
/// holds the focus update slot, so implementations need no extra locking.
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Record one utterance
    ///
    /// Waits up to `start_timeout` for speech to begin and records at most
    /// `max_duration` of it. `Ok(None)` means no speech started in time.
    ///
    /// # Errors
    ///
    /// Returns error if the audio device fails
    async fn capture_utterance(
        &self,
        start_timeout: Duration,
        max_duration: Duration,
    ) -> Result<Option<AudioClip>>;
}

/// Default input device implementing [`AudioSource`]
pub struct Microphone;

impl Microphone {
    /// Create a microphone source, verifying an input device exists
    ///
    /// # Errors
    ///
    /// Returns error if no input device is available
    pub fn new() -> Result<Self> {
        cpal::default_host()
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;
        Ok(Self)
    }
}

#[async_trait]
impl AudioSource for Microphone {
    async fn capture_utterance(
        &self,
        start_timeout: Duration,
        max_duration: Duration,
    ) -> Result<Option<AudioClip>> {
        tokio::task::spawn_blocking(move || capture_blocking(start_timeout, max_duration))
            .await
            .map_err(|e| Error::Audio(e.to_string()))?
    }
}

fn capture_blocking(start_timeout: Duration, max_duration: Duration) -> Result<Option<AudioClip>> {
    let input = InputStream::open()?;
    let opened_at = Instant::now();
    let mut window = UtteranceWindow::new();
    let mut speech_started: Option<Instant> = None;

    loop {
        std::thread::sleep(POLL_INTERVAL);

        if let Some(utterance) = window.push(&input.take_buffer()) {
            tracing::debug!(samples = utterance.len(), "utterance complete");
            return Ok(Some(AudioClip::new(utterance, SAMPLE_RATE)));
        }

        if window.started() {
            let started = *speech_started.get_or_insert_with(Instant::now);
            if started.elapsed() >= max_duration {
                let samples = window.take();
                tracing::debug!(samples = samples.len(), "utterance cut at max duration");
                return Ok(Some(AudioClip::new(samples, SAMPLE_RATE)));
            }
        } else if opened_at.elapsed() >= start_timeout {
            tracing::debug!("no speech before start timeout");
            return Ok(None);
        }
    }
}

/// Open cpal input stream appending into a shared buffer
struct InputStream {
    buffer: Arc<Mutex<Vec<f32>>>,
    // Held so the stream keeps running; dropped with the struct
    _stream: Stream,
}

impl InputStream {
    fn open() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

        let supported_config = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Audio("no suitable audio config found".to_string()))?;

        let config: StreamConfig = supported_config
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            channels = config.channels,
            "audio capture started"
        );

        let buffer = Arc::new(Mutex::new(Vec::new()));
        let write_buffer = Arc::clone(&buffer);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = write_buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        Ok(Self {
            buffer,
            _stream: stream,
        })
    }

    /// Get captured samples since last call and clear the buffer
    fn take_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }
}

/// State of the utterance windower
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowState {
    /// Waiting for speech energy
    Waiting,
    /// Accumulating an utterance
    Capturing,
}

/// Energy-gated utterance segmentation
///
/// Feeds on sample chunks and yields one utterance once enough speech is
/// followed by trailing silence.
#[derive(Debug)]
pub struct UtteranceWindow {
    state: WindowState,
    buffer: Vec<f32>,
    silence_counter: usize,
}

impl UtteranceWindow {
    /// Create a windower in the waiting state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: WindowState::Waiting,
            buffer: Vec::new(),
            silence_counter: 0,
        }
    }

    /// Whether speech has started
    #[must_use]
    pub fn started(&self) -> bool {
        self.state == WindowState::Capturing
    }

    /// Feed a chunk of samples; returns a complete utterance when one ends
    pub fn push(&mut self, samples: &[f32]) -> Option<Vec<f32>> {
        if samples.is_empty() {
            return None;
        }

        let energy = calculate_energy(samples);
        let is_speech = energy > ENERGY_THRESHOLD;

        match self.state {
            WindowState::Waiting => {
                if is_speech {
                    self.state = WindowState::Capturing;
                    self.buffer.extend_from_slice(samples);
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech detected");
                }
            }
            WindowState::Capturing => {
                self.buffer.extend_from_slice(samples);

                if is_speech {
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                if self.silence_counter > TRAILING_SILENCE_SAMPLES
                    && self.buffer.len() > MIN_SPEECH_SAMPLES
                {
                    return Some(self.take());
                }
            }
        }

        None
    }

    /// Take whatever has accumulated and reset to waiting
    pub fn take(&mut self) -> Vec<f32> {
        self.state = WindowState::Waiting;
        self.silence_counter = 0;
        std::mem::take(&mut self.buffer)
    }
}

impl Default for UtteranceWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// RMS energy of a sample chunk
fn calculate_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
