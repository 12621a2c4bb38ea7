//! Shared test fakes
//!
//! Scripted collaborators so the focus protocol and render loop can be
//! exercised without camera, microphone, or network.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use spotter::video::{Command, CommandInput, DisplaySink, Frame, FrameSource};
use spotter::voice::SAMPLE_RATE;
use spotter::{
    AudioClip, AudioSource, BoundingBox, Detection, Detector, Error, ItemCatalog, Result,
    Transcriber, Transcription,
};

/// Small catalog used across the tests
pub fn test_catalog() -> ItemCatalog {
    ItemCatalog::new(["person", "dog", "car"])
}

/// A short clip of non-silent audio
pub fn dummy_clip() -> AudioClip {
    AudioClip::new(vec![0.1; 1600], SAMPLE_RATE)
}

/// One scripted capture attempt
pub enum AudioScript {
    /// Yield a clip immediately
    Clip,
    /// Sleep, then yield a clip (a capture that is "in flight" for a while)
    SlowClip(Duration),
    /// No speech before the start timeout
    NoSpeech,
    /// Device failure
    Fail(&'static str),
}

/// Scripted [`AudioSource`]; counts how many captures were started
pub struct FakeAudio {
    script: Mutex<VecDeque<AudioScript>>,
    captures_started: AtomicUsize,
}

impl FakeAudio {
    pub fn new(script: Vec<AudioScript>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            captures_started: AtomicUsize::new(0),
        }
    }

    /// Number of capture attempts the loop has triggered
    pub fn captures_started(&self) -> usize {
        self.captures_started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioSource for FakeAudio {
    async fn capture_utterance(
        &self,
        _start_timeout: Duration,
        _max_duration: Duration,
    ) -> Result<Option<AudioClip>> {
        self.captures_started.fetch_add(1, Ordering::SeqCst);

        let step = self
            .script
            .lock()
            .expect("audio script lock")
            .pop_front()
            .unwrap_or(AudioScript::NoSpeech);

        match step {
            AudioScript::Clip => Ok(Some(dummy_clip())),
            AudioScript::SlowClip(delay) => {
                tokio::time::sleep(delay).await;
                Ok(Some(dummy_clip()))
            }
            AudioScript::NoSpeech => Ok(None),
            AudioScript::Fail(msg) => Err(Error::Audio(msg.to_string())),
        }
    }
}

/// One scripted transcription
pub enum SttScript {
    /// Recognized text
    Hear(&'static str),
    /// Audio present but not decodable
    Garble,
    /// Transcription service failure
    Fail(&'static str),
}

/// Scripted [`Transcriber`]
pub struct FakeTranscriber {
    script: Mutex<VecDeque<SttScript>>,
}

impl FakeTranscriber {
    pub fn new(script: Vec<SttScript>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }

    /// A transcriber that always hears the same text
    pub fn hearing(text: &'static str) -> Self {
        Self::new(vec![SttScript::Hear(text)])
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, _clip: &AudioClip, _language: &str) -> Result<Transcription> {
        let step = self
            .script
            .lock()
            .expect("stt script lock")
            .pop_front()
            .unwrap_or(SttScript::Garble);

        match step {
            SttScript::Hear(text) => Ok(Transcription::Recognized(text.to_string())),
            SttScript::Garble => Ok(Transcription::Unrecognized),
            SttScript::Fail(msg) => Err(Error::Stt(msg.to_string())),
        }
    }
}

/// Detector returning the same detections for every frame
pub struct FakeDetector {
    labels: Vec<&'static str>,
    detections: Vec<Detection>,
    failing: bool,
}

impl FakeDetector {
    pub fn new(labels: Vec<&'static str>, detections: Vec<Detection>) -> Self {
        Self {
            labels,
            detections,
            failing: false,
        }
    }

    /// A detector whose `detect` always fails
    pub fn failing() -> Self {
        Self {
            labels: vec![],
            detections: vec![],
            failing: true,
        }
    }
}

#[async_trait]
impl Detector for FakeDetector {
    async fn labels(&self) -> Result<Vec<String>> {
        Ok(self.labels.iter().map(ToString::to_string).collect())
    }

    async fn detect(&self, _frame: &Frame) -> Result<Vec<Detection>> {
        if self.failing {
            return Err(Error::Detector("inference backend down".to_string()));
        }
        Ok(self.detections.clone())
    }
}

/// Detection helper
pub fn detection(label: &str, x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
    Detection {
        bbox: BoundingBox { x1, y1, x2, y2 },
        confidence: 0.9,
        label: label.to_string(),
    }
}

/// Frame source yielding a fixed number of blank frames, then end-of-stream
pub struct ScriptedFrames {
    remaining: usize,
    width: usize,
    height: usize,
}

impl ScriptedFrames {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: count,
            width: 64,
            height: 64,
        }
    }
}

impl FrameSource for ScriptedFrames {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        Ok(Some(Frame::blank(self.width, self.height)))
    }
}

/// Display sink + command input with a scripted key sequence
///
/// Presented frames are kept for inspection. When the command script runs
/// out, polls report no command; loops then end via frame exhaustion.
pub struct ScriptedSurface {
    pub presented: Vec<Frame>,
    commands: VecDeque<Option<Command>>,
}

impl ScriptedSurface {
    pub fn new(commands: Vec<Option<Command>>) -> Self {
        Self {
            presented: Vec::new(),
            commands: commands.into(),
        }
    }

    /// A surface that never issues commands (loop ends via frame exhaustion)
    pub fn passive() -> Self {
        Self {
            presented: Vec::new(),
            commands: VecDeque::new(),
        }
    }
}

impl DisplaySink for ScriptedSurface {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.presented.push(frame.clone());
        Ok(())
    }
}

impl CommandInput for ScriptedSurface {
    fn poll_command(&mut self) -> Option<Command> {
        self.commands.pop_front().unwrap_or(None)
    }
}
