//! Voice processing module
//!
//! Handles utterance capture, speech-to-text, and the one-shot capture task
//! that applies a spoken focus change.

mod capture;
mod stt;
mod task;

pub use capture::{AudioClip, AudioSource, Microphone, SAMPLE_RATE, UtteranceWindow};
pub use stt::{SpeechToText, Transcriber, Transcription};
pub use task::{CaptureOutcome, CaptureTask, VoiceSettings};
