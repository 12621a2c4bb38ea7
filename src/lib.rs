//! Spotter - Voice-directed object spotlight for live video
//!
//! This library drives a live annotation loop whose highlighted object class
//! ("focus") can be changed by a spoken command without freezing the video
//! feed:
//! - Focus state coordination between the render loop and capture tasks
//! - Bounded voice capture and speech-to-text
//! - Frame annotation and display plumbing
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Render/Dispatch Loop                 │
//! │   Camera  │  Detector  │  Annotate  │  Window       │
//! └────────────────────┬────────────────────────────────┘
//!                      │ current_focus() / try_acquire
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Focus Controller                     │
//! │   current label  │  single-flight update slot       │
//! └────────────────────▲────────────────────────────────┘
//!                      │ commit / release (guard drop)
//! ┌────────────────────┴────────────────────────────────┐
//! │           Voice Capture Task (0 or 1)                │
//! │   Microphone  │  STT  │  Catalog lookup             │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The loop spawns at most one capture task at a time and never joins it;
//! the guarded focus state is the only channel between the two.

pub mod app;
pub mod catalog;
pub mod config;
pub mod detect;
pub mod error;
pub mod focus;
pub mod video;
pub mod voice;

pub use app::App;
pub use catalog::ItemCatalog;
pub use config::Config;
pub use detect::{BoundingBox, Detection, Detector, HttpDetector};
pub use error::{Error, Result};
pub use focus::{FocusController, UpdateSlot};
pub use video::{Command, CommandInput, DisplaySink, Frame, FrameSource};
pub use voice::{
    AudioClip, AudioSource, CaptureOutcome, CaptureTask, Microphone, SpeechToText, Transcriber,
    Transcription, VoiceSettings,
};
