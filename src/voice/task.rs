//! One-shot voice capture task
//!
//! Spawned by the render loop when a focus-change command wins the update
//! slot. The task records one utterance, transcribes it, and commits the
//! label on a catalog hit. The spawner keeps no handle to the task; its only
//! side effect on shared state is the guarded commit, and the slot is
//! released when the task's [`UpdateSlot`] drops, whichever way it exits.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::ItemCatalog;
use crate::focus::UpdateSlot;
use crate::voice::{AudioSource, Transcriber, Transcription};

/// Timing and language settings for a voice command
#[derive(Debug, Clone)]
pub struct VoiceSettings {
    /// Language hint passed to the transcriber (e.g. `"en-US"`)
    pub language: String,
    /// Max wait for speech to start
    pub start_timeout: Duration,
    /// Max utterance length once speech has started
    pub max_utterance: Duration,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            start_timeout: Duration::from_secs(5),
            max_utterance: Duration::from_secs(5),
        }
    }
}

/// How a capture task ended
///
/// Every variant except `Committed` leaves the focus unchanged. All variants
/// release the update slot; none is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Catalog hit; the focus now points at this canonical label
    Committed(String),
    /// No speech started before the wait timeout
    NoSpeech,
    /// Audio was captured but not decodable into text
    Unrecognized,
    /// Transcribed text is not a catalog label
    NotInCatalog(String),
    /// Audio device or transcription service failed
    ServiceError(String),
}

/// Background unit of work for one voice command
pub struct CaptureTask {
    slot: UpdateSlot,
    audio: Arc<dyn AudioSource>,
    transcriber: Arc<dyn Transcriber>,
    catalog: Arc<ItemCatalog>,
    settings: VoiceSettings,
}

impl CaptureTask {
    /// Build a task around an already-acquired update slot
    #[must_use]
    pub fn new(
        slot: UpdateSlot,
        audio: Arc<dyn AudioSource>,
        transcriber: Arc<dyn Transcriber>,
        catalog: Arc<ItemCatalog>,
        settings: VoiceSettings,
    ) -> Self {
        Self {
            slot,
            audio,
            transcriber,
            catalog,
            settings,
        }
    }

    /// Spawn the task in the background, fire-and-forget
    ///
    /// The render loop never joins this task or reads its outcome; the
    /// shared focus state is the only channel back.
    pub fn spawn(self) {
        tokio::spawn(async move {
            self.run().await;
        });
    }

    /// Run the capture to completion
    ///
    /// Consumes `self`, so the slot is guaranteed to drop (and release) on
    /// every return path. The outcome is returned for tests and direct
    /// callers; the spawned form discards it after logging.
    pub async fn run(self) -> CaptureOutcome {
        let clip = match self
            .audio
            .capture_utterance(self.settings.start_timeout, self.settings.max_utterance)
            .await
        {
            Ok(Some(clip)) => clip,
            Ok(None) => {
                tracing::info!("no speech detected");
                return CaptureOutcome::NoSpeech;
            }
            Err(e) => {
                tracing::warn!(error = %e, "audio capture failed");
                return CaptureOutcome::ServiceError(e.to_string());
            }
        };

        tracing::debug!(
            duration_secs = clip.duration_secs(),
            "utterance captured, transcribing"
        );

        match self
            .transcriber
            .transcribe(&clip, &self.settings.language)
            .await
        {
            Ok(Transcription::Recognized(text)) => {
                tracing::info!(heard = %text, "voice command transcribed");
                match self.catalog.resolve(&text) {
                    Some(label) => {
                        let label = label.to_string();
                        self.slot.commit(&label);
                        CaptureOutcome::Committed(label)
                    }
                    None => {
                        tracing::info!(heard = %text, "item not recognized");
                        CaptureOutcome::NotInCatalog(text)
                    }
                }
            }
            Ok(Transcription::Unrecognized) => {
                tracing::info!("could not understand audio");
                CaptureOutcome::Unrecognized
            }
            Err(e) => {
                tracing::warn!(error = %e, "speech service error");
                CaptureOutcome::ServiceError(e.to_string())
            }
        }
    }
}
