//! Application state and the render/dispatch loop
//!
//! One foreground loop pulls frames, runs detection, annotates against the
//! current focus, presents, and dispatches commands. A focus-change command
//! spawns at most one background capture task; the loop never waits on it.

use std::sync::Arc;

use crate::catalog::ItemCatalog;
use crate::detect::Detector;
use crate::focus::FocusController;
use crate::video::{Command, CommandInput, DisplaySink, FrameSource, draw_detection};
use crate::voice::{AudioSource, CaptureTask, Transcriber, Transcription, VoiceSettings};
use crate::{Error, Result};

/// Everything the render loop and capture tasks share
pub struct App {
    focus: Arc<FocusController>,
    catalog: Arc<ItemCatalog>,
    audio: Arc<dyn AudioSource>,
    transcriber: Arc<dyn Transcriber>,
    settings: VoiceSettings,
}

impl App {
    /// Wire up the application around an already-chosen initial focus
    #[must_use]
    pub fn new(
        initial_focus: &str,
        catalog: Arc<ItemCatalog>,
        audio: Arc<dyn AudioSource>,
        transcriber: Arc<dyn Transcriber>,
        settings: VoiceSettings,
    ) -> Self {
        Self {
            focus: FocusController::new(initial_focus),
            catalog,
            audio,
            transcriber,
            settings,
        }
    }

    /// Shared focus controller
    #[must_use]
    pub fn focus(&self) -> &Arc<FocusController> {
        &self.focus
    }

    /// Ask for the startup focus by voice, retrying until a catalog hit
    ///
    /// This runs before the loop starts and is deliberately blocking; the
    /// single-flight machinery only applies once the loop is live.
    ///
    /// # Errors
    ///
    /// Returns error if the audio device fails or the STT client is
    /// misconfigured; recognition failures are retried instead.
    pub async fn prompt_initial_focus(
        audio: &dyn AudioSource,
        transcriber: &dyn Transcriber,
        catalog: &ItemCatalog,
        settings: &VoiceSettings,
    ) -> Result<String> {
        loop {
            tracing::info!("say the item to focus (e.g. 'person', 'dog', 'car')");

            let clip = match audio
                .capture_utterance(settings.start_timeout, settings.max_utterance)
                .await?
            {
                Some(clip) => clip,
                None => {
                    tracing::info!("no speech detected, try again");
                    continue;
                }
            };

            match transcriber.transcribe(&clip, &settings.language).await {
                Ok(Transcription::Recognized(text)) => {
                    if let Some(label) = catalog.resolve(&text) {
                        return Ok(label.to_string());
                    }
                    tracing::info!(heard = %text, "item not recognized, try again");
                }
                Ok(Transcription::Unrecognized) => {
                    tracing::info!("could not understand audio, try again");
                }
                Err(e @ Error::Config(_)) => return Err(e),
                Err(e) => {
                    tracing::warn!(error = %e, "speech service error, try again");
                }
            }
        }
    }

    /// Dispatch a focus-change command
    ///
    /// Wins the update slot and spawns a capture task, or reports that one
    /// is already in flight. Returns whether a task was spawned. Never
    /// blocks on the capture itself.
    pub fn request_focus_change(&self) -> bool {
        match self.focus.try_acquire_update_slot() {
            Some(slot) => {
                tracing::info!("say the new focus item");
                CaptureTask::new(
                    slot,
                    Arc::clone(&self.audio),
                    Arc::clone(&self.transcriber),
                    Arc::clone(&self.catalog),
                    self.settings.clone(),
                )
                .spawn();
                true
            }
            None => {
                tracing::info!("already listening");
                false
            }
        }
    }

    /// Run the render/dispatch loop until quit or frame-source exhaustion
    ///
    /// Per frame: pull, detect, annotate against a single focus read,
    /// present, poll for a command. A detector failure skips annotation for
    /// that frame only.
    ///
    /// # Errors
    ///
    /// Returns error only if the display sink fails
    pub async fn run<F, D, S>(&self, frames: &mut F, detector: &D, surface: &mut S) -> Result<()>
    where
        F: FrameSource,
        D: Detector + ?Sized,
        S: DisplaySink + CommandInput,
    {
        loop {
            let Some(mut frame) = frames.next_frame()? else {
                tracing::info!("frame source exhausted, stopping");
                return Ok(());
            };

            let detections = match detector.detect(&frame).await {
                Ok(detections) => detections,
                Err(e) => {
                    tracing::warn!(error = %e, "detection failed, skipping annotation");
                    Vec::new()
                }
            };

            // One read per frame; focus cannot change mid-frame from this
            // loop's own context.
            let focus = self.focus.current_focus();
            for det in &detections {
                draw_detection(&mut frame, det, det.label == focus);
            }

            surface.present(&frame)?;

            match surface.poll_command() {
                Some(Command::Quit) => {
                    tracing::info!("quit requested");
                    return Ok(());
                }
                Some(Command::ChangeFocus) => {
                    self.request_focus_change();
                }
                None => {}
            }
        }
    }
}
