//! Speech-to-text (STT) processing
//!
//! A transcription has three outcomes: recognized text, audio that could not
//! be decoded into text, or a service error. Service errors are transient by
//! contract; the capture task reports them and ends.

use async_trait::async_trait;

use crate::voice::AudioClip;
use crate::{Error, Result};

/// Outcome of a successful transcription round-trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcription {
    /// Decoded text
    Recognized(String),
    /// Audio was present but not decodable into text
    Unrecognized,
}

/// Transcribes one audio clip to text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a clip with a language hint (e.g. `"en-US"`)
    ///
    /// # Errors
    ///
    /// Returns error if the transcription service fails; treated as
    /// transient and non-fatal by callers.
    async fn transcribe(&self, clip: &AudioClip, language: &str) -> Result<Transcription>;
}

/// Response from OpenAI Whisper transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Response from Deepgram transcription API
#[derive(serde::Deserialize)]
struct DeepgramResponse {
    results: DeepgramResults,
}

#[derive(serde::Deserialize)]
struct DeepgramResults {
    channels: Vec<DeepgramChannel>,
}

#[derive(serde::Deserialize)]
struct DeepgramChannel {
    alternatives: Vec<DeepgramAlternative>,
}

#[derive(serde::Deserialize)]
struct DeepgramAlternative {
    transcript: String,
}

/// STT provider backend
#[derive(Clone, Copy, Debug)]
enum SttProvider {
    Whisper,
    Deepgram,
}

/// HTTP speech-to-text client
pub struct SpeechToText {
    client: reqwest::Client,
    api_key: String,
    model: String,
    provider: SttProvider,
}

impl SpeechToText {
    /// Create an STT instance using `OpenAI` Whisper
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_whisper(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for Whisper".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            provider: SttProvider::Whisper,
        })
    }

    /// Create an STT instance using Deepgram
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_deepgram(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("Deepgram API key required".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            provider: SttProvider::Deepgram,
        })
    }

    /// Transcribe using OpenAI Whisper
    async fn transcribe_whisper(&self, audio: Vec<u8>, language: &str) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting Whisper transcription");

        // Whisper wants a bare ISO 639-1 code, not a BCP 47 tag
        let language = language.split('-').next().unwrap_or(language).to_string();

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio)
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("language", language);

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/transcriptions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Whisper request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::Stt(format!("Whisper API error {status}: {body}")));
        }

        let result: WhisperResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse Whisper response");
            e
        })?;

        Ok(result.text)
    }

    /// Transcribe using Deepgram
    async fn transcribe_deepgram(&self, audio: Vec<u8>, language: &str) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting Deepgram transcription");

        let url = format!(
            "https://api.deepgram.com/v1/listen?model={}&language={language}&punctuate=false",
            self.model
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", "audio/wav")
            .body(audio)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Deepgram request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Deepgram API error");
            return Err(Error::Stt(format!("Deepgram API error {status}: {body}")));
        }

        let result: DeepgramResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse Deepgram response");
            e
        })?;

        let transcript = result
            .results
            .channels
            .first()
            .and_then(|c| c.alternatives.first())
            .map(|a| a.transcript.clone())
            .unwrap_or_default();

        Ok(transcript)
    }
}

#[async_trait]
impl Transcriber for SpeechToText {
    async fn transcribe(&self, clip: &AudioClip, language: &str) -> Result<Transcription> {
        let wav = clip.to_wav()?;

        let text = match self.provider {
            SttProvider::Whisper => self.transcribe_whisper(wav, language).await?,
            SttProvider::Deepgram => self.transcribe_deepgram(wav, language).await?,
        };

        if text.trim().is_empty() {
            tracing::debug!("transcription returned no text");
            return Ok(Transcription::Unrecognized);
        }

        tracing::info!(transcript = %text, "transcription complete");
        Ok(Transcription::Recognized(text))
    }
}
