//! Configuration management for spotter
//!
//! `~/.config/spotter/config.toml` is a partial overlay on top of defaults:
//! all file fields are optional. Environment variables override the file,
//! CLI flags override both (applied by `main`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::voice::{SpeechToText, VoiceSettings};
use crate::{Error, Result};

/// Default inference server address
const DEFAULT_DETECTOR_URL: &str = "http://127.0.0.1:8500";

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Camera settings
    pub camera: CameraConfig,

    /// Object detector settings
    pub detector: DetectorConfig,

    /// Voice command settings
    pub voice: VoiceConfig,
}

/// Camera configuration
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Device index passed to the camera backend
    pub index: u32,
}

/// Object detector configuration
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Base URL of the inference server
    pub url: String,

    /// Detections below this confidence are dropped
    pub min_confidence: f32,
}

/// Voice command configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// STT provider ("whisper" or "deepgram")
    pub provider: String,

    /// STT model identifier; empty means the provider default
    pub model: String,

    /// API key; empty means read the provider's usual env var
    pub api_key: String,

    /// Language hint (e.g. "en-US")
    pub language: String,

    /// Max seconds to wait for speech to start
    pub start_timeout_secs: u64,

    /// Max utterance length in seconds
    pub max_utterance_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera: CameraConfig { index: 0 },
            detector: DetectorConfig {
                url: DEFAULT_DETECTOR_URL.to_string(),
                min_confidence: 0.25,
            },
            voice: VoiceConfig {
                provider: "whisper".to_string(),
                model: String::new(),
                api_key: String::new(),
                language: "en-US".to_string(),
                start_timeout_secs: 5,
                max_utterance_secs: 5,
            },
        }
    }
}

impl Config {
    /// Load configuration: defaults, then config file, then environment
    ///
    /// With an explicit `path` the file must be readable; the default
    /// location is optional.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit config file is missing or malformed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let file = match path {
            Some(p) => Some(std::fs::read_to_string(p).map_err(|e| {
                Error::Config(format!("cannot read {}: {e}", p.display()))
            })?),
            None => default_config_path().and_then(|p| std::fs::read_to_string(p).ok()),
        };

        if let Some(contents) = file {
            let overlay: ConfigFile = toml::from_str(&contents)?;
            config.apply_file(overlay);
        }

        config.apply_env();
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(camera) = file.camera {
            if let Some(index) = camera.index {
                self.camera.index = index;
            }
        }
        if let Some(detector) = file.detector {
            if let Some(url) = detector.url {
                self.detector.url = url;
            }
            if let Some(c) = detector.min_confidence {
                self.detector.min_confidence = c;
            }
        }
        if let Some(voice) = file.voice {
            if let Some(provider) = voice.provider {
                self.voice.provider = provider;
            }
            if let Some(model) = voice.model {
                self.voice.model = model;
            }
            if let Some(key) = voice.api_key {
                self.voice.api_key = key;
            }
            if let Some(language) = voice.language {
                self.voice.language = language;
            }
            if let Some(secs) = voice.start_timeout_secs {
                self.voice.start_timeout_secs = secs;
            }
            if let Some(secs) = voice.max_utterance_secs {
                self.voice.max_utterance_secs = secs;
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("SPOTTER_DETECTOR_URL") {
            self.detector.url = url;
        }
        if let Ok(index) = std::env::var("SPOTTER_CAMERA_INDEX")
            && let Ok(index) = index.parse::<u32>()
        {
            self.camera.index = index;
        }
        if let Ok(provider) = std::env::var("SPOTTER_STT_PROVIDER") {
            self.voice.provider = provider;
        }
    }

    /// Voice timing/language settings for capture tasks
    #[must_use]
    pub fn voice_settings(&self) -> VoiceSettings {
        VoiceSettings {
            language: self.voice.language.clone(),
            start_timeout: Duration::from_secs(self.voice.start_timeout_secs),
            max_utterance: Duration::from_secs(self.voice.max_utterance_secs),
        }
    }

    /// Build the STT client for the configured provider
    ///
    /// The API key falls back to `OPENAI_API_KEY` or `DEEPGRAM_API_KEY`
    /// depending on the provider.
    ///
    /// # Errors
    ///
    /// Returns error on unknown provider or missing API key
    pub fn transcriber(&self) -> Result<SpeechToText> {
        let voice = &self.voice;
        match voice.provider.as_str() {
            "whisper" => {
                let key = resolve_key(&voice.api_key, "OPENAI_API_KEY");
                let model = default_model(&voice.model, "whisper-1");
                SpeechToText::new_whisper(key, model)
            }
            "deepgram" => {
                let key = resolve_key(&voice.api_key, "DEEPGRAM_API_KEY");
                let model = default_model(&voice.model, "nova-2");
                SpeechToText::new_deepgram(key, model)
            }
            other => Err(Error::Config(format!("unknown STT provider: {other}"))),
        }
    }
}

fn resolve_key(configured: &str, env_var: &str) -> String {
    if configured.is_empty() {
        std::env::var(env_var).unwrap_or_default()
    } else {
        configured.to_string()
    }
}

fn default_model(configured: &str, fallback: &str) -> String {
    if configured.is_empty() {
        fallback.to_string()
    } else {
        configured.to_string()
    }
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "spotter")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Top-level TOML configuration file schema
///
/// All fields are optional — the file is a partial overlay on top of
/// defaults.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    camera: Option<CameraFileConfig>,

    #[serde(default)]
    detector: Option<DetectorFileConfig>,

    #[serde(default)]
    voice: Option<VoiceFileConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct CameraFileConfig {
    index: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct DetectorFileConfig {
    url: Option<String>,
    min_confidence: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct VoiceFileConfig {
    provider: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    language: Option<String>,
    start_timeout_secs: Option<u64>,
    max_utterance_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.camera.index, 0);
        assert_eq!(config.detector.url, DEFAULT_DETECTOR_URL);
        assert_eq!(config.voice.provider, "whisper");
        assert_eq!(config.voice_settings().start_timeout, Duration::from_secs(5));
    }

    #[test]
    fn file_overlay_is_partial() {
        let mut config = Config::default();
        let overlay: ConfigFile = toml::from_str(
            r#"
            [detector]
            url = "http://inference:9000"

            [voice]
            provider = "deepgram"
            start_timeout_secs = 8
            "#,
        )
        .unwrap();
        config.apply_file(overlay);

        assert_eq!(config.detector.url, "http://inference:9000");
        assert_eq!(config.voice.provider, "deepgram");
        assert_eq!(config.voice.start_timeout_secs, 8);
        // Untouched fields keep their defaults
        assert_eq!(config.camera.index, 0);
        assert_eq!(config.voice.language, "en-US");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/spotter.toml")));
        assert!(err.is_err());
    }

    #[test]
    fn explicit_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[camera]\nindex = 2").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.camera.index, 2);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut config = Config::default();
        config.voice.provider = "google".to_string();
        assert!(config.transcriber().is_err());
    }

    #[test]
    fn configured_api_key_wins_over_env() {
        let mut config = Config::default();
        config.voice.api_key = "sk-configured".to_string();
        assert!(config.transcriber().is_ok());
    }
}
