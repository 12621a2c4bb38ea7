//! Error types for spotter

use thiserror::Error;

/// Result type alias for spotter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in spotter
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Camera / frame source error
    #[error("camera error: {0}")]
    Camera(String),

    /// Display window error
    #[error("display error: {0}")]
    Display(String),

    /// Object detection error
    #[error("detector error: {0}")]
    Detector(String),

    /// Audio capture error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text service error
    #[error("STT error: {0}")]
    Stt(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
