//! Error types for sticker acquisition and conversion.
//!
//! Failures come in two severities. [`SetError`] aborts a whole sticker set and
//! is the only error `download_set` returns. [`AssetError`] is local to one
//! sticker: it is logged, counted, and collected into the set report.

use std::path::PathBuf;
use thiserror::Error;

pub type StickerResult<T> = Result<T, StickerError>;

/// Failure of a single fetch or conversion step.
#[derive(Debug, Error)]
pub enum StickerError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("API error: {description}")]
    Api { description: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("animation contains no frames")]
    EmptyAnimation,

    #[error("encode error: {message}")]
    Encode {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{program} failed ({status}): {stderr}")]
    ExternalProcess {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for StickerError {
    // Request URLs embed the bot token.
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.without_url())
    }
}

impl StickerError {
    pub fn api(description: impl Into<String>) -> Self {
        Self::Api {
            description: description.into(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
            source: None,
        }
    }

    pub fn encode_with(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Encode {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn process(program: impl Into<String>, status: impl Into<String>, stderr: &[u8]) -> Self {
        Self::ExternalProcess {
            program: program.into(),
            status: status.into(),
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }
}

/// Failure that aborts a whole sticker set.
#[derive(Debug, Error)]
pub enum SetError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to fetch sticker set '{name}': {source}")]
    Metadata {
        name: String,
        #[source]
        source: StickerError,
    },

    #[error("failed to create output directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sticker set '{name}' cancelled after {processed}/{total} stickers")]
    Cancelled {
        name: String,
        processed: usize,
        total: usize,
    },
}

/// Failure of one sticker inside a set. Never aborts the set.
#[derive(Debug, Error)]
#[error("sticker #{index} ({file_unique_id}): {error}")]
pub struct AssetError {
    /// 1-based position inside the set.
    pub index: usize,
    pub file_unique_id: String,
    #[source]
    pub error: StickerError,
}
