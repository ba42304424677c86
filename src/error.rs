//! Error handling and custom error types
//!
//! Every variant's `Display` text is the message shown to the user, so it has
//! to name the failing operation on its own.

use crate::models::OperationMode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Please upload an image first.")]
    MissingImage,

    #[error("Please enter a prompt to {0} the image.")]
    MissingPrompt(OperationMode),

    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported image format: {0}")]
    UnsupportedImage(String),

    #[error("Gemini rejected the credential: {0}")]
    Auth(String),

    #[error("Request to Gemini failed: {0}")]
    Transport(String),

    #[error("{0}")]
    NoImageGenerated(String),

    #[error("{0}")]
    EmptyResult(String),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
