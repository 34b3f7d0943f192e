//! Crate error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// CAPTCHA text cannot be drawn without at least one usable font.
    #[error("no usable fonts available")]
    NoFontsAvailable,

    #[error("cannot load font {path}: {reason}")]
    Font { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;
