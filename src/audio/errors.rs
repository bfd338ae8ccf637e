//! Errors for turning an audio file into a playable buffer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleLoadError {
    /// The file could not be opened or read.
    #[error("failed to open file: {0}")]
    Io(#[from] std::io::Error),

    /// Probing or decoding failed.
    #[error("failed to decode audio file: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("audio file has no default track")]
    NoDefaultTrack,

    #[error("audio file is missing a sample rate")]
    MissingSampleRate,

    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(usize),

    /// Decoding succeeded but produced no frames.
    #[error("audio file contains no samples")]
    Empty,
}
