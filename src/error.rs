//! Error types for trikona

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trikona error types
///
/// Degenerate image data (short contours, zero-area moments, singular
/// triangle transforms) is never an error: those units are skipped locally
/// so the pipeline degrades gracefully on noisy input. Errors are reserved
/// for caller misuse and infrastructure failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration (rejected eagerly, before any processing)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Malformed fingerprint encoding
    #[error("Invalid fingerprint: {0}")]
    Fingerprint(String),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing fingerprint store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Corrupt or incompatible index snapshot
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}
