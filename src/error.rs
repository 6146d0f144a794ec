//! Error types for the auto-crop-borders crate.

use std::path::PathBuf;

/// Errors that can occur while cropping an image or running a batch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source path does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The image has degenerate dimensions.
    #[error("invalid image dimensions ({width}x{height})")]
    InvalidImage {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// The square canvas would not fit in a `u32` side length.
    #[error("square canvas too large ({size} pixels per side)")]
    CanvasTooLarge {
        /// Requested side length.
        size: u64,
    },

    /// The image codec failed to read the source file.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        /// File that failed to decode.
        path: PathBuf,
        /// Underlying codec error.
        source: image::ImageError,
    },

    /// The image codec failed to write the output file.
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        /// File that failed to encode.
        path: PathBuf,
        /// Underlying codec error.
        source: image::ImageError,
    },

    /// An I/O error occurred while reading directories or creating folders.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
