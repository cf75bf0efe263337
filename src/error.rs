//! Error types for the fire simulation and its host-side helpers.

use thiserror::Error;

/// Errors raised when configuring a simulation or palette.
///
/// A rejected call never touches existing state: the grid, dimensions and
/// parameters stay exactly as they were before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FireError {
    /// Width or height was zero, or `width * height` does not fit in memory.
    #[error("invalid fire dimensions {width}x{height}: both must be at least 1")]
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// Precision bits outside 0..=64.
    #[error("invalid random precision: {0} bits (expected 0-64)")]
    InvalidPrecision(u32),

    /// A float parameter was NaN, infinite, or out of its allowed range.
    #[error("invalid value for {name}: {value}")]
    InvalidParameter {
        /// Parameter name as shown to the user.
        name: &'static str,
        /// Offending value.
        value: f32,
    },

    /// Palettes need at least a black and a white entry.
    #[error("invalid palette size {0}: must be at least 2")]
    InvalidPaletteSize(usize),
}

/// Errors raised while reading or writing configuration and presets.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not determine the platform config directory")]
    NoConfigDir,

    #[error(transparent)]
    Fire(#[from] FireError),
}

/// Errors raised while exporting frames to image files.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("GIF encoding failed: {0}")]
    Gif(#[from] gif::EncodingError),

    #[error("nothing to export: the recording has no frames")]
    EmptyRecording,

    #[error("export scale must be at least 1")]
    InvalidScale,

    #[error("{width}x{height} pixels is too large for the output format")]
    TooLarge {
        width: usize,
        height: usize,
    },

    #[error("frame of {got} bytes does not match the recording size {expected}")]
    FrameSizeMismatch {
        expected: usize,
        got: usize,
    },
}
