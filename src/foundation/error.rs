/// Convenience result type used across pixsurf.
pub type PixsurfResult<T> = Result<T, PixsurfError>;

/// Top-level error taxonomy used by surface, loader and effect APIs.
#[derive(thiserror::Error, Debug)]
pub enum PixsurfError {
    /// Zero width/height, or a size whose buffer length does not fit in memory.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// Encoded bytes (or a file) that do not decode to a usable image.
    #[error("invalid image data: {0}")]
    InvalidImageData(String),

    /// The embedded color profile could not be read or is malformed.
    ///
    /// Loaders retry once with profile metadata ignored; callers only see this
    /// variant when talking to a [`crate::FrameDecoder`] directly.
    #[error("color profile corruption: {0}")]
    ColorProfileCorruption(String),

    /// Pixel coordinate outside `[0, width) x [0, height)`.
    #[error("pixel ({x}, {y}) out of bounds for {width}x{height} surface")]
    OutOfBounds {
        /// Requested column.
        x: u32,
        /// Requested row.
        y: u32,
        /// Surface width.
        width: u32,
        /// Surface height.
        height: u32,
    },

    /// Operation not permitted in the surface's current lock state.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// The surface has been disposed and can no longer be locked.
    #[error("surface already disposed")]
    AlreadyDisposed,

    /// Invalid user-provided configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PixsurfError {
    /// Build a [`PixsurfError::InvalidImageData`] value.
    pub fn invalid_image_data(msg: impl Into<String>) -> Self {
        Self::InvalidImageData(msg.into())
    }

    /// Build a [`PixsurfError::ColorProfileCorruption`] value.
    pub fn color_profile(msg: impl Into<String>) -> Self {
        Self::ColorProfileCorruption(msg.into())
    }

    /// Build a [`PixsurfError::IllegalState`] value.
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }

    /// Build a [`PixsurfError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether this error should trigger the ignore-color-profile retry.
    pub fn is_color_profile_corruption(&self) -> bool {
        matches!(self, Self::ColorProfileCorruption(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
