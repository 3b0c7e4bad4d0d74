use std::path::Path;

use anyhow::Context as _;

use crate::{
    PixsurfError, PixsurfResult,
    foundation::core::DEFAULT_ROW_ALIGNMENT,
    source::decode::{DecodeOptions, DecodedFrame, FrameDecoder, ImageCrateDecoder},
    source::normalize::normalize,
    surface::pixel_surface::PixelSurface,
};

/// Upper bounds enforced while decoding untrusted input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    /// Reject images wider than this.
    pub max_width: Option<u32>,
    /// Reject images taller than this.
    pub max_height: Option<u32>,
    /// Cap on decoder allocations; `None` keeps the `image` crate default.
    pub max_alloc_bytes: Option<u64>,
}

/// Loader configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Row alignment in bytes for newly allocated canonical buffers (power of two).
    pub row_alignment: usize,
    /// Retry once with color-profile metadata ignored when the profile is corrupt.
    pub retry_ignoring_color_profile: bool,
    /// Decoder limits.
    pub limits: DecodeLimits,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            row_alignment: DEFAULT_ROW_ALIGNMENT,
            retry_ignoring_color_profile: true,
            limits: DecodeLimits::default(),
        }
    }
}

impl LoadOptions {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> PixsurfResult<Self> {
        let opts: Self = serde_json::from_str(s).context("parse load options JSON")?;
        opts.validate()?;
        Ok(opts)
    }

    /// Check option invariants.
    pub fn validate(&self) -> PixsurfResult<()> {
        if !self.row_alignment.is_power_of_two() {
            return Err(PixsurfError::validation(format!(
                "row_alignment must be a power of two, got {}",
                self.row_alignment
            )));
        }
        if self.limits.max_width == Some(0) || self.limits.max_height == Some(0) {
            return Err(PixsurfError::validation("decode dimension limits must be > 0"));
        }
        Ok(())
    }
}

/// Builds [`PixelSurface`]s from the four supported origins.
///
/// Every origin ends in the canonical premultiplied BGRA8 layout: decoded
/// frames pass through [`normalize`], blank surfaces are allocated canonical.
#[derive(Clone, Debug)]
pub struct SourceLoader<D = ImageCrateDecoder> {
    decoder: D,
    opts: LoadOptions,
}

impl SourceLoader<ImageCrateDecoder> {
    /// Loader backed by the `image` crate.
    pub fn new(opts: LoadOptions) -> PixsurfResult<Self> {
        Self::with_decoder(ImageCrateDecoder::new(opts.limits), opts)
    }
}

impl<D: FrameDecoder> SourceLoader<D> {
    /// Loader backed by a custom decoder.
    pub fn with_decoder(decoder: D, opts: LoadOptions) -> PixsurfResult<Self> {
        opts.validate()?;
        Ok(Self { decoder, opts })
    }

    /// Active configuration.
    pub fn options(&self) -> &LoadOptions {
        &self.opts
    }

    /// Allocate a transparent surface.
    pub fn blank(&self, width: u32, height: u32) -> PixsurfResult<PixelSurface> {
        PixelSurface::create_aligned(width, height, self.opts.row_alignment)
    }

    /// Decode the image file at `path`.
    ///
    /// The file is read fully before decoding, so no handle stays open.
    #[tracing::instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load_path(&self, path: impl AsRef<Path>) -> PixsurfResult<PixelSurface> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        let frame = self.decode_with_retry(&bytes)?;
        self.load_decoded(frame)
    }

    /// Decode the first frame of `bytes`.
    ///
    /// Empty input yields `Ok(None)`; callers must check for a surface before
    /// use. Non-image bytes fail with [`PixsurfError::InvalidImageData`]. The
    /// bytes are retained by the surface until it is disposed.
    #[tracing::instrument(skip(self, bytes))]
    pub fn load_bytes(&self, bytes: impl Into<Vec<u8>>) -> PixsurfResult<Option<PixelSurface>> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            tracing::debug!("empty byte buffer; no surface produced");
            return Ok(None);
        }
        let frame = self.decode_with_retry(&bytes)?;
        let surface = self.load_decoded(frame)?.with_source(bytes);
        Ok(Some(surface))
    }

    /// Adopt an already-decoded image.
    pub fn load_decoded(&self, image: impl Into<DecodedFrame>) -> PixsurfResult<PixelSurface> {
        let frame = image.into();
        tracing::trace!(
            width = frame.width(),
            height = frame.height(),
            format = ?frame.format(),
            "normalizing decoded frame"
        );
        let canonical = normalize(frame, self.opts.row_alignment)?;
        Ok(PixelSurface::from_canonical(canonical))
    }

    fn decode_with_retry(&self, bytes: &[u8]) -> PixsurfResult<DecodedFrame> {
        let first = self.decoder.decode(bytes, DecodeOptions::default());
        let err = match first {
            Ok(frame) => return Ok(frame),
            Err(e) if e.is_color_profile_corruption() && self.opts.retry_ignoring_color_profile => e,
            Err(e) => return Err(as_invalid_image_data(e)),
        };

        tracing::warn!(error = %err, "corrupt color profile; retrying with profile ignored");
        self.decoder
            .decode(
                bytes,
                DecodeOptions {
                    ignore_color_profile: true,
                },
            )
            .map_err(as_invalid_image_data)
    }
}

fn as_invalid_image_data(err: PixsurfError) -> PixsurfError {
    match err {
        PixsurfError::ColorProfileCorruption(msg) => PixsurfError::InvalidImageData(msg),
        other => other,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/loader.rs"]
mod tests;
