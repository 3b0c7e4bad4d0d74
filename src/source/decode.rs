use std::io::Cursor;

use image::{DynamicImage, ImageDecoder as _};

use crate::{PixsurfError, PixsurfResult, source::loader::DecodeLimits};

/// Flags passed to a [`FrameDecoder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Skip reading and validating embedded color-profile metadata.
    pub ignore_color_profile: bool,
}

/// Pixel layout of a [`DecodedFrame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameFormat {
    /// Canonical layout; adopted without conversion.
    Bgra8Premul,
    /// Straight-alpha BGRA8.
    Bgra8,
    /// Premultiplied RGBA8.
    Rgba8Premul,
    /// Straight-alpha RGBA8.
    Rgba8,
    /// RGB8, opaque.
    Rgb8,
    /// 8-bit gray, opaque.
    L8,
    /// 8-bit gray with straight alpha.
    La8,
    /// 16-bit gray, opaque.
    L16,
    /// 16-bit gray with straight alpha.
    La16,
    /// 16-bit RGB, opaque.
    Rgb16,
    /// 16-bit RGBA, straight alpha.
    Rgba16,
    /// 32-bit float RGB in `[0, 1]`, opaque.
    Rgb32F,
    /// 32-bit float RGBA in `[0, 1]`, straight alpha.
    Rgba32F,
}

impl FrameFormat {
    /// Samples per pixel.
    pub fn channels(self) -> usize {
        match self {
            FrameFormat::L8 | FrameFormat::L16 => 1,
            FrameFormat::La8 | FrameFormat::La16 => 2,
            FrameFormat::Rgb8 | FrameFormat::Rgb16 | FrameFormat::Rgb32F => 3,
            FrameFormat::Bgra8Premul
            | FrameFormat::Bgra8
            | FrameFormat::Rgba8Premul
            | FrameFormat::Rgba8
            | FrameFormat::Rgba16
            | FrameFormat::Rgba32F => 4,
        }
    }

    /// Bytes per sample.
    pub fn sample_size(self) -> usize {
        match self {
            FrameFormat::L16 | FrameFormat::La16 | FrameFormat::Rgb16 | FrameFormat::Rgba16 => 2,
            FrameFormat::Rgb32F | FrameFormat::Rgba32F => 4,
            _ => 1,
        }
    }

    /// Bytes per pixel.
    pub fn bytes_per_pixel(self) -> usize {
        self.channels() * self.sample_size()
    }
}

/// Sample storage of a [`DecodedFrame`].
#[derive(Clone, Debug, PartialEq)]
pub enum FrameSamples {
    /// 8-bit samples.
    U8(Vec<u8>),
    /// 16-bit samples.
    U16(Vec<u16>),
    /// 32-bit float samples.
    F32(Vec<f32>),
}

impl FrameSamples {
    fn sample_size(&self) -> usize {
        match self {
            FrameSamples::U8(_) => 1,
            FrameSamples::U16(_) => 2,
            FrameSamples::F32(_) => 4,
        }
    }

    fn len(&self) -> usize {
        match self {
            FrameSamples::U8(v) => v.len(),
            FrameSamples::U16(v) => v.len(),
            FrameSamples::F32(v) => v.len(),
        }
    }
}

/// One decoded image with an explicit layout, as handed over by a decoder.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedFrame {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) stride: usize,
    pub(crate) format: FrameFormat,
    pub(crate) samples: FrameSamples,
    pub(crate) icc_profile: Option<Vec<u8>>,
}

impl DecodedFrame {
    /// Validate and wrap decoded samples.
    ///
    /// `stride` is in bytes and must hold a whole number of samples and at
    /// least `width` pixels; `samples` must cover `stride * height` bytes.
    pub fn new(
        width: u32,
        height: u32,
        stride: usize,
        format: FrameFormat,
        samples: FrameSamples,
    ) -> PixsurfResult<Self> {
        if width == 0 || height == 0 {
            return Err(PixsurfError::InvalidDimensions { width, height });
        }
        let sample_size = format.sample_size();
        if samples.sample_size() != sample_size {
            return Err(PixsurfError::invalid_image_data(format!(
                "{format:?} frame needs {sample_size}-byte samples"
            )));
        }
        let min_stride = (width as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or(PixsurfError::InvalidDimensions { width, height })?;
        if stride < min_stride || stride % sample_size != 0 {
            return Err(PixsurfError::invalid_image_data(format!(
                "stride {stride} invalid for {width}px wide {format:?} frame"
            )));
        }
        let needed_bytes = stride
            .checked_mul(height as usize)
            .ok_or(PixsurfError::InvalidDimensions { width, height })?;
        if samples.len() * sample_size < needed_bytes {
            return Err(PixsurfError::invalid_image_data(format!(
                "frame holds {} bytes, expected {needed_bytes}",
                samples.len() * sample_size
            )));
        }
        Ok(Self {
            width,
            height,
            stride,
            format,
            samples,
            icc_profile: None,
        })
    }

    /// Build a tightly packed frame (`stride = width * bytes_per_pixel`).
    pub fn packed(
        width: u32,
        height: u32,
        format: FrameFormat,
        samples: FrameSamples,
    ) -> PixsurfResult<Self> {
        let stride = (width as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or(PixsurfError::InvalidDimensions { width, height })?;
        Self::new(width, height, stride, format, samples)
    }

    /// Attach the raw ICC profile read from the source.
    pub fn with_icc_profile(mut self, profile: Option<Vec<u8>>) -> Self {
        self.icc_profile = profile;
        self
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel layout.
    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// Embedded ICC profile, if one was read.
    pub fn icc_profile(&self) -> Option<&[u8]> {
        self.icc_profile.as_deref()
    }
}

impl From<DynamicImage> for DecodedFrame {
    fn from(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let (format, samples) = match image {
            DynamicImage::ImageLuma8(b) => (FrameFormat::L8, FrameSamples::U8(b.into_raw())),
            DynamicImage::ImageLumaA8(b) => (FrameFormat::La8, FrameSamples::U8(b.into_raw())),
            DynamicImage::ImageRgb8(b) => (FrameFormat::Rgb8, FrameSamples::U8(b.into_raw())),
            DynamicImage::ImageRgba8(b) => (FrameFormat::Rgba8, FrameSamples::U8(b.into_raw())),
            DynamicImage::ImageLuma16(b) => (FrameFormat::L16, FrameSamples::U16(b.into_raw())),
            DynamicImage::ImageLumaA16(b) => (FrameFormat::La16, FrameSamples::U16(b.into_raw())),
            DynamicImage::ImageRgb16(b) => (FrameFormat::Rgb16, FrameSamples::U16(b.into_raw())),
            DynamicImage::ImageRgba16(b) => {
                (FrameFormat::Rgba16, FrameSamples::U16(b.into_raw()))
            }
            DynamicImage::ImageRgb32F(b) => {
                (FrameFormat::Rgb32F, FrameSamples::F32(b.into_raw()))
            }
            DynamicImage::ImageRgba32F(b) => {
                (FrameFormat::Rgba32F, FrameSamples::F32(b.into_raw()))
            }
            other => (
                FrameFormat::Rgba8,
                FrameSamples::U8(other.to_rgba8().into_raw()),
            ),
        };
        let stride = width as usize * format.bytes_per_pixel();
        Self {
            width,
            height,
            stride,
            format,
            samples,
            icc_profile: None,
        }
    }
}

/// The external decoding facility: encoded bytes in, one decoded frame out.
///
/// Implementations report a malformed embedded color profile as
/// [`PixsurfError::ColorProfileCorruption`] so callers can retry with
/// [`DecodeOptions::ignore_color_profile`] set. Every other failure should be
/// [`PixsurfError::InvalidImageData`].
pub trait FrameDecoder {
    /// Decode the first frame of `encoded`.
    fn decode(&self, encoded: &[u8], opts: DecodeOptions) -> PixsurfResult<DecodedFrame>;
}

/// [`FrameDecoder`] backed by the `image` crate.
#[derive(Clone, Debug, Default)]
pub struct ImageCrateDecoder {
    limits: DecodeLimits,
}

impl ImageCrateDecoder {
    /// Decoder enforcing `limits`.
    pub fn new(limits: DecodeLimits) -> Self {
        Self { limits }
    }

    fn image_limits(&self) -> image::Limits {
        let mut limits = image::Limits::default();
        limits.max_image_width = self.limits.max_width;
        limits.max_image_height = self.limits.max_height;
        if let Some(max_alloc) = self.limits.max_alloc_bytes {
            limits.max_alloc = Some(max_alloc);
        }
        limits
    }
}

impl FrameDecoder for ImageCrateDecoder {
    fn decode(&self, encoded: &[u8], opts: DecodeOptions) -> PixsurfResult<DecodedFrame> {
        let mut reader = image::ImageReader::new(Cursor::new(encoded))
            .with_guessed_format()
            .map_err(|e| PixsurfError::invalid_image_data(format!("sniff image format: {e}")))?;
        let Some(format) = reader.format() else {
            return Err(PixsurfError::invalid_image_data(
                "bytes do not contain a recognized image format",
            ));
        };
        reader.limits(self.image_limits());

        let mut decoder = reader
            .into_decoder()
            .map_err(|e| PixsurfError::invalid_image_data(format!("{format:?} header: {e}")))?;

        let icc_profile = if opts.ignore_color_profile {
            None
        } else {
            let profile = decoder
                .icc_profile()
                .map_err(|e| PixsurfError::color_profile(format!("read ICC profile: {e}")))?;
            if let Some(p) = &profile {
                validate_icc_profile(p)?;
            }
            profile
        };

        let image = DynamicImage::from_decoder(decoder)
            .map_err(|e| PixsurfError::invalid_image_data(format!("{format:?} decode: {e}")))?;
        if image.width() == 0 || image.height() == 0 {
            return Err(PixsurfError::invalid_image_data("decoded image is empty"));
        }
        Ok(DecodedFrame::from(image).with_icc_profile(icc_profile))
    }
}

const ICC_HEADER_LEN: usize = 128;

/// Structural check of an ICC profile: full header, a declared size that fits
/// the payload, and the `acsp` file signature.
pub fn validate_icc_profile(profile: &[u8]) -> PixsurfResult<()> {
    if profile.len() < ICC_HEADER_LEN {
        return Err(PixsurfError::color_profile(format!(
            "ICC profile truncated: {} bytes",
            profile.len()
        )));
    }
    let declared = u32::from_be_bytes([profile[0], profile[1], profile[2], profile[3]]) as usize;
    if declared < ICC_HEADER_LEN || declared > profile.len() {
        return Err(PixsurfError::color_profile(format!(
            "ICC profile declares {declared} bytes, payload has {}",
            profile.len()
        )));
    }
    if &profile[36..40] != b"acsp" {
        return Err(PixsurfError::color_profile("ICC profile signature is not 'acsp'"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/source/decode.rs"]
mod tests;
