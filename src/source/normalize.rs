use crate::{
    PixsurfError, PixsurfResult,
    foundation::core::{BYTES_PER_PIXEL, canonical_stride, premul_channel},
    source::decode::{DecodedFrame, FrameFormat, FrameSamples},
};

/// Pixel memory in the canonical premultiplied BGRA8 layout, ready to back a surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes per row, `>= width * 4`.
    pub stride: usize,
    /// `stride * height` bytes.
    pub data: Vec<u8>,
}

/// Convert any decoded frame to the canonical layout.
///
/// A frame that is already `Bgra8Premul` keeps its buffer and stride (surplus
/// trailing bytes are truncated, nothing is copied). Any other layout takes one
/// conversion pass into rows of `row_alignment`-padded stride. Depth above 8
/// bits is truncated here, once.
pub fn normalize(frame: DecodedFrame, row_alignment: usize) -> PixsurfResult<CanonicalBuffer> {
    let DecodedFrame {
        width,
        height,
        stride,
        format,
        samples,
        ..
    } = frame;

    if width == 0 || height == 0 {
        return Err(PixsurfError::InvalidDimensions { width, height });
    }

    if format == FrameFormat::Bgra8Premul {
        let FrameSamples::U8(mut data) = samples else {
            return Err(PixsurfError::invalid_image_data(
                "Bgra8Premul frame must carry 8-bit samples",
            ));
        };
        data.truncate(stride * height as usize);
        return Ok(CanonicalBuffer {
            width,
            height,
            stride,
            data,
        });
    }

    let dims_err = || PixsurfError::InvalidDimensions { width, height };
    let out_stride = canonical_stride(width, row_alignment).ok_or_else(dims_err)?;
    let out_len = out_stride.checked_mul(height as usize).ok_or_else(dims_err)?;
    let mut data = vec![0u8; out_len];

    let channels = format.channels();
    let row_samples = stride / format.sample_size();
    let w = width as usize;

    for (y, out_row) in data.chunks_exact_mut(out_stride).enumerate() {
        let start = y * row_samples;
        let out_px = out_row[..w * BYTES_PER_PIXEL].chunks_exact_mut(BYTES_PER_PIXEL);
        match &samples {
            FrameSamples::U8(s) => {
                let row = &s[start..start + w * channels];
                for (src, dst) in row.chunks_exact(channels).zip(out_px) {
                    write_canonical(dst, format, src, |v| v);
                }
            }
            FrameSamples::U16(s) => {
                let row = &s[start..start + w * channels];
                for (src, dst) in row.chunks_exact(channels).zip(out_px) {
                    write_canonical(dst, format, src, |v| (v >> 8) as u8);
                }
            }
            FrameSamples::F32(s) => {
                let row = &s[start..start + w * channels];
                for (src, dst) in row.chunks_exact(channels).zip(out_px) {
                    write_canonical(dst, format, src, |v| {
                        (v.clamp(0.0, 1.0) * 255.0).round() as u8
                    });
                }
            }
        }
    }

    Ok(CanonicalBuffer {
        width,
        height,
        stride: out_stride,
        data,
    })
}

#[inline]
fn write_canonical<T: Copy>(dst: &mut [u8], format: FrameFormat, src: &[T], to8: impl Fn(T) -> u8) {
    let (r, g, b, a, premultiplied) = match format {
        FrameFormat::L8 | FrameFormat::L16 => {
            let l = to8(src[0]);
            (l, l, l, u8::MAX, true)
        }
        FrameFormat::La8 | FrameFormat::La16 => {
            let l = to8(src[0]);
            (l, l, l, to8(src[1]), false)
        }
        FrameFormat::Rgb8 | FrameFormat::Rgb16 | FrameFormat::Rgb32F => {
            (to8(src[0]), to8(src[1]), to8(src[2]), u8::MAX, true)
        }
        FrameFormat::Rgba8 | FrameFormat::Rgba16 | FrameFormat::Rgba32F => {
            (to8(src[0]), to8(src[1]), to8(src[2]), to8(src[3]), false)
        }
        FrameFormat::Rgba8Premul => (to8(src[0]), to8(src[1]), to8(src[2]), to8(src[3]), true),
        FrameFormat::Bgra8 => (to8(src[2]), to8(src[1]), to8(src[0]), to8(src[3]), false),
        FrameFormat::Bgra8Premul => (to8(src[2]), to8(src[1]), to8(src[0]), to8(src[3]), true),
    };

    if premultiplied {
        dst.copy_from_slice(&[b, g, r, a]);
    } else {
        dst.copy_from_slice(&[
            premul_channel(b, a),
            premul_channel(g, a),
            premul_channel(r, a),
            a,
        ]);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/normalize.rs"]
mod tests;
