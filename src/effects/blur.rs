use crate::{PixsurfError, PixsurfResult, foundation::core::BYTES_PER_PIXEL};

/// Largest blur radius accepted by [`blur_bgra8_premul`] and the unsharp mask.
pub const MAX_BLUR_RADIUS: u32 = 255;

const ONE_Q16: u32 = 1 << 16;

/// Separable Gaussian blur over a strided BGRA8 premultiplied buffer.
///
/// Edges clamp. The output has the same `stride` as `src`; padding bytes are zero.
/// `radius` above [`MAX_BLUR_RADIUS`] is rejected.
pub fn blur_bgra8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    stride: usize,
    radius: u32,
    sigma: f32,
) -> PixsurfResult<Vec<u8>> {
    if radius > MAX_BLUR_RADIUS {
        return Err(PixsurfError::validation(format!(
            "blur radius {radius} exceeds {MAX_BLUR_RADIUS}"
        )));
    }
    let row_len = (width as usize)
        .checked_mul(BYTES_PER_PIXEL)
        .ok_or(PixsurfError::InvalidDimensions { width, height })?;
    let expected_len = stride
        .checked_mul(height as usize)
        .ok_or(PixsurfError::InvalidDimensions { width, height })?;
    if stride < row_len || src.len() != expected_len {
        return Err(PixsurfError::invalid_image_data(
            "blur expects src of stride*height bytes with stride >= width*4",
        ));
    }
    if radius == 0 {
        return Ok(src.to_vec());
    }

    let taps = kernel_taps(radius, sigma)?;
    let (w, h) = (width as usize, height as usize);

    let mut tmp = vec![0u8; expected_len];
    for (src_row, tmp_row) in src.chunks_exact(stride).zip(tmp.chunks_exact_mut(stride)) {
        for x in 0..w {
            let mut acc = [0u32; 4];
            for (i, &weight) in taps.iter().enumerate() {
                let sx = clamped(x, i, radius, w);
                accumulate(&mut acc, weight, &src_row[sx * BYTES_PER_PIXEL..]);
            }
            store(&mut tmp_row[x * BYTES_PER_PIXEL..], acc);
        }
    }

    let mut out = vec![0u8; expected_len];
    for y in 0..h {
        let out_row = y * stride;
        for x in 0..w {
            let col = x * BYTES_PER_PIXEL;
            let mut acc = [0u32; 4];
            for (i, &weight) in taps.iter().enumerate() {
                let sy = clamped(y, i, radius, h);
                accumulate(&mut acc, weight, &tmp[sy * stride + col..]);
            }
            store(&mut out[out_row + col..], acc);
        }
    }
    Ok(out)
}

/// Source index for tap `tap` around `center`, clamped into `[0, len)`.
#[inline]
fn clamped(center: usize, tap: usize, radius: u32, len: usize) -> usize {
    (center + tap).saturating_sub(radius as usize).min(len - 1)
}

#[inline]
fn accumulate(acc: &mut [u32; 4], weight: u32, px: &[u8]) {
    for (a, &c) in acc.iter_mut().zip(&px[..BYTES_PER_PIXEL]) {
        *a += weight * u32::from(c);
    }
}

#[inline]
fn store(dst: &mut [u8], acc: [u32; 4]) {
    for (d, a) in dst[..BYTES_PER_PIXEL].iter_mut().zip(acc) {
        *d = ((a + ONE_Q16 / 2) >> 16).min(255) as u8;
    }
}

/// Normalized Gaussian weights in Q16, summing to exactly `1 << 16`.
fn kernel_taps(radius: u32, sigma: f32) -> PixsurfResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(PixsurfError::validation("blur sigma must be > 0"));
    }
    let two_sigma_sq = 2.0 * f64::from(sigma).powi(2);
    let r = i64::from(radius);
    let raw: Vec<f64> = (-r..=r)
        .map(|d| (-((d * d) as f64) / two_sigma_sq).exp())
        .collect();
    let total: f64 = raw.iter().sum();

    let mut taps: Vec<u32> = raw
        .iter()
        .map(|w| (w / total * f64::from(ONE_Q16)).round() as u32)
        .collect();
    let sum: u32 = taps.iter().sum();
    let centre = radius as usize;
    taps[centre] = (taps[centre] + ONE_Q16).saturating_sub(sum);
    Ok(taps)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
