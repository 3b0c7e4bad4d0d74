use crate::{
    PixsurfResult,
    effects::{binding::UnsharpMaskParams, blur::blur_bgra8_premul},
    foundation::core::{BYTES_PER_PIXEL, Color},
    surface::pixel_surface::PixelSurface,
};

/// Sharpen `surface` in place on the CPU.
///
/// The blur mask is computed from the surface itself. For each colour channel
/// whose difference to the mask reaches `threshold`, the value becomes
/// `orig + amount * (orig - mask)`, clamped to `[0, alpha]` so the pixel stays
/// a valid premultiplied colour. Alpha is left untouched.
#[tracing::instrument(skip(surface), fields(width = surface.width(), height = surface.height()))]
pub fn apply_unsharp_mask(
    surface: &mut PixelSurface,
    params: &UnsharpMaskParams,
) -> PixsurfResult<()> {
    params.validate()?;
    if params.radius == 0 || params.amount == 0.0 {
        return Ok(());
    }

    surface.with_lock(|lock| {
        let (w, h, stride) = (lock.width(), lock.height(), lock.stride());
        let mask = blur_bgra8_premul(lock.bytes(), w, h, stride, params.radius, params.sigma)?;

        for y in 0..h {
            for x in 0..w {
                let at = y as usize * stride + x as usize * BYTES_PER_PIXEL;
                let blurred = Color::from_bgra([mask[at], mask[at + 1], mask[at + 2], mask[at + 3]]);
                let orig = lock.get(x, y)?;
                let sharpen = |o: u8, m: u8| -> u8 {
                    let diff = f64::from(o) - f64::from(m);
                    if diff.abs() < params.threshold {
                        return o;
                    }
                    (f64::from(o) + params.amount * diff)
                        .round()
                        .clamp(0.0, f64::from(orig.a)) as u8
                };
                let out = Color::rgba(
                    sharpen(orig.r, blurred.r),
                    sharpen(orig.g, blurred.g),
                    sharpen(orig.b, blurred.b),
                    orig.a,
                );
                if out != orig {
                    lock.set(x, y, out)?;
                }
            }
        }
        Ok(())
    })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/unsharp.rs"]
mod tests;
