use crate::{
    foundation::core::{BYTES_PER_PIXEL, Color, unpremul_channel},
    foundation::error::{PixsurfError, PixsurfResult},
    surface::pixel_surface::{LockState, PixelSurface},
};

/// Exclusive, scoped access to a surface's pixel memory.
///
/// Obtained from [`PixelSurface::lock`]; holds the surface's stride and
/// dimensions as of acquisition. Dropping the lock (or calling
/// [`BufferLock::unlock`]) returns the surface to [`LockState::Unlocked`].
///
/// Pixel accessors only exist on the lock, so reading pixels from an unlocked
/// surface does not compile:
///
/// ```compile_fail
/// let surface = pixsurf::PixelSurface::create(4, 4).unwrap();
/// let _ = surface.get(0, 0);
/// ```
///
/// A second lock cannot be taken while the first is alive:
///
/// ```compile_fail
/// let mut surface = pixsurf::PixelSurface::create(4, 4).unwrap();
/// let a = surface.lock().unwrap();
/// let b = surface.lock().unwrap();
/// drop((a, b));
/// ```
#[derive(Debug)]
pub struct BufferLock<'a> {
    surface: &'a mut PixelSurface,
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> BufferLock<'a> {
    pub(crate) fn new(surface: &'a mut PixelSurface) -> Self {
        let (width, height, stride) = (surface.width(), surface.height(), surface.stride());
        Self {
            surface,
            width,
            height,
            stride,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row captured at acquisition.
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> PixsurfResult<usize> {
        if x >= self.width || y >= self.height {
            return Err(PixsurfError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.stride + x as usize * BYTES_PER_PIXEL)
    }

    /// Read pixel `(x, y)` (premultiplied).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> PixsurfResult<Color> {
        let at = self.offset(x, y)?;
        let px = &self.surface.buffer[at..at + BYTES_PER_PIXEL];
        Ok(Color::from_bgra([px[0], px[1], px[2], px[3]]))
    }

    /// Write pixel `(x, y)`; `color` is stored as-is (premultiplied).
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Color) -> PixsurfResult<()> {
        let at = self.offset(x, y)?;
        self.surface.buffer[at..at + BYTES_PER_PIXEL].copy_from_slice(&color.to_bgra());
        Ok(())
    }

    /// The `width * 4` pixel bytes of row `y`, without trailing padding.
    pub fn row(&self, y: u32) -> PixsurfResult<&[u8]> {
        let at = self.offset(0, y)?;
        Ok(&self.surface.buffer[at..at + self.width as usize * BYTES_PER_PIXEL])
    }

    /// Mutable variant of [`BufferLock::row`].
    pub fn row_mut(&mut self, y: u32) -> PixsurfResult<&mut [u8]> {
        let at = self.offset(0, y)?;
        let end = at + self.width as usize * BYTES_PER_PIXEL;
        Ok(&mut self.surface.buffer[at..end])
    }

    /// The whole buffer, `stride * height` bytes including row padding.
    pub fn bytes(&self) -> &[u8] {
        &self.surface.buffer
    }

    /// Mutable variant of [`BufferLock::bytes`].
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.surface.buffer
    }

    /// Copy out as straight-alpha RGBA8 with tightly packed rows.
    pub fn to_rgba_image(&self) -> PixsurfResult<image::RgbaImage> {
        let row_len = self.width as usize * BYTES_PER_PIXEL;
        let mut out = Vec::with_capacity(row_len * self.height as usize);
        for row in self.surface.buffer.chunks_exact(self.stride) {
            for px in row[..row_len].chunks_exact(BYTES_PER_PIXEL) {
                let a = px[3];
                out.extend_from_slice(&[
                    unpremul_channel(px[2], a),
                    unpremul_channel(px[1], a),
                    unpremul_channel(px[0], a),
                    a,
                ]);
            }
        }
        image::RgbaImage::from_raw(self.width, self.height, out)
            .ok_or_else(|| PixsurfError::illegal_state("surface buffer shorter than stride * height"))
    }

    /// Release the lock explicitly; equivalent to dropping it.
    pub fn unlock(self) {}

    /// Dispose the underlying surface while locked.
    pub fn dispose(self) {
        self.surface.dispose();
    }
}

impl Drop for BufferLock<'_> {
    fn drop(&mut self) {
        if self.surface.state == LockState::Locked {
            self.surface.state = LockState::Unlocked;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/lock.rs"]
mod tests;
