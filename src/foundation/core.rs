/// Bytes per canonical pixel (B, G, R, A).
pub const BYTES_PER_PIXEL: usize = 4;

/// Default row alignment; with 4 the canonical stride is exactly `width * 4`.
pub const DEFAULT_ROW_ALIGNMENT: usize = 4;

/// In-memory pixel layout of every surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PixelFormat {
    /// Premultiplied BGRA, one byte per channel, B at the lowest address.
    Bgra8Premul,
}

impl PixelFormat {
    /// Bytes occupied by one pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bgra8Premul => BYTES_PER_PIXEL,
        }
    }
}

/// Four 8-bit channels as stored in a surface.
///
/// Surfaces hold premultiplied data, so a `Color` read from a surface has
/// `r`, `g`, `b` already scaled by `a`. Equality is exact byte equality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Build from channel values exactly as given (no premultiplication).
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Premultiply straight (non-premultiplied) channels.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: premul_channel(r, a),
            g: premul_channel(g, a),
            b: premul_channel(b, a),
            a,
        }
    }

    /// Undo premultiplication; fully transparent pixels map to transparent black.
    pub fn to_straight_rgba(self) -> [u8; 4] {
        [
            unpremul_channel(self.r, self.a),
            unpremul_channel(self.g, self.a),
            unpremul_channel(self.b, self.a),
            self.a,
        ]
    }

    /// Build from the in-memory byte order (B, G, R, A).
    #[inline]
    pub fn from_bgra(px: [u8; 4]) -> Self {
        Self {
            b: px[0],
            g: px[1],
            r: px[2],
            a: px[3],
        }
    }

    /// In-memory byte order (B, G, R, A).
    #[inline]
    pub fn to_bgra(self) -> [u8; 4] {
        [self.b, self.g, self.r, self.a]
    }
}

#[inline]
pub(crate) fn premul_channel(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    ((u16::from(c) * u16::from(a) + 127) / 255) as u8
}

#[inline]
pub(crate) fn unpremul_channel(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let v = (u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a);
    v.min(255) as u8
}

/// Minimal row size in bytes for `width` canonical pixels, rounded up to
/// `row_alignment`. `None` on overflow or a zero alignment.
pub fn canonical_stride(width: u32, row_alignment: usize) -> Option<usize> {
    if row_alignment == 0 {
        return None;
    }
    let row = (width as usize).checked_mul(BYTES_PER_PIXEL)?;
    row.checked_next_multiple_of(row_alignment)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
