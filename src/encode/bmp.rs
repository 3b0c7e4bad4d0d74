use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::Context as _;
use image::ImageEncoder as _;

use crate::{PixsurfResult, surface::pixel_surface::PixelSurface};

/// Encode `surface` as a 32-bit BMP with straight alpha.
///
/// Takes a lock for the duration of the export, so the surface must not be
/// disposed.
pub fn encode_bmp<W: Write>(surface: &mut PixelSurface, mut out: W) -> PixsurfResult<()> {
    let rgba = surface.with_lock(|lock| lock.to_rgba_image())?;
    image::codecs::bmp::BmpEncoder::new(&mut out)
        .write_image(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            image::ExtendedColorType::Rgba8,
        )
        .context("encode bmp")?;
    Ok(())
}

/// Write `surface` to `path` as BMP, creating parent directories.
pub fn save_bmp(surface: &mut PixelSurface, path: impl AsRef<Path>) -> PixsurfResult<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    let mut w = BufWriter::new(f);
    encode_bmp(surface, &mut w)?;
    w.flush()
        .with_context(|| format!("flush '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote bmp");
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> PixsurfResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/bmp.rs"]
mod tests;
