use std::path::Path;

use crate::{
    foundation::core::{DEFAULT_ROW_ALIGNMENT, PixelFormat, canonical_stride},
    foundation::error::{PixsurfError, PixsurfResult},
    source::decode::DecodedFrame,
    source::loader::{LoadOptions, SourceLoader},
    source::normalize::CanonicalBuffer,
    surface::lock::BufferLock,
};

/// Lock state of a [`PixelSurface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockState {
    /// No live [`BufferLock`]; the surface can be locked.
    Unlocked,
    /// A [`BufferLock`] was handed out and has not been released.
    Locked,
    /// Buffer released; terminal.
    Disposed,
}

/// An owned bitmap in the canonical premultiplied BGRA8 layout.
///
/// Pixel memory is only reachable through a [`BufferLock`] obtained from
/// [`PixelSurface::lock`]. The byte address of pixel `(x, y)` inside the
/// buffer is `y * stride + x * 4`, channels B, G, R, A from low to high byte.
///
/// Release is explicit: call [`PixelSurface::dispose`] (or use
/// [`PixelSurface::scoped`]). Dropping an undisposed surface still frees its
/// memory, but that path is a leak mitigation only.
#[derive(Debug)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    stride: usize,
    pub(crate) buffer: Vec<u8>,
    pub(crate) state: LockState,
    source: Option<Vec<u8>>,
}

impl PixelSurface {
    /// Allocate a zero-filled (transparent) surface with the minimal stride `width * 4`.
    pub fn create(width: u32, height: u32) -> PixsurfResult<Self> {
        Self::create_aligned(width, height, DEFAULT_ROW_ALIGNMENT)
    }

    /// Allocate a zero-filled surface whose rows are padded to `row_alignment` bytes.
    pub fn create_aligned(width: u32, height: u32, row_alignment: usize) -> PixsurfResult<Self> {
        let invalid = || PixsurfError::InvalidDimensions { width, height };
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        let stride = canonical_stride(width, row_alignment).ok_or_else(invalid)?;
        let len = stride.checked_mul(height as usize).ok_or_else(invalid)?;

        Ok(Self::from_canonical(CanonicalBuffer {
            width,
            height,
            stride,
            data: vec![0u8; len],
        }))
    }

    /// Decode the image file at `path` with default [`LoadOptions`].
    pub fn from_path(path: impl AsRef<Path>) -> PixsurfResult<Self> {
        SourceLoader::new(LoadOptions::default())?.load_path(path)
    }

    /// Decode the first frame of `bytes` with default [`LoadOptions`].
    ///
    /// Empty input yields `Ok(None)`.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> PixsurfResult<Option<Self>> {
        SourceLoader::new(LoadOptions::default())?.load_bytes(bytes)
    }

    /// Adopt an already-decoded image (e.g. `image::DynamicImage`).
    pub fn from_decoded_image(image: impl Into<DecodedFrame>) -> PixsurfResult<Self> {
        SourceLoader::new(LoadOptions::default())?.load_decoded(image)
    }

    pub(crate) fn from_canonical(buf: CanonicalBuffer) -> Self {
        debug_assert!(buf.stride >= buf.width as usize * 4);
        debug_assert_eq!(buf.data.len(), buf.stride * buf.height as usize);
        Self {
            width: buf.width,
            height: buf.height,
            stride: buf.stride,
            buffer: buf.data,
            state: LockState::Unlocked,
            source: None,
        }
    }

    pub(crate) fn with_source(mut self, bytes: Vec<u8>) -> Self {
        self.source = Some(bytes);
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

    /// Bytes per row, `>= width * 4`.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Always [`PixelFormat::Bgra8Premul`].
    pub fn pixel_format(&self) -> PixelFormat {
        PixelFormat::Bgra8Premul
    }

    /// Current lock state.
    pub fn lock_state(&self) -> LockState {
        self.state
    }

    /// Whether [`PixelSurface::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        self.state == LockState::Disposed
    }

    /// Encoded bytes retained from [`SourceLoader::load_bytes`], if any.
    pub fn source_bytes(&self) -> PixsurfResult<Option<&[u8]>> {
        if self.is_disposed() {
            return Err(PixsurfError::illegal_state("source bytes read after dispose"));
        }
        Ok(self.source.as_deref())
    }

    /// Acquire exclusive pixel access.
    ///
    /// Fails with [`PixsurfError::AlreadyDisposed`] after disposal and with
    /// [`PixsurfError::IllegalState`] if a previous lock was leaked without
    /// being released (see [`PixelSurface::unlock`]).
    pub fn lock(&mut self) -> PixsurfResult<BufferLock<'_>> {
        match self.state {
            LockState::Disposed => Err(PixsurfError::AlreadyDisposed),
            LockState::Locked => Err(PixsurfError::illegal_state(
                "surface is already locked; release the previous BufferLock first",
            )),
            LockState::Unlocked => {
                self.state = LockState::Locked;
                Ok(BufferLock::new(self))
            }
        }
    }

    /// Run `f` under a lock; the lock is released on every exit path.
    pub fn with_lock<R>(
        &mut self,
        f: impl FnOnce(&mut BufferLock<'_>) -> PixsurfResult<R>,
    ) -> PixsurfResult<R> {
        let mut lock = self.lock()?;
        f(&mut lock)
    }

    /// Clear a `Locked` state whose [`BufferLock`] was leaked (`mem::forget`).
    ///
    /// No-op when unlocked or disposed.
    pub fn unlock(&mut self) {
        if self.state == LockState::Locked {
            tracing::warn!(
                width = self.width,
                height = self.height,
                "clearing stale lock left by a leaked BufferLock"
            );
            self.state = LockState::Unlocked;
        }
    }

    /// Release the pixel buffer and any retained source bytes.
    ///
    /// Implicitly unlocks; safe to call any number of times.
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.release();
        tracing::debug!(width = self.width, height = self.height, "surface disposed");
    }

    /// Scoped acquisition: run `f` and dispose the surface afterwards,
    /// including when `f` returns an error.
    ///
    /// If `f` panics, `dispose` is skipped and the buffer is released by the
    /// `Drop` safety net while the panic unwinds.
    pub fn scoped<R>(mut self, f: impl FnOnce(&mut PixelSurface) -> R) -> R {
        let out = f(&mut self);
        self.dispose();
        out
    }

    fn release(&mut self) {
        self.state = LockState::Disposed;
        self.buffer = Vec::new();
        self.source = None;
    }
}

/// Last-resort release for surfaces that were never disposed. Runs whenever the
/// owner drops the value; do not rely on it for ordering of resource release.
impl Drop for PixelSurface {
    fn drop(&mut self) {
        if !self.is_disposed() {
            tracing::debug!(
                width = self.width,
                height = self.height,
                "surface dropped without dispose; releasing buffer"
            );
            self.release();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/pixel_surface.rs"]
mod tests;
