//! pixsurf provides fast, direct pixel access to in-memory bitmap surfaces.
//!
//! It is the substrate beneath an image-effects pipeline: every surface holds
//! its pixels in one canonical layout, premultiplied BGRA with one byte per
//! channel, so effect code can use a single fixed address computation
//! (`y * stride + x * 4`) and channel order.
//!
//! # Overview
//!
//! 1. **Load**: a [`SourceLoader`] builds a [`PixelSurface`] from one of four
//!    origins (blank allocation, file path, encoded bytes, decoded image).
//! 2. **Normalize**: decoded frames pass through [`normalize`] into the
//!    canonical layout; canonical frames are adopted without copying.
//! 3. **Lock**: [`PixelSurface::lock`] hands out a [`BufferLock`], the only
//!    type with pixel accessors. The lock borrows the surface exclusively and
//!    releases on drop.
//! 4. **Dispose**: [`PixelSurface::dispose`] (or [`PixelSurface::scoped`])
//!    releases the buffer deterministically.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded surfaces**: no internal synchronization; callers
//!   serialize access to a surface.
//! - **Always-on bounds checks**: out-of-range coordinates are errors in every
//!   build profile, never clamped.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod effects;
mod encode;
mod foundation;
mod source;
mod surface;

pub use effects::binding::{EffectBinding, SamplerSlot, ShaderConstant, UnsharpMaskParams};
pub use effects::blur::{MAX_BLUR_RADIUS, blur_bgra8_premul};
pub use effects::unsharp::apply_unsharp_mask;
pub use encode::bmp::{encode_bmp, save_bmp};
pub use foundation::core::{
    BYTES_PER_PIXEL, Color, DEFAULT_ROW_ALIGNMENT, PixelFormat, canonical_stride,
};
pub use foundation::error::{PixsurfError, PixsurfResult};
pub use source::decode::{
    DecodeOptions, DecodedFrame, FrameDecoder, FrameFormat, FrameSamples, ImageCrateDecoder,
    validate_icc_profile,
};
pub use source::loader::{DecodeLimits, LoadOptions, SourceLoader};
pub use source::normalize::{CanonicalBuffer, normalize};
pub use surface::lock::BufferLock;
pub use surface::pixel_surface::{LockState, PixelSurface};
