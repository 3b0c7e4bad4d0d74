pub(crate) mod lock;
pub(crate) mod pixel_surface;
