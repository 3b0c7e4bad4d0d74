pub(crate) mod binding;
pub(crate) mod blur;
pub(crate) mod unsharp;
