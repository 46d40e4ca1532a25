pub(crate) mod embedder;
pub(crate) mod params;
pub(crate) mod platform;
pub(crate) mod slice;
pub(crate) mod slicer;
pub(crate) mod surface_pool;
