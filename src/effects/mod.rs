pub(crate) mod blend;
pub(crate) mod color_filter;
pub(crate) mod image_filter;
pub(crate) mod mask_filter;
