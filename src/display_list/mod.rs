pub(crate) mod builder;
pub(crate) mod list;
pub(crate) mod ops;
pub(crate) mod paint;
pub(crate) mod rtree;
pub(crate) mod types;
