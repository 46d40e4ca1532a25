pub(crate) mod backend;
pub(crate) mod canvas;
pub(crate) mod cpu;
pub(crate) mod dispatch;
pub(crate) mod stroke;
