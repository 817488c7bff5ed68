pub(crate) mod mover;
pub(crate) mod scene;
