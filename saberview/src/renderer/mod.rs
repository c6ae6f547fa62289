pub(crate) mod arc_renderer;
