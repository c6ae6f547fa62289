pub mod geometry;
pub mod scene;
pub mod settings;
