//! Arcs placed in the scene and the window of them kept on screen.

pub mod arc;
pub mod motion;
pub mod placement;
pub mod pool;
pub mod tempo;
pub mod window;

pub use arc::{Arc, MidRotation};
pub use motion::{JumpParameters, ObjectMotion, PlaybackState, TimeWindow};
pub use placement::GridLayout;
pub use pool::{ArcMaterial, ArcPool, ArcVisual};
pub use tempo::TempoMap;
pub use window::{ArcOptions, ArcStyle, ArcWindow};
