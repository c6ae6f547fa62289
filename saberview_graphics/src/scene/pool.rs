use nalgebra::Vector3;

/// Material parameters an arc visual is created with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcMaterial {
    pub color: i32,
    /// Depth range over which the arc fades out as it approaches the player.
    pub fade_start_point: f32,
    pub fade_end_point: f32,
    pub fade_transition_length: f32,
}

/// A pooled arc visual owned by exactly one rendered arc.
pub trait ArcVisual {
    fn set_points(&mut self, points: &[Vector3<f32>]);

    /// Fades both ends of an arc `length` long.
    fn set_gradient(&mut self, length: f32, fade_start: f32, fade_end: f32);

    fn set_width(&mut self, width: f32);

    fn set_properties(&mut self, alpha: f32, texture_offset: f32);

    fn set_z(&mut self, z: f32);
}

/// Source of arc visuals. Every acquired visual is handed back through
/// [`ArcPool::release`] exactly once.
pub trait ArcPool {
    type Visual: ArcVisual;

    fn acquire(&mut self, material: &ArcMaterial) -> Self::Visual;

    fn release(&mut self, visual: Self::Visual);
}
