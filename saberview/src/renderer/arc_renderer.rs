use nalgebra::{Vector3, Vector4};

use saberview_graphics::scene::{ArcMaterial, ArcPool, ArcVisual};

fn base_color(color: i32) -> Vector4<f32> {
    match color {
        0 => Vector4::new(0.78, 0.08, 0.08, 1.0),
        1 => Vector4::new(0.16, 0.56, 0.84, 1.0),
        _ => {
            log::warn!("Encountered unknown arc color {}", color);
            Vector4::new(1.0, 1.0, 1.0, 1.0)
        }
    }
}

/// CPU side line strip of an arc, ready to be uploaded.
#[derive(Clone, Debug)]
pub(crate) struct ArcLine {
    pub(crate) id: usize,
    pub(crate) base_color: Vector4<f32>,
    pub(crate) material: Option<ArcMaterial>,
    pub(crate) points: Vec<Vector3<f32>>,
    /// Curve length and the distances its ends fade over.
    pub(crate) gradient: (f32, f32, f32),
    pub(crate) width: f32,
    pub(crate) alpha: f32,
    pub(crate) texture_offset: f32,
    pub(crate) z_position: f32,
}

impl ArcLine {
    fn new(id: usize) -> Self {
        Self {
            id,
            base_color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            material: None,
            points: Vec::new(),
            gradient: (0.0, 0.0, 0.0),
            width: 0.0,
            alpha: 0.0,
            texture_offset: 0.0,
            z_position: 0.0,
        }
    }

    fn reset(&mut self) {
        *self = Self {
            // Keep the allocation around for the next arc.
            points: std::mem::take(&mut self.points),
            ..Self::new(self.id)
        };
        self.points.clear();
    }
}

impl ArcVisual for ArcLine {
    fn set_points(&mut self, points: &[Vector3<f32>]) {
        self.points.clear();
        self.points.extend_from_slice(points);
    }

    fn set_gradient(&mut self, length: f32, fade_start: f32, fade_end: f32) {
        self.gradient = (length, fade_start, fade_end);
    }

    fn set_width(&mut self, width: f32) {
        self.width = width;
    }

    fn set_properties(&mut self, alpha: f32, texture_offset: f32) {
        self.alpha = alpha;
        self.texture_offset = texture_offset;
    }

    fn set_z(&mut self, z: f32) {
        self.z_position = z;
    }
}

/// Pre-allocated arc lines. Grows when more arcs are on screen than expected.
pub(crate) struct ArcLinePool {
    free: Vec<ArcLine>,
    created: usize,
    acquired: usize,
    released: usize,
    peak_in_use: usize,
}

impl ArcLinePool {
    pub(crate) fn with_capacity(size: usize) -> Self {
        Self {
            free: (0..size).rev().map(ArcLine::new).collect(),
            created: size,
            acquired: 0,
            released: 0,
            peak_in_use: 0,
        }
    }

    pub(crate) fn in_use(&self) -> usize {
        self.acquired - self.released
    }

    pub(crate) fn acquired(&self) -> usize {
        self.acquired
    }

    pub(crate) fn released(&self) -> usize {
        self.released
    }

    pub(crate) fn created(&self) -> usize {
        self.created
    }

    pub(crate) fn peak_in_use(&self) -> usize {
        self.peak_in_use
    }
}

impl ArcPool for ArcLinePool {
    type Visual = ArcLine;

    fn acquire(&mut self, material: &ArcMaterial) -> ArcLine {
        let mut line = self.free.pop().unwrap_or_else(|| {
            log::debug!("Arc line pool exhausted, creating line {}", self.created);
            self.created += 1;
            ArcLine::new(self.created - 1)
        });

        line.material = Some(*material);
        line.base_color = base_color(material.color);

        self.acquired += 1;
        self.peak_in_use = self.peak_in_use.max(self.in_use());
        line
    }

    fn release(&mut self, mut line: ArcLine) {
        line.reset();
        self.released += 1;
        self.free.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(color: i32) -> ArcMaterial {
        ArcMaterial {
            color,
            fade_start_point: 0.0,
            fade_end_point: 9.0,
            fade_transition_length: 2.0,
        }
    }

    #[test]
    fn pool_reuses_released_lines() {
        let mut pool = ArcLinePool::with_capacity(2);

        let mut a = pool.acquire(&material(0));
        let b = pool.acquire(&material(1));
        assert_eq!((a.id, b.id), (0, 1));
        assert_eq!(b.base_color, base_color(1));

        a.set_points(&[Vector3::zeros(), Vector3::new(0.0, 0.0, 1.0)]);
        pool.release(a);

        let c = pool.acquire(&material(1));
        assert_eq!(c.id, 0);
        assert!(c.points.is_empty());
        assert_eq!(pool.created(), 2);

        pool.release(b);
        pool.release(c);
        assert_eq!(pool.acquired(), pool.released());
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.peak_in_use(), 2);
    }

    #[test]
    fn pool_grows_past_its_capacity() {
        let mut pool = ArcLinePool::with_capacity(1);
        let lines = (0..3).map(|_| pool.acquire(&material(0))).collect::<Vec<_>>();

        assert_eq!(pool.created(), 3);
        assert_eq!(pool.in_use(), 3);

        for line in lines {
            pool.release(line);
        }
        assert_eq!(pool.in_use(), 0);
    }
}
