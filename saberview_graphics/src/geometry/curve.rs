use flo_curves::bezier::{self, *};
use nalgebra::Vector3;

use super::easing;

/// Control polygon of a cubic bezier in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub p0: Vector3<f32>,
    pub p1: Vector3<f32>,
    pub p2: Vector3<f32>,
    pub p3: Vector3<f32>,
}

fn coord(v: Vector3<f32>) -> flo_curves::Coord2 {
    flo_curves::Coord2(v.x as _, v.y as _)
}

fn create_cubic_bezier_curve(curve: &CubicBezier) -> bezier::Curve<flo_curves::Coord2> {
    bezier::Curve::from_points(
        coord(curve.p0),
        (coord(curve.p1), coord(curve.p2)),
        coord(curve.p3),
    )
}

/// flo_curves has no 3D coordinate type, so depth is evaluated as its own f64 curve.
fn point_on_curve(
    curve: &bezier::Curve<flo_curves::Coord2>,
    control: &CubicBezier,
    t: f32,
) -> Vector3<f32> {
    let t = t as f64;
    let xy = curve.point_at_pos(t);
    let z: f64 = bezier::basis(
        t,
        control.p0.z as f64,
        control.p1.z as f64,
        control.p2.z as f64,
        control.p3.z as f64,
    );
    Vector3::new(xy.0 as f32, xy.1 as f32, z as f32)
}

impl CubicBezier {
    pub fn new(p0: Vector3<f32>, p1: Vector3<f32>, p2: Vector3<f32>, p3: Vector3<f32>) -> Self {
        Self { p0, p1, p2, p3 }
    }

    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        cubic_bezier_point(self.p0, self.p1, self.p2, self.p3, t)
    }

    /// `count` points with `t` eased by quadratic in-out, which puts more points
    /// near both ends where the curvature is highest.
    pub fn eased_points(&self, count: usize) -> Vec<Vector3<f32>> {
        let curve = create_cubic_bezier_curve(self);
        let last = count.saturating_sub(1).max(1) as f32;
        (0..count)
            .map(|i| easing::quad_in_out(i as f32 / last))
            .map(|t| point_on_curve(&curve, self, t))
            .collect()
    }
}

/// Gets a point's position within a cubic bezier curve.
pub fn cubic_bezier_point(
    p0: Vector3<f32>,
    p1: Vector3<f32>,
    p2: Vector3<f32>,
    p3: Vector3<f32>,
    t: f32,
) -> Vector3<f32> {
    let control = CubicBezier::new(p0, p1, p2, p3);
    point_on_curve(&create_cubic_bezier_curve(&control), &control, t)
}

/// Sum of the distances between consecutive points. Zero for fewer than two points.
pub fn curve_length(points: &[Vector3<f32>]) -> f32 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}
