use nalgebra::Vector2;

use saberview_chart::CustomCoordinates;

/// Lane offset of custom coordinates, which are relative to the grid centre.
const CUSTOM_COORDINATE_LANE_OFFSET: f32 = 2.0;

/// Layout of the 4x3 note grid in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    pub bottom_left: Vector2<f32>,
    pub lane_width: f32,
    pub row_height: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            bottom_left: Vector2::new(-0.9, 0.0),
            lane_width: 0.6,
            row_height: 0.55,
        }
    }
}

impl GridLayout {
    pub fn object_position(&self, x: i32, y: i32, coordinates: CustomCoordinates) -> Vector2<f32> {
        match coordinates {
            Some([cx, cy]) => Vector2::new(
                self.bottom_left.x + (cx + CUSTOM_COORDINATE_LANE_OFFSET) * self.lane_width,
                self.bottom_left.y + cy * self.row_height,
            ),
            None => Vector2::new(
                self.bottom_left.x + x as f32 * self.lane_width,
                self.bottom_left.y + y as f32 * self.row_height,
            ),
        }
    }
}

/// Rotation in degrees of a cut direction, 0 being a downwards cut.
pub fn cut_angle(direction: i32) -> f32 {
    match direction {
        0 => 180.0,
        1 => 0.0,
        2 => -90.0,
        3 => 90.0,
        4 => -135.0,
        5 => 135.0,
        6 => -45.0,
        7 => 45.0,
        _ => 0.0,
    }
}

/// Unit vector a cut at `angle` degrees travels along.
pub fn direction_vector(angle: f32) -> Vector2<f32> {
    let radians = angle.to_radians();
    Vector2::new(radians.sin(), -radians.cos())
}

/// Whether two angles lie on the same cut plane, parallel or opposite.
pub fn same_plane_angles(a: f32, b: f32) -> bool {
    const TOLERANCE: f32 = 0.01;

    let difference = (a - b).rem_euclid(180.0);
    difference < TOLERANCE || difference > 180.0 - TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vector2<f32>, b: Vector2<f32>) {
        assert!((a - b).norm() < 1e-5, "{:?} != {:?}", a, b);
    }

    #[test]
    fn grid_positions() {
        let layout = GridLayout::default();
        assert_close(layout.object_position(0, 0, None), Vector2::new(-0.9, 0.0));
        assert_close(layout.object_position(3, 2, None), Vector2::new(0.9, 1.1));
    }

    #[test]
    fn custom_coordinates_are_centred() {
        let layout = GridLayout::default();
        assert_close(
            layout.object_position(3, 2, Some([-2.0, 0.0])),
            layout.object_position(0, 0, None),
        );
        assert_close(
            layout.object_position(0, 0, Some([0.5, 1.0])),
            Vector2::new(0.6, 0.55),
        );
    }

    #[test]
    fn directions_follow_cut_angles() {
        assert_close(direction_vector(cut_angle(1)), Vector2::new(0.0, -1.0));
        assert_close(direction_vector(cut_angle(0)), Vector2::new(0.0, 1.0));
        assert_close(direction_vector(cut_angle(2)), Vector2::new(-1.0, 0.0));
        assert_close(direction_vector(cut_angle(3)), Vector2::new(1.0, 0.0));
    }

    #[test]
    fn cut_planes() {
        assert!(same_plane_angles(cut_angle(0), cut_angle(1)));
        assert!(same_plane_angles(cut_angle(2), cut_angle(3)));
        assert!(same_plane_angles(cut_angle(4), cut_angle(7)));
        assert!(!same_plane_angles(cut_angle(0), cut_angle(2)));
        assert!(!same_plane_angles(cut_angle(4), cut_angle(5)));
    }
}
