use nalgebra::{Vector2, Vector3};

use saberview_chart::{Slider, DOT_DIRECTION};

use crate::geometry::{
    curve::{curve_length, CubicBezier},
    easing, lerp, Polyline,
};

use super::{
    motion::PlaybackState,
    placement::{cut_angle, direction_vector, same_plane_angles, GridLayout},
    tempo::TempoMap,
};

const DEFAULT_CONTROL_OFFSET: f32 = 2.5;

const MID_POINT_ROTATION: f32 = 90.0;
const MID_POINT_OFFSET: f32 = 2.5;
const MID_CONTROL_X_SCALE: f32 = 0.25;
const MID_CONTROL_Y_SCALE: f32 = 0.25;
const MID_CONTROL_Z_SCALE: f32 = 0.15;

/// Every curve keeps both of its endpoints.
const MIN_POINT_COUNT: usize = 2;
/// Head, mid anchor and tail.
const MIN_MID_ROTATION_POINT_COUNT: usize = 3;
/// Caps arcs lasting far longer than any song.
const MAX_POINT_COUNT: usize = 20_000;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MidRotation {
    #[default]
    None,
    Clockwise,
    CounterClockwise,
}

impl MidRotation {
    pub fn from_anchor_mode(mode: i32) -> Self {
        match mode.clamp(0, 2) {
            1 => Self::Clockwise,
            2 => Self::CounterClockwise,
            _ => Self::None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Arc {
    pub color: i32,

    pub beat: f32,
    pub time: f32,
    pub position: Vector2<f32>,
    pub head_angle: f32,
    pub head_direction: i32,
    pub head_offset_direction: Vector2<f32>,
    pub head_control_point: Vector2<f32>,
    pub head_dot: bool,

    pub tail_beat: f32,
    pub tail_time: f32,
    pub tail_position: Vector2<f32>,
    pub tail_angle: f32,
    pub tail_direction: i32,
    pub tail_offset_direction: Vector2<f32>,
    pub tail_control_point: Vector2<f32>,

    pub has_head_attachment: bool,
    /// Heights the endpoints spawn at before settling on their positions.
    pub head_start_y: f32,
    pub tail_start_y: f32,

    pub mid_rotation: MidRotation,

    pub base_curve: Polyline,
    pub curve_length: f32,
}

fn offset_direction(direction: i32, angle: f32) -> Vector2<f32> {
    if direction == DOT_DIRECTION {
        Vector2::zeros()
    } else {
        direction_vector(angle)
    }
}

impl Arc {
    pub fn from_slider(slider: &Slider, layout: &GridLayout, tempo: &TempoMap) -> Self {
        let mut head_position = layout.object_position(slider.x, slider.y, slider.coordinates);
        let mut tail_position =
            layout.object_position(slider.tail_x, slider.tail_y, slider.tail_coordinates);

        let mut head_angle = cut_angle(slider.direction);
        let mut tail_angle = cut_angle(slider.tail_direction);

        let mut head_offset_direction = offset_direction(slider.direction, head_angle);
        let mut tail_offset_direction = -offset_direction(slider.tail_direction, tail_angle);

        let mut head_control_point = head_position
            + head_offset_direction * slider.head_multiplier * DEFAULT_CONTROL_OFFSET;
        let mut tail_control_point = tail_position
            + tail_offset_direction * slider.tail_multiplier * DEFAULT_CONTROL_OFFSET;

        let mut head_beat = slider.beat;
        let mut tail_beat = slider.tail_beat;

        let mut head_direction = slider.direction;
        let mut tail_direction = slider.tail_direction;

        // Negative durations break the curve, so treat them as regular arcs.
        if tail_beat < head_beat {
            std::mem::swap(&mut head_beat, &mut tail_beat);
            std::mem::swap(&mut head_position, &mut tail_position);
            std::mem::swap(&mut head_angle, &mut tail_angle);
            std::mem::swap(&mut head_direction, &mut tail_direction);
            std::mem::swap(&mut head_offset_direction, &mut tail_offset_direction);
            std::mem::swap(&mut head_control_point, &mut tail_control_point);
        }

        let mid_rotation = if same_plane_angles(head_angle, tail_angle) && slider.x == slider.tail_x
        {
            MidRotation::from_anchor_mode(slider.mid_anchor_mode)
        } else {
            MidRotation::None
        };

        Self {
            color: slider.color,

            beat: head_beat,
            time: tempo.time_from_beat(head_beat),
            position: head_position,
            head_angle,
            head_direction,
            head_offset_direction,
            head_control_point,
            head_dot: head_direction == DOT_DIRECTION,

            tail_beat,
            tail_time: tempo.time_from_beat(tail_beat),
            tail_position,
            tail_angle,
            tail_direction,
            tail_offset_direction,
            tail_control_point,

            has_head_attachment: false,
            head_start_y: head_position.y,
            tail_start_y: tail_position.y,

            mid_rotation,

            base_curve: Vec::new(),
            curve_length: 0.0,
        }
    }

    pub fn duration(&self) -> f32 {
        (self.tail_time - self.time).abs()
    }

    /// Rebuilds the base curve and its length for the current jump settings.
    pub fn calculate_base_curve(&mut self, density: i32, playback: &PlaybackState) {
        let length = playback.world_space_from_time(self.duration());
        self.base_curve = arc_base_curve(self, density, length);
        self.curve_length = curve_length(&self.base_curve);
    }
}

fn point_count(density: i32, duration: f32) -> usize {
    let density = density.max(0);
    let samples = density as f32 * duration;
    let samples = if samples.is_finite() {
        samples.clamp(0.0, MAX_POINT_COUNT as f32) as usize
    } else {
        MAX_POINT_COUNT
    };

    (density as usize / 2)
        .max(samples.saturating_add(1))
        .clamp(MIN_POINT_COUNT, MAX_POINT_COUNT)
}

/// Control points of the arc with the depth axis spanning `length`.
fn control_points(arc: &Arc, length: f32) -> CubicBezier {
    CubicBezier::new(
        Vector3::new(arc.position.x, arc.position.y, 0.0),
        Vector3::new(arc.head_control_point.x, arc.head_control_point.y, 0.0),
        Vector3::new(arc.tail_control_point.x, arc.tail_control_point.y, length),
        Vector3::new(arc.tail_position.x, arc.tail_position.y, length),
    )
}

/// Curve of the arc at rest, head at z 0 and tail at z `length`.
pub fn arc_base_curve(arc: &Arc, density: i32, length: f32) -> Polyline {
    let count = point_count(density, arc.duration());
    let curve = control_points(arc, length);

    match arc.mid_rotation {
        MidRotation::None => curve.eased_points(count),
        _ => mid_rotation_points(arc, &curve, count),
    }
}

/// Point both halves of a mid rotation arc meet at.
pub fn mid_rotation_anchor(arc: &Arc, p0: Vector3<f32>, p3: Vector3<f32>) -> Vector3<f32> {
    let rotation = match arc.mid_rotation {
        MidRotation::Clockwise => -MID_POINT_ROTATION,
        _ => MID_POINT_ROTATION,
    };

    let offset = if arc.head_dot {
        Vector2::zeros()
    } else {
        direction_vector(arc.head_angle + rotation)
    };

    (p0 + p3) / 2.0 + Vector3::new(offset.x, offset.y, 0.0) * MID_POINT_OFFSET
}

fn approximately(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-6_f32.max(1e-6 * a.abs().max(b.abs()))
}

fn mid_control_offset(p1: Vector3<f32>, p2: Vector3<f32>, mid: Vector3<f32>) -> Vector3<f32> {
    let p1_distance = (p1 - mid).abs();
    let p2_distance = (p2 - mid).abs();

    // Equal end control coordinates would only add float noise.
    let mut x = if approximately(p1.x, p2.x) {
        0.0
    } else {
        (p1_distance.x + p2_distance.x) * MID_CONTROL_X_SCALE
    };
    let mut y = if approximately(p1.y, p2.y) {
        0.0
    } else {
        (p1_distance.y + p2_distance.y) * MID_CONTROL_Y_SCALE
    };
    let z = (p1_distance.z + p2_distance.z) * MID_CONTROL_Z_SCALE;

    if p1.x < p2.x {
        x = -x;
    }
    if p1.y < p2.y {
        y = -y;
    }

    Vector3::new(x, y, -z)
}

/// Two cubic curves joined at the mid anchor. The point count is odd so the
/// anchor sits exactly at index `count / 2`.
fn mid_rotation_points(arc: &Arc, curve: &CubicBezier, count: usize) -> Polyline {
    let count = if count % 2 == 0 { count + 1 } else { count }.max(MIN_MID_ROTATION_POINT_COUNT);

    let mid = mid_rotation_anchor(arc, curve.p0, curve.p3);
    let offset = mid_control_offset(curve.p1, curve.p2, mid);

    let mid_index = count / 2;
    let head_half = CubicBezier::new(curve.p0, curve.p1, mid + offset, mid);
    let tail_half = CubicBezier::new(mid, mid - offset, curve.p2, curve.p3);

    let mut points = head_half.eased_points(mid_index + 1);
    points.truncate(mid_index);
    points.extend(tail_half.eased_points(count - mid_index));
    points
}

/// Copy of `base_curve` with the endpoints raised by their spawn offsets. Each
/// offset fades out over half the jump distance from its end.
pub fn spawn_animation_offset(
    base_curve: &[Vector3<f32>],
    head_offset_y: f32,
    tail_offset_y: f32,
    jump_distance: f32,
) -> Polyline {
    let length = match base_curve.last() {
        Some(last) if last.z.abs() > f32::EPSILON => last.z,
        _ => return base_curve.to_vec(),
    };

    let falloff = jump_distance / 2.0;
    let weight = |distance: f32| {
        let normalized = if falloff > 0.0 {
            (distance / falloff).clamp(0.0, 1.0)
        } else {
            1.0
        };
        1.0 - easing::quad_out(normalized)
    };

    base_curve
        .iter()
        .map(|point| {
            let head = head_offset_y * weight(point.z);
            let tail = tail_offset_y * weight(length - point.z);

            let mut point = *point;
            point.y += lerp(head, tail, point.z / length);
            point
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slider() -> Slider {
        Slider {
            color: 1,
            beat: 0.0,
            x: 1,
            y: 0,
            direction: 1,
            head_multiplier: 1.0,
            tail_beat: 1.0,
            tail_x: 1,
            tail_y: 2,
            tail_direction: 0,
            tail_multiplier: 1.0,
            mid_anchor_mode: 0,
            coordinates: None,
            tail_coordinates: None,
        }
    }

    fn playback() -> PlaybackState {
        PlaybackState {
            beat: 0.0,
            time: 0.0,
            reaction_time: 1.0,
            note_jump_speed: 10.0,
            jump_distance: 20.0,
        }
    }

    fn arc(slider: &Slider) -> Arc {
        Arc::from_slider(slider, &GridLayout::default(), &TempoMap::new(60.0, &[]))
    }

    fn assert_close(a: Vector2<f32>, b: Vector2<f32>) {
        assert!((a - b).norm() < 1e-5, "{:?} != {:?}", a, b);
    }

    #[test]
    fn control_points_follow_cut_directions() {
        let arc = arc(&slider());

        // Down cut head, tail direction reversed.
        assert_close(arc.position, Vector2::new(-0.3, 0.0));
        assert_close(arc.head_control_point, Vector2::new(-0.3, -2.5));
        assert_close(arc.tail_position, Vector2::new(-0.3, 1.1));
        assert_close(arc.tail_control_point, Vector2::new(-0.3, -1.4));
        assert_eq!((arc.time, arc.tail_time), (0.0, 1.0));
    }

    #[test]
    fn dot_directions_have_no_control_offset() {
        let arc = arc(&Slider {
            direction: DOT_DIRECTION,
            tail_direction: DOT_DIRECTION,
            ..slider()
        });

        assert!(arc.head_dot);
        assert_eq!(arc.head_control_point, arc.position);
        assert_eq!(arc.tail_control_point, arc.tail_position);
    }

    #[test]
    fn reversed_arcs_swap_every_endpoint_field() {
        let reversed = Slider {
            beat: 4.0,
            x: 0,
            y: 0,
            direction: 1,
            head_multiplier: 1.0,
            tail_beat: 2.0,
            tail_x: 3,
            tail_y: 2,
            tail_direction: 0,
            tail_multiplier: 0.5,
            ..slider()
        };
        let arc = arc(&reversed);
        let layout = GridLayout::default();

        assert!(arc.beat <= arc.tail_beat);
        assert_eq!((arc.beat, arc.tail_beat), (2.0, 4.0));
        assert_eq!((arc.time, arc.tail_time), (2.0, 4.0));

        let record_tail = layout.object_position(3, 2, None);
        let record_head = layout.object_position(0, 0, None);
        assert_close(arc.position, record_tail);
        assert_close(arc.tail_position, record_head);

        assert_eq!(arc.head_angle, cut_angle(0));
        assert_eq!(arc.tail_angle, cut_angle(1));
        assert_eq!((arc.head_direction, arc.tail_direction), (0, 1));

        assert_close(arc.head_offset_direction, -direction_vector(cut_angle(0)));
        assert_close(arc.tail_offset_direction, direction_vector(cut_angle(1)));

        assert_close(
            arc.head_control_point,
            record_tail - direction_vector(cut_angle(0)) * 0.5 * DEFAULT_CONTROL_OFFSET,
        );
        assert_close(
            arc.tail_control_point,
            record_head + direction_vector(cut_angle(1)) * DEFAULT_CONTROL_OFFSET,
        );

        assert_eq!(arc.head_start_y, arc.position.y);
        assert_eq!(arc.tail_start_y, arc.tail_position.y);
        assert!(!arc.head_dot);
    }

    #[test]
    fn mid_rotation_needs_a_shared_plane_and_lane() {
        let clockwise = arc(&Slider {
            mid_anchor_mode: 1,
            ..slider()
        });
        assert_eq!(clockwise.mid_rotation, MidRotation::Clockwise);

        let clamped = arc(&Slider {
            mid_anchor_mode: 7,
            ..slider()
        });
        assert_eq!(clamped.mid_rotation, MidRotation::CounterClockwise);

        let other_lane = arc(&Slider {
            mid_anchor_mode: 1,
            tail_x: 2,
            ..slider()
        });
        assert_eq!(other_lane.mid_rotation, MidRotation::None);

        let crossed = arc(&Slider {
            mid_anchor_mode: 1,
            tail_direction: 2,
            ..slider()
        });
        assert_eq!(crossed.mid_rotation, MidRotation::None);
    }

    #[test]
    fn base_curve_spans_head_to_tail() {
        let mut arc = arc(&slider());
        arc.calculate_base_curve(60, &playback());

        // max(60 / 2, 60 * 1s + 1)
        assert_eq!(arc.base_curve.len(), 61);

        let head = arc.base_curve[0];
        let tail = arc.base_curve[60];
        assert!((head - Vector3::new(-0.3, 0.0, 0.0)).norm() < 1e-5);
        assert!((tail - Vector3::new(-0.3, 1.1, 10.0)).norm() < 1e-4);
        assert!(arc.curve_length >= (tail - head).norm());
    }

    #[test]
    fn short_arcs_keep_a_minimum_point_count() {
        let instant = arc(&Slider {
            tail_beat: 0.0,
            ..slider()
        });
        assert_eq!(arc_base_curve(&instant, 60, 0.0).len(), 30);
        assert_eq!(arc_base_curve(&instant, 0, 0.0).len(), MIN_POINT_COUNT);

        let rotating = Arc {
            mid_rotation: MidRotation::Clockwise,
            ..instant
        };
        assert_eq!(arc_base_curve(&rotating, 0, 0.0).len(), MIN_MID_ROTATION_POINT_COUNT);
    }

    #[test]
    fn endless_arcs_are_capped() {
        let endless = arc(&Slider {
            tail_beat: 1e9,
            ..slider()
        });
        let points = arc_base_curve(&endless, 60, 10.0);

        assert_eq!(points.len(), MAX_POINT_COUNT);
        assert!((points[0] - Vector3::new(-0.3, 0.0, 0.0)).norm() < 1e-5);
        assert!((points[MAX_POINT_COUNT - 1].z - 10.0).abs() < 1e-3);

        assert_eq!(point_count(i32::MAX, f32::INFINITY), MAX_POINT_COUNT);
        assert_eq!(point_count(60, f32::NAN), MAX_POINT_COUNT);
    }

    #[test]
    fn mid_rotation_curve_meets_at_its_anchor() {
        for (density, expected) in [(60, 61), (61, 63)] {
            for mode in [1, 2] {
                let arc = arc(&Slider {
                    mid_anchor_mode: mode,
                    ..slider()
                });
                assert_ne!(arc.mid_rotation, MidRotation::None);

                let points = arc_base_curve(&arc, density, 10.0);
                assert_eq!(points.len(), expected);
                assert_eq!(points.len() % 2, 1);

                let anchor = mid_rotation_anchor(
                    &arc,
                    Vector3::new(arc.position.x, arc.position.y, 0.0),
                    Vector3::new(arc.tail_position.x, arc.tail_position.y, 10.0),
                );
                assert!((points[points.len() / 2] - anchor).norm() < 1e-4);

                assert!((points[0] - Vector3::new(-0.3, 0.0, 0.0)).norm() < 1e-5);
                assert!((points[expected - 1] - Vector3::new(-0.3, 1.1, 10.0)).norm() < 1e-4);
            }
        }
    }

    #[test]
    fn mid_anchor_is_displaced_sideways() {
        let clockwise = arc(&Slider {
            mid_anchor_mode: 1,
            ..slider()
        });
        let counter = Arc {
            mid_rotation: MidRotation::CounterClockwise,
            ..clockwise.clone()
        };
        let dot = Arc {
            head_dot: true,
            ..clockwise.clone()
        };

        let p0 = Vector3::new(0.0, 0.0, 0.0);
        let p3 = Vector3::new(0.0, 1.0, 10.0);
        let centre = Vector3::new(0.0, 0.5, 5.0);

        // Down cut head: clockwise swings to the left.
        let a = mid_rotation_anchor(&clockwise, p0, p3);
        let b = mid_rotation_anchor(&counter, p0, p3);
        assert!((a - (centre + Vector3::new(-2.5, 0.0, 0.0))).norm() < 1e-5);
        assert!((b - (centre + Vector3::new(2.5, 0.0, 0.0))).norm() < 1e-5);
        assert!((mid_rotation_anchor(&dot, p0, p3) - centre).norm() < 1e-6);
    }

    #[test]
    fn equal_control_coordinates_add_no_offset() {
        let mid = Vector3::new(1.0, 1.0, 5.0);
        let offset = mid_control_offset(
            Vector3::new(0.5, 0.0, 0.0),
            Vector3::new(0.5, 2.0, 10.0),
            mid,
        );
        assert_eq!(offset.x, 0.0);
        // p1 below p2 flips the sign.
        assert!((offset.y - -0.5).abs() < 1e-6);
        assert!((offset.z - -1.5).abs() < 1e-6);
    }

    #[test]
    fn zero_spawn_offsets_keep_the_curve() {
        let mut arc = arc(&slider());
        arc.calculate_base_curve(60, &playback());

        let offset = spawn_animation_offset(&arc.base_curve, 0.0, 0.0, 20.0);
        assert_eq!(offset, arc.base_curve);
    }

    #[test]
    fn flat_curves_are_returned_unchanged() {
        let flat = vec![Vector3::new(0.0, 1.0, 0.0), Vector3::new(1.0, 1.0, 0.0)];
        assert_eq!(spawn_animation_offset(&flat, 3.0, -2.0, 20.0), flat);
        assert!(spawn_animation_offset(&[], 3.0, -2.0, 20.0).is_empty());
    }

    #[test]
    fn spawn_offsets_fade_from_their_ends() {
        let curve = (0..=20)
            .map(|z| Vector3::new(0.0, 0.0, z as f32))
            .collect::<Vec<_>>();

        let offset = spawn_animation_offset(&curve, -1.0, 0.5, 20.0);
        assert_eq!(offset.len(), curve.len());
        assert!((offset[0].y - -1.0).abs() < 1e-6);
        assert!((offset[20].y - 0.5).abs() < 1e-6);
        // Both ends are out of falloff range in the middle.
        assert!(offset[10].y.abs() < 1e-6);
        assert!(offset.iter().zip(&curve).all(|(a, b)| a.z == b.z));

        // Non-positive jump distances never divide by zero.
        let degenerate = spawn_animation_offset(&curve, -1.0, 0.5, 0.0);
        assert!(degenerate.iter().all(|p| p.y.is_finite()));
    }
}
