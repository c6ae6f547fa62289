use crate::{
    geometry::Polyline,
    settings::{BoolSetting, FloatSetting, IntSetting, Settings},
};

use super::{
    arc::{spawn_animation_offset, Arc},
    motion::{ObjectMotion, PlaybackState, TimeWindow},
    pool::{ArcMaterial, ArcPool, ArcVisual},
};

const CLOSE_FADE_DISTANCE: f32 = 0.0;
const FADE_DISTANCE_SCALE: f32 = 0.9;
/// Arcs with a head reach full transparency at this share of the jump distance.
const HEAD_FADE_DISTANCE_SCALE: f32 = 0.85;
/// Texture offset used when texture animation is off.
const STATIC_TEXTURE_OFFSET: f32 = 0.509;

/// Fixed look of arcs that is not user configurable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcStyle {
    pub end_fade_start: f32,
    pub end_fade_end: f32,
    pub fade_transition_length: f32,
    /// Beats a headless arc takes to fade in after its start.
    pub headless_fade_beats: f32,
    /// Texture scroll per second.
    pub animation_speed: f32,
}

impl Default for ArcStyle {
    fn default() -> Self {
        Self {
            end_fade_start: 0.5,
            end_fade_end: 0.15,
            fade_transition_length: 2.0,
            headless_fade_beats: 1.0,
            animation_speed: 0.5,
        }
    }
}

/// User settings that affect arcs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcOptions {
    /// Curve points per second.
    pub density: i32,
    pub width: f32,
    pub brightness: f32,
    pub fade_animation: bool,
    pub texture_animation: bool,
    pub move_animations: bool,
}

impl ArcOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            density: settings.get_int(IntSetting::ArcDensity),
            width: settings.get_float(FloatSetting::ArcWidth),
            brightness: settings.get_float(FloatSetting::ArcBrightness),
            fade_animation: settings.get_bool(BoolSetting::ArcFadeAnimation),
            texture_animation: settings.get_bool(BoolSetting::ArcTextureAnimation),
            move_animations: settings.get_bool(BoolSetting::MoveAnimations),
        }
    }
}

impl Default for ArcOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Keeps visuals for exactly the arcs inside the spawn window.
pub struct ArcWindow<P: ArcPool> {
    /// Sorted by head time.
    arcs: Vec<Arc>,
    /// Parallel to `arcs`.
    visuals: Vec<Option<P::Visual>>,
    /// Indices into `arcs` that currently own a visual.
    rendered: Vec<usize>,
    longest_duration: f32,

    pool: P,
    motion: ObjectMotion,
    style: ArcStyle,
    options: ArcOptions,
}

impl<P: ArcPool> ArcWindow<P> {
    pub fn new(pool: P, motion: ObjectMotion, style: ArcStyle, settings: &Settings) -> Self {
        Self {
            arcs: Vec::new(),
            visuals: Vec::new(),
            rendered: Vec::new(),
            longest_duration: 0.0,
            pool,
            motion,
            style,
            options: ArcOptions::from_settings(settings),
        }
    }

    /// Replaces every arc, releasing all visuals.
    pub fn reload(&mut self, mut arcs: Vec<Arc>) {
        self.clear_rendered();

        arcs.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.longest_duration = arcs.iter().map(Arc::duration).fold(0.0, f32::max);
        self.visuals = arcs.iter().map(|_| None).collect();
        self.arcs = arcs;

        log::debug!(
            "Reloaded {} arcs, longest lasting {}s",
            self.arcs.len(),
            self.longest_duration
        );
    }

    /// Settings take effect on the next update; every visual is rebuilt.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.clear_rendered();
        self.options = ArcOptions::from_settings(settings);
    }

    /// Marks the arc as starting on a note that spawns at `start_y`.
    pub fn attach_head(&mut self, index: usize, start_y: f32) {
        match self.arcs.get_mut(index) {
            Some(arc) => {
                arc.has_head_attachment = true;
                arc.head_start_y = start_y;
            }
            None => log::warn!("Attaching a head to missing arc {}", index),
        }
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    /// Indices of rendered arcs, in the order they were first rendered.
    pub fn rendered(&self) -> &[usize] {
        &self.rendered
    }

    pub fn is_rendered(&self, index: usize) -> bool {
        matches!(self.visuals.get(index), Some(Some(_)))
    }

    pub fn visual(&self, index: usize) -> Option<&P::Visual> {
        self.visuals.get(index).and_then(Option::as_ref)
    }

    pub fn options(&self) -> &ArcOptions {
        &self.options
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    pub fn update(&mut self, playback: &PlaybackState) {
        self.clear_outside(playback);

        let window = self.motion.spawn_window(playback);
        let Some(first) = self.first_in_range(window) else {
            return;
        };

        let mut last_beat = 0.0;
        for index in first..self.arcs.len() {
            let arc = &self.arcs[index];
            if window.intersects(arc.time, arc.tail_time) {
                last_beat = arc.tail_beat;
                self.update_visual(index, playback);
            } else if arc.tail_beat - arc.beat <= arc.beat - last_beat {
                // Arcs overlapping the last rendered one may hide later arcs that
                // are still in range, keep going until the gap is larger.
                break;
            }
        }
    }

    /// First arc intersecting `window`. Arcs starting earlier than the longest
    /// duration before the window can't reach it and are skipped by a search.
    fn first_in_range(&self, window: TimeWindow) -> Option<usize> {
        let lower = window.start - self.longest_duration;
        let start = self.arcs.partition_point(|a| a.time < lower);

        self.arcs[start..]
            .iter()
            .take_while(|a| a.time <= window.end)
            .position(|a| window.intersects(a.time, a.tail_time))
            .map(|offset| start + offset)
    }

    /// Releases the visuals of rendered arcs that left the spawn window.
    pub fn clear_outside(&mut self, playback: &PlaybackState) {
        let window = self.motion.spawn_window(playback);
        let arcs = &self.arcs;
        let visuals = &mut self.visuals;
        let pool = &mut self.pool;

        self.rendered.retain(|&index| {
            let arc = &arcs[index];
            if window.intersects(arc.time, arc.tail_time) {
                return true;
            }
            if let Some(visual) = visuals[index].take() {
                pool.release(visual);
            }
            false
        });
    }

    pub fn clear_rendered(&mut self) {
        for index in self.rendered.drain(..) {
            if let Some(visual) = self.visuals[index].take() {
                self.pool.release(visual);
            }
        }
    }

    fn material(&self, color: i32, playback: &PlaybackState) -> ArcMaterial {
        ArcMaterial {
            color,
            fade_start_point: CLOSE_FADE_DISTANCE,
            fade_end_point: playback.jump_distance / 2.0 * FADE_DISTANCE_SCALE,
            fade_transition_length: self.style.fade_transition_length,
        }
    }

    fn alpha(&self, arc: &Arc, z: f32, playback: &PlaybackState) -> f32 {
        let mut alpha = self.options.brightness;
        if !self.options.fade_animation {
            return alpha;
        }

        if !arc.has_head_attachment {
            let beats = playback.beat - arc.beat;
            if self.style.headless_fade_beats > 0.0 {
                alpha *= (beats / self.style.headless_fade_beats).clamp(0.0, 1.0);
            } else if beats < 0.0 {
                alpha = 0.0;
            }
        } else {
            let full_alpha_distance = playback.jump_distance * HEAD_FADE_DISTANCE_SCALE;
            if full_alpha_distance > 0.0 {
                alpha *= 1.0 - (z / full_alpha_distance).clamp(0.0, 1.0);
            }
        }
        alpha
    }

    fn texture_offset(&self, arc: &Arc, playback: &PlaybackState) -> f32 {
        if !self.options.texture_animation {
            return STATIC_TEXTURE_OFFSET;
        }

        let time_difference = playback.time - arc.time;
        let start = arc.beat + arc.head_angle + arc.position.x + arc.position.y;
        let offset = (start + time_difference * self.style.animation_speed).rem_euclid(1.0);
        // Tiny negative remainders round up to 1.
        if offset >= 1.0 {
            0.0
        } else {
            offset
        }
    }

    fn spawn_points(&self, arc: &Arc, playback: &PlaybackState) -> Polyline {
        let head_offset_y = self
            .motion
            .object_y(playback, arc.head_start_y, arc.position.y, arc.time)
            - arc.position.y;
        let tail_offset_y = self
            .motion
            .object_y(playback, arc.tail_start_y, arc.tail_position.y, arc.tail_time)
            - arc.tail_position.y;

        spawn_animation_offset(
            &arc.base_curve,
            head_offset_y,
            tail_offset_y,
            playback.jump_distance,
        )
    }

    fn acquire_visual(&mut self, index: usize, playback: &PlaybackState) {
        let material = self.material(self.arcs[index].color, playback);
        let mut visual = self.pool.acquire(&material);

        let arc = &mut self.arcs[index];
        arc.calculate_base_curve(self.options.density, playback);

        visual.set_points(&arc.base_curve);
        visual.set_gradient(
            arc.curve_length,
            self.style.end_fade_start,
            self.style.end_fade_end,
        );
        visual.set_width(self.options.width / 2.0);

        self.visuals[index] = Some(visual);
        self.rendered.push(index);
    }

    fn update_visual(&mut self, index: usize, playback: &PlaybackState) {
        if self.visuals[index].is_none() {
            self.acquire_visual(index, playback);
        }

        let arc = &self.arcs[index];
        let z = self.motion.z_position(playback, arc.time);
        let alpha = self.alpha(arc, z, playback);
        let texture_offset = self.texture_offset(arc, playback);
        // Visuals are rebuilt on settings changes, so the base curve stays valid here.
        let points = self
            .options
            .move_animations
            .then(|| self.spawn_points(arc, playback));

        let Some(visual) = self.visuals[index].as_mut() else {
            return;
        };
        visual.set_properties(alpha, texture_offset);
        if let Some(points) = points {
            visual.set_points(&points);
        }
        visual.set_z(z);
    }
}

impl<P: ArcPool> Drop for ArcWindow<P> {
    fn drop(&mut self) {
        self.clear_rendered();
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use nalgebra::Vector3;

    use saberview_chart::Slider;

    use crate::scene::{placement::GridLayout, tempo::TempoMap};

    use super::*;

    #[derive(Debug, Default)]
    struct TestVisual {
        material: Option<ArcMaterial>,
        points: Vec<Vector3<f32>>,
        length: f32,
        width: f32,
        alpha: f32,
        texture_offset: f32,
        z: f32,
    }

    impl ArcVisual for TestVisual {
        fn set_points(&mut self, points: &[Vector3<f32>]) {
            self.points = points.to_vec();
        }

        fn set_gradient(&mut self, length: f32, _fade_start: f32, _fade_end: f32) {
            self.length = length;
        }

        fn set_width(&mut self, width: f32) {
            self.width = width;
        }

        fn set_properties(&mut self, alpha: f32, texture_offset: f32) {
            self.alpha = alpha;
            self.texture_offset = texture_offset;
        }

        fn set_z(&mut self, z: f32) {
            self.z = z;
        }
    }

    #[derive(Clone, Default)]
    struct TestPool {
        acquired: Rc<Cell<usize>>,
        released: Rc<Cell<usize>>,
    }

    impl TestPool {
        fn live(&self) -> usize {
            self.acquired.get() - self.released.get()
        }
    }

    impl ArcPool for TestPool {
        type Visual = TestVisual;

        fn acquire(&mut self, material: &ArcMaterial) -> TestVisual {
            self.acquired.set(self.acquired.get() + 1);
            TestVisual {
                material: Some(*material),
                ..Default::default()
            }
        }

        fn release(&mut self, _visual: TestVisual) {
            self.released.set(self.released.get() + 1);
        }
    }

    /// Straight arc in lane 1; at 60 BPM beats are seconds.
    fn arc(beat: f32, tail_beat: f32) -> Arc {
        let slider = Slider {
            beat,
            x: 1,
            y: 0,
            direction: 1,
            head_multiplier: 1.0,
            tail_beat,
            tail_x: 1,
            tail_y: 2,
            tail_direction: 0,
            tail_multiplier: 1.0,
            ..Default::default()
        };
        Arc::from_slider(&slider, &GridLayout::default(), &TempoMap::new(60.0, &[]))
    }

    /// Nothing behind the camera, so the window is `[time, time + reaction + 0.5]`.
    fn motion() -> ObjectMotion {
        ObjectMotion {
            move_z: 200.0,
            move_time: 0.5,
            behind_camera_z: 0.0,
        }
    }

    fn playback(time: f32, reaction_time: f32) -> PlaybackState {
        PlaybackState {
            beat: time,
            time,
            reaction_time,
            note_jump_speed: 10.0,
            jump_distance: 20.0 * reaction_time,
        }
    }

    fn window(arcs: Vec<Arc>) -> ArcWindow<TestPool> {
        let mut window = ArcWindow::new(
            TestPool::default(),
            motion(),
            ArcStyle::default(),
            &Settings::default(),
        );
        window.reload(arcs);
        window
    }

    fn rendered(window: &ArcWindow<TestPool>) -> Vec<usize> {
        let mut rendered = window.rendered().to_vec();
        rendered.sort();
        rendered
    }

    #[test]
    fn window_follows_the_playback_cursor() {
        let mut window = window(vec![arc(0.0, 2.0), arc(1.0, 3.0), arc(10.0, 12.0)]);

        // [0.5, 4]
        let first = playback(0.5, 3.0);
        assert_eq!(motion().spawn_window(&first), TimeWindow::new(0.5, 4.0));
        window.update(&first);
        assert_eq!(rendered(&window), vec![0, 1]);
        assert!(!window.is_rendered(2));

        // [11, 13]
        let second = playback(11.0, 1.5);
        assert_eq!(motion().spawn_window(&second), TimeWindow::new(11.0, 13.0));
        window.update(&second);
        assert_eq!(rendered(&window), vec![2]);
        assert!(!window.is_rendered(0) && !window.is_rendered(1));

        let pool = window.pool().clone();
        assert_eq!(pool.acquired.get(), 3);
        assert_eq!(pool.released.get(), 2);
        assert_eq!(pool.live(), 1);
    }

    #[test]
    fn repeated_updates_reuse_visuals() {
        let mut window = window(vec![arc(0.0, 2.0), arc(1.0, 3.0)]);
        for step in 0..10 {
            window.update(&playback(0.5 + step as f32 * 0.01, 3.0));
        }
        assert_eq!(window.pool().acquired.get(), 2);
        assert_eq!(window.pool().live(), 2);
    }

    #[test]
    fn arcs_are_sorted_on_reload() {
        let window = window(vec![arc(10.0, 12.0), arc(0.0, 2.0), arc(1.0, 3.0)]);
        let times = window.arcs().iter().map(|a| a.time).collect::<Vec<_>>();
        assert_eq!(times, vec![0.0, 1.0, 10.0]);
    }

    #[test]
    fn scan_continues_past_arcs_hidden_by_a_long_one() {
        // The short arc ends before the window, the arc after it is still in range.
        let mut window = window(vec![arc(0.0, 10.0), arc(1.0, 2.0), arc(2.0, 8.0)]);
        window.update(&playback(5.0, 0.5));
        assert_eq!(rendered(&window), vec![0, 2]);
    }

    #[test]
    fn arcs_far_before_the_window_are_skipped() {
        let mut arcs = (0..100)
            .map(|i| arc(i as f32 * 0.5, i as f32 * 0.5 + 0.25))
            .collect::<Vec<_>>();
        arcs.push(arc(60.0, 61.0));
        let mut window = window(arcs);

        window.update(&playback(60.5, 0.5));
        assert_eq!(rendered(&window), vec![100]);

        window.update(&playback(20.0, 0.5));
        // [20, 21]: arcs starting at 20, 20.5 and 21.
        assert_eq!(rendered(&window), vec![40, 41, 42]);
    }

    #[test]
    fn clear_rendered_balances_the_pool() {
        let mut window = window(vec![arc(0.0, 2.0), arc(1.0, 3.0), arc(2.0, 3.0)]);
        window.update(&playback(0.5, 3.0));
        assert_eq!(window.rendered().len(), 3);

        window.clear_rendered();
        assert!(window.rendered().is_empty());
        assert_eq!(window.pool().acquired.get(), window.pool().released.get());
    }

    #[test]
    fn dropping_the_window_releases_every_visual() {
        let pool = TestPool::default();
        {
            let mut window = ArcWindow::new(
                pool.clone(),
                motion(),
                ArcStyle::default(),
                &Settings::default(),
            );
            window.reload(vec![arc(0.0, 2.0), arc(1.0, 3.0)]);
            window.update(&playback(0.5, 3.0));
            assert_eq!(pool.live(), 2);
        }
        assert_eq!(pool.acquired.get(), 2);
        assert_eq!(pool.live(), 0);
    }

    #[test]
    fn settings_changes_rebuild_curves() {
        let mut window = window(vec![arc(0.0, 1.0)]);
        let playback = playback(0.0, 3.0);

        window.update(&playback);
        assert_eq!(window.visual(0).map(|v| v.points.len()), Some(61));

        let mut settings = Settings::default();
        settings.set_int(IntSetting::ArcDensity, 10);
        settings.set_float(FloatSetting::ArcWidth, 0.4);
        window.apply_settings(&settings);
        assert!(window.rendered().is_empty());
        assert_eq!(window.pool().live(), 0);

        window.update(&playback);
        let visual = window.visual(0).unwrap();
        assert_eq!(visual.points.len(), 11);
        assert_eq!(visual.width, 0.2);
    }

    #[test]
    fn visuals_receive_material_and_curve() {
        let mut window = window(vec![arc(1.0, 2.0)]);
        window.update(&playback(0.5, 1.0));

        let visual = window.visual(0).unwrap();
        let material = visual.material.unwrap();
        // Jump distance 20: fades out at 9.
        assert!((material.fade_end_point - 9.0).abs() < 1e-5);
        assert_eq!(material.color, 0);
        assert!(visual.length > 0.0);
        assert_eq!(visual.width, 0.05);
        // Half a second ahead at 10 units per second.
        assert!((visual.z - 5.0).abs() < 1e-5);
    }

    #[test]
    fn headless_arcs_fade_in_after_their_start() {
        let mut window = window(vec![arc(1.0, 3.0)]);

        window.update(&playback(0.5, 3.0));
        assert_eq!(window.visual(0).unwrap().alpha, 0.0);

        window.update(&playback(1.5, 3.0));
        assert!((window.visual(0).unwrap().alpha - 0.5).abs() < 1e-6);

        window.update(&playback(2.5, 3.0));
        assert_eq!(window.visual(0).unwrap().alpha, 1.0);
    }

    #[test]
    fn attached_arcs_fade_by_distance() {
        let mut window = window(vec![arc(1.0, 3.0)]);
        window.attach_head(0, -0.5);
        assert!(window.arcs()[0].has_head_attachment);

        // z 0 at the head: fully visible.
        window.update(&playback(1.0, 1.0));
        assert_eq!(window.visual(0).unwrap().alpha, 1.0);

        // z 5 of a fade distance of 17.
        window.update(&playback(0.5, 1.0));
        let alpha = window.visual(0).unwrap().alpha;
        assert!((alpha - (1.0 - 5.0 / 17.0)).abs() < 1e-5);
    }

    #[test]
    fn texture_offset_wraps_or_stays_static() {
        let mut window = window(vec![arc(1.0, 3.0)]);
        window.update(&playback(0.5, 3.0));
        let offset = window.visual(0).unwrap().texture_offset;
        assert!((0.0..1.0).contains(&offset));

        let mut settings = Settings::default();
        settings.set_bool(BoolSetting::ArcTextureAnimation, false);
        window.apply_settings(&settings);
        window.update(&playback(0.5, 3.0));
        assert_eq!(window.visual(0).unwrap().texture_offset, STATIC_TEXTURE_OFFSET);
    }

    #[test]
    fn spawning_heads_raise_the_curve() {
        let mut window = window(vec![arc(2.0, 3.0)]);
        window.attach_head(0, -1.0);

        // Head jump starts at 1s and settles at 1.5s.
        window.update(&playback(1.0, 1.0));
        let head = window.visual(0).unwrap().points[0];
        assert!((head.y - -1.0).abs() < 1e-5);

        window.update(&playback(1.5, 1.0));
        let head = window.visual(0).unwrap().points[0];
        assert!(head.y.abs() < 1e-5);

        let mut settings = Settings::default();
        settings.set_bool(BoolSetting::MoveAnimations, false);
        window.apply_settings(&settings);
        window.update(&playback(1.0, 1.0));
        let visual = window.visual(0).unwrap();
        assert_eq!(visual.points, window.arcs()[0].base_curve);
    }
}
