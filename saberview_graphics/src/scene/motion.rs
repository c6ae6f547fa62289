use crate::geometry::{easing, lerp};

use super::tempo::{valid_bpm, TempoMap, FALLBACK_BPM};

/// Half jump distances above this are halved until they fit.
const MAX_HALF_JUMP_DISTANCE: f32 = 17.999;
const DEFAULT_HALF_JUMP_BEATS: f32 = 4.0;
const MIN_HALF_JUMP_BEATS: f32 = 0.25;

/// Reaction time and jump distance of a difficulty at a given tempo.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JumpParameters {
    pub note_jump_speed: f32,
    /// Half jump duration in beats.
    pub half_jump_beats: f32,
    /// Seconds an object is visible before reaching the player.
    pub reaction_time: f32,
    pub jump_distance: f32,
}

impl JumpParameters {
    pub fn new(bpm: f32, note_jump_speed: f32, spawn_offset: f32) -> Self {
        let bpm = if valid_bpm(bpm) {
            bpm
        } else {
            log::warn!("Jump parameters for invalid BPM {}, using {}", bpm, FALLBACK_BPM);
            FALLBACK_BPM
        };
        let beat_seconds = 60.0 / bpm;

        let mut half_jump_beats = DEFAULT_HALF_JUMP_BEATS;
        while note_jump_speed * beat_seconds * half_jump_beats > MAX_HALF_JUMP_DISTANCE {
            half_jump_beats /= 2.0;
        }
        half_jump_beats = (half_jump_beats + spawn_offset).max(MIN_HALF_JUMP_BEATS);

        let reaction_time = beat_seconds * half_jump_beats;
        Self {
            note_jump_speed,
            half_jump_beats,
            reaction_time,
            jump_distance: note_jump_speed * reaction_time * 2.0,
        }
    }
}

/// Read-only playback cursor handed to every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackState {
    pub beat: f32,
    pub time: f32,
    pub reaction_time: f32,
    pub note_jump_speed: f32,
    pub jump_distance: f32,
}

impl PlaybackState {
    pub fn at_time(time: f32, tempo: &TempoMap, jump: &JumpParameters) -> Self {
        Self {
            beat: tempo.beat_from_time(time),
            time,
            reaction_time: jump.reaction_time,
            note_jump_speed: jump.note_jump_speed,
            jump_distance: jump.jump_distance,
        }
    }

    /// Distance an object travels in `time` seconds.
    pub fn world_space_from_time(&self, time: f32) -> f32 {
        if self.reaction_time <= 0.0 {
            return 0.0;
        }
        time * self.note_jump_speed / self.reaction_time
    }

    pub fn time_from_world_space(&self, position: f32) -> f32 {
        if self.note_jump_speed == 0.0 {
            return 0.0;
        }
        position / self.note_jump_speed * self.reaction_time
    }
}

/// Closed interval of song time, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    pub start: f32,
    pub end: f32,
}

impl TimeWindow {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, time: f32) -> bool {
        self.start <= time && time <= self.end
    }

    pub fn intersects(&self, start: f32, end: f32) -> bool {
        start <= self.end && end >= self.start
    }
}

/// Spawn movement tunables shared by every object type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectMotion {
    /// Extra distance objects fly in from before their jump.
    pub move_z: f32,
    /// Seconds spent flying in.
    pub move_time: f32,
    /// Objects stay visible until this far behind the camera.
    pub behind_camera_z: f32,
}

impl Default for ObjectMotion {
    fn default() -> Self {
        Self {
            move_z: 200.0,
            move_time: 0.25,
            behind_camera_z: -5.0,
        }
    }
}

impl ObjectMotion {
    pub fn behind_camera_time(&self, playback: &PlaybackState) -> f32 {
        playback.time_from_world_space(self.behind_camera_z)
    }

    /// Song time range in which objects are on screen.
    pub fn spawn_window(&self, playback: &PlaybackState) -> TimeWindow {
        TimeWindow::new(
            playback.time + self.behind_camera_time(playback),
            playback.time + playback.reaction_time + self.move_time,
        )
    }

    pub fn duration_in_spawn_range(
        &self,
        playback: &PlaybackState,
        start_time: f32,
        end_time: f32,
    ) -> bool {
        self.spawn_window(playback).intersects(start_time, end_time)
    }

    pub fn z_position(&self, playback: &PlaybackState, object_time: f32) -> f32 {
        let jump_time = playback.time + playback.reaction_time;

        if object_time <= jump_time {
            // Jumped in, moves at note jump speed.
            playback.world_space_from_time(object_time - playback.time)
        } else {
            let progress = if self.move_time > 0.0 {
                (object_time - jump_time) / self.move_time
            } else {
                1.0
            };
            playback.jump_distance + self.move_z * easing::sine_out(progress)
        }
    }

    /// Height of an object that spawns at `start_y` and settles at `target_y`
    /// once it is half way through its jump.
    pub fn object_y(
        &self,
        playback: &PlaybackState,
        start_y: f32,
        target_y: f32,
        object_time: f32,
    ) -> f32 {
        let half_jump_time = playback.reaction_time / 2.0;
        if half_jump_time <= 0.0 {
            return target_y;
        }

        let jump_start = object_time - playback.reaction_time;
        let progress = ((playback.time - jump_start) / half_jump_time).clamp(0.0, 1.0);
        lerp(start_y, target_y, easing::quad_out(progress))
    }
}
