use serde::Deserialize;

use crate::{
    util::{lenient, lenient_coordinates, lenient_int, lenient_seq},
    BeatmapDifficulty, Bomb, BpmChange, Chain, CustomCoordinates, Note, Slider, Wall,
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomDataV3 {
    #[serde(deserialize_with = "lenient_coordinates")]
    pub coordinates: CustomCoordinates,
    #[serde(deserialize_with = "lenient_coordinates")]
    pub tail_coordinates: CustomCoordinates,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct BpmEventV3 {
    #[serde(deserialize_with = "lenient")]
    pub b: f32,
    #[serde(deserialize_with = "lenient")]
    pub m: f32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorNoteV3 {
    #[serde(deserialize_with = "lenient")]
    pub b: f32,
    #[serde(deserialize_with = "lenient_int")]
    pub x: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub y: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub c: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub d: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub a: i32,
    #[serde(deserialize_with = "lenient")]
    pub custom_data: CustomDataV3,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BombNoteV3 {
    #[serde(deserialize_with = "lenient")]
    pub b: f32,
    #[serde(deserialize_with = "lenient_int")]
    pub x: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub y: i32,
    #[serde(deserialize_with = "lenient")]
    pub custom_data: CustomDataV3,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObstacleV3 {
    #[serde(deserialize_with = "lenient")]
    pub b: f32,
    #[serde(deserialize_with = "lenient_int")]
    pub x: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub y: i32,
    #[serde(deserialize_with = "lenient")]
    pub d: f32,
    #[serde(deserialize_with = "lenient_int")]
    pub w: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub h: i32,
    #[serde(deserialize_with = "lenient")]
    pub custom_data: CustomDataV3,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SliderV3 {
    #[serde(deserialize_with = "lenient_int")]
    pub c: i32,
    #[serde(deserialize_with = "lenient")]
    pub b: f32,
    #[serde(deserialize_with = "lenient_int")]
    pub x: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub y: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub d: i32,
    #[serde(deserialize_with = "lenient")]
    pub mu: f32,
    #[serde(deserialize_with = "lenient")]
    pub tb: f32,
    #[serde(deserialize_with = "lenient_int")]
    pub tx: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub ty: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub tc: i32,
    #[serde(deserialize_with = "lenient")]
    pub tmu: f32,
    #[serde(deserialize_with = "lenient_int")]
    pub m: i32,
    #[serde(deserialize_with = "lenient")]
    pub custom_data: CustomDataV3,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BurstSliderV3 {
    #[serde(deserialize_with = "lenient_int")]
    pub c: i32,
    #[serde(deserialize_with = "lenient")]
    pub b: f32,
    #[serde(deserialize_with = "lenient_int")]
    pub x: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub y: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub d: i32,
    #[serde(deserialize_with = "lenient")]
    pub tb: f32,
    #[serde(deserialize_with = "lenient_int")]
    pub tx: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub ty: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub sc: i32,
    #[serde(deserialize_with = "lenient")]
    pub s: f32,
    #[serde(deserialize_with = "lenient")]
    pub custom_data: CustomDataV3,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DifficultyV3 {
    #[serde(deserialize_with = "lenient")]
    pub version: String,
    #[serde(deserialize_with = "lenient_seq")]
    pub bpm_events: Vec<BpmEventV3>,
    #[serde(deserialize_with = "lenient_seq")]
    pub color_notes: Vec<ColorNoteV3>,
    #[serde(deserialize_with = "lenient_seq")]
    pub bomb_notes: Vec<BombNoteV3>,
    #[serde(deserialize_with = "lenient_seq")]
    pub obstacles: Vec<ObstacleV3>,
    #[serde(deserialize_with = "lenient_seq")]
    pub sliders: Vec<SliderV3>,
    #[serde(deserialize_with = "lenient_seq")]
    pub burst_sliders: Vec<BurstSliderV3>,
}

impl DifficultyV3 {
    pub fn has_objects(&self) -> bool {
        !self.color_notes.is_empty()
            || !self.bomb_notes.is_empty()
            || !self.obstacles.is_empty()
            || !self.sliders.is_empty()
            || !self.burst_sliders.is_empty()
    }
}

impl From<ColorNoteV3> for Note {
    fn from(n: ColorNoteV3) -> Self {
        Self {
            beat: n.b,
            x: n.x,
            y: n.y,
            color: n.c,
            direction: n.d,
            angle_offset: n.a,
            coordinates: n.custom_data.coordinates,
        }
    }
}

impl From<BombNoteV3> for Bomb {
    fn from(b: BombNoteV3) -> Self {
        Self {
            beat: b.b,
            x: b.x,
            y: b.y,
            coordinates: b.custom_data.coordinates,
        }
    }
}

impl From<ObstacleV3> for Wall {
    fn from(o: ObstacleV3) -> Self {
        Self {
            beat: o.b,
            x: o.x,
            y: o.y,
            duration: o.d,
            width: o.w,
            height: o.h,
            coordinates: o.custom_data.coordinates,
        }
    }
}

impl From<SliderV3> for Slider {
    fn from(s: SliderV3) -> Self {
        Self {
            color: s.c,
            beat: s.b,
            x: s.x,
            y: s.y,
            direction: s.d,
            head_multiplier: s.mu,
            tail_beat: s.tb,
            tail_x: s.tx,
            tail_y: s.ty,
            tail_direction: s.tc,
            tail_multiplier: s.tmu,
            mid_anchor_mode: s.m,
            coordinates: s.custom_data.coordinates,
            tail_coordinates: s.custom_data.tail_coordinates,
        }
    }
}

impl From<BurstSliderV3> for Chain {
    fn from(s: BurstSliderV3) -> Self {
        Self {
            color: s.c,
            beat: s.b,
            x: s.x,
            y: s.y,
            direction: s.d,
            tail_beat: s.tb,
            tail_x: s.tx,
            tail_y: s.ty,
            slice_count: s.sc,
            squish: s.s,
            coordinates: s.custom_data.coordinates,
            tail_coordinates: s.custom_data.tail_coordinates,
        }
    }
}

impl From<DifficultyV3> for BeatmapDifficulty {
    fn from(difficulty: DifficultyV3) -> Self {
        Self {
            notes: difficulty.color_notes.into_iter().map(Note::from).collect(),
            bombs: difficulty.bomb_notes.into_iter().map(Bomb::from).collect(),
            walls: difficulty.obstacles.into_iter().map(Wall::from).collect(),
            arcs: difficulty.sliders.into_iter().map(Slider::from).collect(),
            chains: difficulty.burst_sliders.into_iter().map(Chain::from).collect(),
            bpm_changes: difficulty
                .bpm_events
                .into_iter()
                .map(|e| BpmChange { beat: e.b, bpm: e.m })
                .collect(),
        }
    }
}
