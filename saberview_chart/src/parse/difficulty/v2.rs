use serde::Deserialize;

use crate::{
    util::{lenient, lenient_coordinates, lenient_int, lenient_seq},
    CustomCoordinates,
};

use super::v3::{
    BombNoteV3, BpmEventV3, ColorNoteV3, CustomDataV3, DifficultyV3, ObstacleV3, SliderV3,
};

/// Event type carrying a BPM change in `_floatValue`.
const BPM_CHANGE_EVENT_TYPE: i32 = 100;

const NOTE_TYPE_RED: i32 = 0;
const NOTE_TYPE_BLUE: i32 = 1;
const NOTE_TYPE_BOMB: i32 = 3;

const OBSTACLE_TYPE_FULL_HEIGHT: i32 = 0;
const OBSTACLE_TYPE_CROUCH: i32 = 1;
const OBSTACLE_TYPE_FREE: i32 = 2;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CustomDataV2 {
    #[serde(rename = "_position", deserialize_with = "lenient_coordinates")]
    pub position: CustomCoordinates,
    #[serde(rename = "_tailPosition", deserialize_with = "lenient_coordinates")]
    pub tail_position: CustomCoordinates,
}

impl From<CustomDataV2> for CustomDataV3 {
    fn from(c: CustomDataV2) -> Self {
        Self {
            coordinates: c.position,
            tail_coordinates: c.tail_position,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NoteV2 {
    #[serde(rename = "_time", deserialize_with = "lenient")]
    pub time: f32,
    #[serde(rename = "_lineIndex", deserialize_with = "lenient_int")]
    pub line_index: i32,
    #[serde(rename = "_lineLayer", deserialize_with = "lenient_int")]
    pub line_layer: i32,
    #[serde(rename = "_type", deserialize_with = "lenient_int")]
    pub note_type: i32,
    #[serde(rename = "_cutDirection", deserialize_with = "lenient_int")]
    pub cut_direction: i32,
    #[serde(rename = "_customData", deserialize_with = "lenient")]
    pub custom_data: CustomDataV2,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ObstacleV2 {
    #[serde(rename = "_time", deserialize_with = "lenient")]
    pub time: f32,
    #[serde(rename = "_lineIndex", deserialize_with = "lenient_int")]
    pub line_index: i32,
    #[serde(rename = "_lineLayer", deserialize_with = "lenient_int")]
    pub line_layer: i32,
    #[serde(rename = "_type", deserialize_with = "lenient_int")]
    pub obstacle_type: i32,
    #[serde(rename = "_duration", deserialize_with = "lenient")]
    pub duration: f32,
    #[serde(rename = "_width", deserialize_with = "lenient_int")]
    pub width: i32,
    #[serde(rename = "_height", deserialize_with = "lenient_int")]
    pub height: i32,
    #[serde(rename = "_customData", deserialize_with = "lenient")]
    pub custom_data: CustomDataV2,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SliderV2 {
    #[serde(rename = "_colorType", deserialize_with = "lenient_int")]
    pub color_type: i32,
    #[serde(rename = "_headTime", deserialize_with = "lenient")]
    pub head_time: f32,
    #[serde(rename = "_headLineIndex", deserialize_with = "lenient_int")]
    pub head_line_index: i32,
    #[serde(rename = "_headLineLayer", deserialize_with = "lenient_int")]
    pub head_line_layer: i32,
    #[serde(rename = "_headCutDirection", deserialize_with = "lenient_int")]
    pub head_cut_direction: i32,
    #[serde(rename = "_headControlPointLengthMultiplier", deserialize_with = "lenient")]
    pub head_multiplier: f32,
    #[serde(rename = "_tailTime", deserialize_with = "lenient")]
    pub tail_time: f32,
    #[serde(rename = "_tailLineIndex", deserialize_with = "lenient_int")]
    pub tail_line_index: i32,
    #[serde(rename = "_tailLineLayer", deserialize_with = "lenient_int")]
    pub tail_line_layer: i32,
    #[serde(rename = "_tailCutDirection", deserialize_with = "lenient_int")]
    pub tail_cut_direction: i32,
    #[serde(rename = "_tailControlPointLengthMultiplier", deserialize_with = "lenient")]
    pub tail_multiplier: f32,
    #[serde(rename = "_sliderMidAnchorMode", deserialize_with = "lenient_int")]
    pub mid_anchor_mode: i32,
    #[serde(rename = "_customData", deserialize_with = "lenient")]
    pub custom_data: CustomDataV2,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventV2 {
    #[serde(rename = "_time", deserialize_with = "lenient")]
    pub time: f32,
    #[serde(rename = "_type", deserialize_with = "lenient_int")]
    pub event_type: i32,
    #[serde(rename = "_floatValue", deserialize_with = "lenient")]
    pub float_value: f32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DifficultyV2 {
    #[serde(rename = "_version", deserialize_with = "lenient")]
    pub version: String,
    #[serde(rename = "_notes", deserialize_with = "lenient_seq")]
    pub notes: Vec<NoteV2>,
    #[serde(rename = "_obstacles", deserialize_with = "lenient_seq")]
    pub obstacles: Vec<ObstacleV2>,
    #[serde(rename = "_sliders", deserialize_with = "lenient_seq")]
    pub sliders: Vec<SliderV2>,
    #[serde(rename = "_events", deserialize_with = "lenient_seq")]
    pub events: Vec<EventV2>,
}

impl DifficultyV2 {
    pub fn has_objects(&self) -> bool {
        !self.notes.is_empty() || !self.obstacles.is_empty() || !self.sliders.is_empty()
    }

    /// Converts into the v3 layout, splitting notes into color notes and bombs.
    pub fn into_v3(self) -> DifficultyV3 {
        let mut color_notes = Vec::new();
        let mut bomb_notes = Vec::new();

        for note in self.notes {
            match note.note_type {
                NOTE_TYPE_RED | NOTE_TYPE_BLUE => color_notes.push(ColorNoteV3 {
                    b: note.time,
                    x: note.line_index,
                    y: note.line_layer,
                    c: note.note_type,
                    d: note.cut_direction,
                    a: 0,
                    custom_data: note.custom_data.into(),
                }),
                NOTE_TYPE_BOMB => bomb_notes.push(BombNoteV3 {
                    b: note.time,
                    x: note.line_index,
                    y: note.line_layer,
                    custom_data: note.custom_data.into(),
                }),
                other => log::warn!(
                    "Dropping note at beat {} with unknown type {}",
                    note.time,
                    other
                ),
            }
        }

        let obstacles = self
            .obstacles
            .into_iter()
            .map(|o| {
                let (y, h) = match o.obstacle_type {
                    OBSTACLE_TYPE_FULL_HEIGHT => (0, 5),
                    OBSTACLE_TYPE_CROUCH => (2, 3),
                    OBSTACLE_TYPE_FREE => (o.line_layer, o.height),
                    other => {
                        log::warn!(
                            "Obstacle at beat {} has unknown type {}, treating as full height",
                            o.time,
                            other
                        );
                        (0, 5)
                    }
                };
                ObstacleV3 {
                    b: o.time,
                    x: o.line_index,
                    y,
                    d: o.duration,
                    w: o.width,
                    h,
                    custom_data: o.custom_data.into(),
                }
            })
            .collect();

        let sliders = self
            .sliders
            .into_iter()
            .map(|s| SliderV3 {
                c: s.color_type,
                b: s.head_time,
                x: s.head_line_index,
                y: s.head_line_layer,
                d: s.head_cut_direction,
                mu: s.head_multiplier,
                tb: s.tail_time,
                tx: s.tail_line_index,
                ty: s.tail_line_layer,
                tc: s.tail_cut_direction,
                tmu: s.tail_multiplier,
                m: s.mid_anchor_mode,
                custom_data: s.custom_data.into(),
            })
            .collect();

        let bpm_events = self
            .events
            .into_iter()
            .filter(|e| e.event_type == BPM_CHANGE_EVENT_TYPE)
            .map(|e| BpmEventV3 {
                b: e.time,
                m: e.float_value,
            })
            .collect();

        DifficultyV3 {
            version: self.version,
            bpm_events,
            color_notes,
            bomb_notes,
            obstacles,
            sliders,
            burst_sliders: Vec::new(),
        }
    }
}
