//! v4 splits every object into a timed reference and a shared, deduplicated
//! data entry. Conversion joins them back together.

use serde::Deserialize;

use crate::{
    util::{lenient, lenient_coordinates, lenient_int, lenient_seq},
    BeatmapDifficulty, Bomb, Chain, CustomCoordinates, Note, Slider, Wall,
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomDataV4 {
    #[serde(deserialize_with = "lenient_coordinates")]
    pub coordinates: CustomCoordinates,
}

/// Timed reference into one of the data arrays.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ObjectV4 {
    #[serde(deserialize_with = "lenient")]
    pub b: f32,
    /// Rotation lane; unused by the previewer.
    #[serde(deserialize_with = "lenient_int")]
    pub r: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub i: i32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorNoteDataV4 {
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
    pub custom_data: CustomDataV4,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BombNoteDataV4 {
    #[serde(deserialize_with = "lenient_int")]
    pub x: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub y: i32,
    #[serde(deserialize_with = "lenient")]
    pub custom_data: CustomDataV4,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObstacleDataV4 {
    #[serde(deserialize_with = "lenient")]
    pub d: f32,
    #[serde(deserialize_with = "lenient_int")]
    pub x: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub y: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub w: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub h: i32,
    #[serde(deserialize_with = "lenient")]
    pub custom_data: CustomDataV4,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArcV4 {
    #[serde(deserialize_with = "lenient")]
    pub hb: f32,
    #[serde(deserialize_with = "lenient")]
    pub tb: f32,
    #[serde(deserialize_with = "lenient_int")]
    pub hr: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub tr: i32,
    /// Head note data index.
    #[serde(deserialize_with = "lenient_int")]
    pub hi: i32,
    /// Tail note data index.
    #[serde(deserialize_with = "lenient_int")]
    pub ti: i32,
    /// Arc data index.
    #[serde(deserialize_with = "lenient_int")]
    pub ai: i32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArcDataV4 {
    #[serde(deserialize_with = "lenient")]
    pub m: f32,
    #[serde(deserialize_with = "lenient")]
    pub tm: f32,
    #[serde(deserialize_with = "lenient_int")]
    pub a: i32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChainV4 {
    #[serde(deserialize_with = "lenient")]
    pub hb: f32,
    #[serde(deserialize_with = "lenient")]
    pub tb: f32,
    #[serde(deserialize_with = "lenient_int")]
    pub hr: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub tr: i32,
    /// Head note data index.
    #[serde(deserialize_with = "lenient_int")]
    pub i: i32,
    /// Chain data index.
    #[serde(deserialize_with = "lenient_int")]
    pub ci: i32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChainDataV4 {
    #[serde(deserialize_with = "lenient_int")]
    pub tx: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub ty: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub c: i32,
    #[serde(deserialize_with = "lenient")]
    pub s: f32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DifficultyV4 {
    #[serde(deserialize_with = "lenient")]
    pub version: String,
    #[serde(deserialize_with = "lenient_seq")]
    pub color_notes: Vec<ObjectV4>,
    #[serde(deserialize_with = "lenient_seq")]
    pub color_notes_data: Vec<ColorNoteDataV4>,
    #[serde(deserialize_with = "lenient_seq")]
    pub bomb_notes: Vec<ObjectV4>,
    #[serde(deserialize_with = "lenient_seq")]
    pub bomb_notes_data: Vec<BombNoteDataV4>,
    #[serde(deserialize_with = "lenient_seq")]
    pub obstacles: Vec<ObjectV4>,
    #[serde(deserialize_with = "lenient_seq")]
    pub obstacles_data: Vec<ObstacleDataV4>,
    #[serde(deserialize_with = "lenient_seq")]
    pub arcs: Vec<ArcV4>,
    #[serde(deserialize_with = "lenient_seq")]
    pub arcs_data: Vec<ArcDataV4>,
    #[serde(deserialize_with = "lenient_seq")]
    pub chains: Vec<ChainV4>,
    #[serde(deserialize_with = "lenient_seq")]
    pub chains_data: Vec<ChainDataV4>,
}

impl DifficultyV4 {
    /// Requires a reference array together with its data array. v3 files share
    /// the `colorNotes`, `bombNotes` and `obstacles` names but carry no data
    /// arrays, so they are never mistaken for v4.
    pub fn has_objects(&self) -> bool {
        let paired = |refs: usize, data: usize| refs > 0 && data > 0;
        paired(self.color_notes.len(), self.color_notes_data.len())
            || paired(self.bomb_notes.len(), self.bomb_notes_data.len())
            || paired(self.obstacles.len(), self.obstacles_data.len())
            || paired(self.arcs.len(), self.arcs_data.len())
            || paired(self.chains.len(), self.chains_data.len())
    }
}

fn lookup<'a, T>(data: &'a [T], index: i32, kind: &str, beat: f32) -> Option<&'a T> {
    let entry = usize::try_from(index).ok().and_then(|i| data.get(i));
    if entry.is_none() {
        log::warn!(
            "Dropping {} at beat {}: data index {} out of range ({} entries)",
            kind,
            beat,
            index,
            data.len()
        );
    }
    entry
}

impl From<DifficultyV4> for BeatmapDifficulty {
    fn from(difficulty: DifficultyV4) -> Self {
        let notes_data = &difficulty.color_notes_data;

        let notes = difficulty
            .color_notes
            .iter()
            .filter_map(|n| {
                let data = lookup(notes_data, n.i, "note", n.b)?;
                Some(Note {
                    beat: n.b,
                    x: data.x,
                    y: data.y,
                    color: data.c,
                    direction: data.d,
                    angle_offset: data.a,
                    coordinates: data.custom_data.coordinates,
                })
            })
            .collect();

        let bombs = difficulty
            .bomb_notes
            .iter()
            .filter_map(|b| {
                let data = lookup(&difficulty.bomb_notes_data, b.i, "bomb", b.b)?;
                Some(Bomb {
                    beat: b.b,
                    x: data.x,
                    y: data.y,
                    coordinates: data.custom_data.coordinates,
                })
            })
            .collect();

        let walls = difficulty
            .obstacles
            .iter()
            .filter_map(|o| {
                let data = lookup(&difficulty.obstacles_data, o.i, "wall", o.b)?;
                Some(Wall {
                    beat: o.b,
                    x: data.x,
                    y: data.y,
                    duration: data.d,
                    width: data.w,
                    height: data.h,
                    coordinates: data.custom_data.coordinates,
                })
            })
            .collect();

        let arcs = difficulty
            .arcs
            .iter()
            .filter_map(|a| {
                let head = lookup(notes_data, a.hi, "arc head", a.hb)?;
                let tail = lookup(notes_data, a.ti, "arc tail", a.hb)?;
                let data = lookup(&difficulty.arcs_data, a.ai, "arc", a.hb)?;
                Some(Slider {
                    color: head.c,
                    beat: a.hb,
                    x: head.x,
                    y: head.y,
                    direction: head.d,
                    head_multiplier: data.m,
                    tail_beat: a.tb,
                    tail_x: tail.x,
                    tail_y: tail.y,
                    tail_direction: tail.d,
                    tail_multiplier: data.tm,
                    mid_anchor_mode: data.a,
                    coordinates: head.custom_data.coordinates,
                    tail_coordinates: tail.custom_data.coordinates,
                })
            })
            .collect();

        let chains = difficulty
            .chains
            .iter()
            .filter_map(|c| {
                let head = lookup(notes_data, c.i, "chain head", c.hb)?;
                let data = lookup(&difficulty.chains_data, c.ci, "chain", c.hb)?;
                Some(Chain {
                    color: head.c,
                    beat: c.hb,
                    x: head.x,
                    y: head.y,
                    direction: head.d,
                    tail_beat: c.tb,
                    tail_x: data.tx,
                    tail_y: data.ty,
                    slice_count: data.c,
                    squish: data.s,
                    coordinates: head.custom_data.coordinates,
                    tail_coordinates: None,
                })
            })
            .collect();

        Self {
            notes,
            bombs,
            walls,
            arcs,
            chains,
            // v4 keeps tempo in the audio data file.
            bpm_changes: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIFFICULTY_V4: &str = r#"{
        "version": "4.0.0",
        "colorNotes": [{"b": 1, "r": 0, "i": 0}, {"b": 2, "r": 0, "i": 1}, {"b": 3, "i": 0}],
        "colorNotesData": [
            {"x": 1, "y": 0, "c": 0, "d": 1, "a": 0},
            {"x": 2, "y": 2, "c": 1, "d": 0, "a": 10}
        ],
        "bombNotes": [{"b": 4, "i": 0}],
        "bombNotesData": [{"x": 3, "y": 1}],
        "obstacles": [{"b": 5, "i": 0}, {"b": 6, "i": 4}],
        "obstaclesData": [{"d": 1.5, "x": 0, "y": 0, "w": 2, "h": 5}],
        "arcs": [{"hb": 1, "tb": 2, "hi": 0, "ti": 1, "ai": 0}],
        "arcsData": [{"m": 1, "tm": 0.75, "a": 2}],
        "chains": [{"hb": 2, "tb": 2.5, "i": 1, "ci": 0}],
        "chainsData": [{"tx": 2, "ty": 0, "c": 5, "s": 1}]
    }"#;

    #[test]
    fn v4_joins_references_with_data() {
        let raw: DifficultyV4 = serde_json::from_str(DIFFICULTY_V4).unwrap();
        assert!(raw.has_objects());

        let difficulty = BeatmapDifficulty::from(raw);
        assert_eq!(difficulty.notes.len(), 3);
        assert_eq!(difficulty.notes[1].angle_offset, 10);
        assert_eq!(difficulty.notes[2].x, 1);
        assert_eq!(difficulty.bombs[0].x, 3);

        let arc = &difficulty.arcs[0];
        assert_eq!((arc.x, arc.y, arc.direction), (1, 0, 1));
        assert_eq!((arc.tail_x, arc.tail_y, arc.tail_direction), (2, 2, 0));
        assert_eq!(arc.tail_multiplier, 0.75);
        assert_eq!(arc.mid_anchor_mode, 2);

        let chain = &difficulty.chains[0];
        assert_eq!(chain.color, 1);
        assert_eq!(chain.slice_count, 5);
    }

    #[test]
    fn dangling_indices_drop_the_object() {
        let raw: DifficultyV4 = serde_json::from_str(DIFFICULTY_V4).unwrap();
        let difficulty = BeatmapDifficulty::from(raw);
        assert_eq!(difficulty.walls.len(), 1);
        assert_eq!(difficulty.walls[0].duration, 1.5);
    }

    #[test]
    fn v3_layout_is_not_v4() {
        let raw: DifficultyV4 = serde_json::from_str(
            r#"{"colorNotes": [{"b": 1, "x": 1, "y": 0, "c": 0, "d": 1}], "obstacles": [{"b": 2, "d": 1, "w": 1, "h": 5}]}"#,
        )
        .unwrap();
        assert!(!raw.has_objects());
    }
}
