use std::{fmt, str::FromStr};

pub mod error;
pub mod parse;
mod util;

pub use error::LoadError;

/// Cut direction index of a directionless ("dot") note.
pub const DOT_DIRECTION: i32 = 8;

/// Free-form placement overriding the grid, `[x, y]` relative to the grid centre.
pub type CustomCoordinates = Option<[f32; 2]>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum DifficultyLevel {
    Easy,
    Normal,
    Hard,
    Expert,
    ExpertPlus,
}

impl DifficultyLevel {
    pub const ALL: [Self; 5] = [
        Self::Easy,
        Self::Normal,
        Self::Hard,
        Self::Expert,
        Self::ExpertPlus,
    ];

    pub fn rank(self) -> u8 {
        match self {
            Self::Easy => 1,
            Self::Normal => 3,
            Self::Hard => 5,
            Self::Expert => 7,
            Self::ExpertPlus => 9,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Normal => "Normal",
            Self::Hard => "Hard",
            Self::Expert => "Expert",
            Self::ExpertPlus => "ExpertPlus",
        }
    }
}

impl FromStr for DifficultyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown difficulty name {}", s))
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SongInfo {
    pub title: String,
    pub sub_title: String,
    pub author: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioInfo {
    pub song_filename: String,
    /// Duration in seconds.
    pub song_duration: f32,
    pub bpm: f32,
    pub preview_start_time: f32,
    pub preview_duration: f32,
}

/// Reference from the info document to a single difficulty file.
#[derive(Clone, Debug, PartialEq)]
pub struct DifficultyBeatmap {
    pub characteristic: String,
    pub difficulty: DifficultyLevel,
    pub mappers: Vec<String>,
    pub lighters: Vec<String>,
    pub note_jump_movement_speed: f32,
    pub note_jump_start_beat_offset: f32,
    pub beatmap_data_filename: String,
    pub lightshow_data_filename: String,
}

/// Canonical info document. Older schemas are converted into this shape.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BeatmapInfo {
    pub version: String,
    pub song: SongInfo,
    pub audio: AudioInfo,
    pub cover_image_filename: String,
    pub environment_names: Vec<String>,
    pub difficulty_beatmaps: Vec<DifficultyBeatmap>,
}

impl BeatmapInfo {
    pub fn difficulties_for<'a>(
        &'a self,
        characteristic: &'a str,
    ) -> impl Iterator<Item = &'a DifficultyBeatmap> + 'a {
        self.difficulty_beatmaps
            .iter()
            .filter(move |d| d.characteristic.eq_ignore_ascii_case(characteristic))
    }

    pub fn find_difficulty<'a>(
        &'a self,
        characteristic: &'a str,
        difficulty: DifficultyLevel,
    ) -> Option<&'a DifficultyBeatmap> {
        self.difficulties_for(characteristic)
            .find(|d| d.difficulty == difficulty)
    }

    /// Highest ranked difficulty of a characteristic.
    pub fn hardest<'a>(&'a self, characteristic: &'a str) -> Option<&'a DifficultyBeatmap> {
        self.difficulties_for(characteristic)
            .max_by_key(|d| d.difficulty.rank())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Note {
    pub beat: f32,
    pub x: i32,
    pub y: i32,
    pub color: i32,
    pub direction: i32,
    pub angle_offset: i32,
    pub coordinates: CustomCoordinates,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bomb {
    pub beat: f32,
    pub x: i32,
    pub y: i32,
    pub coordinates: CustomCoordinates,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Wall {
    pub beat: f32,
    pub x: i32,
    pub y: i32,
    /// Duration in beats.
    pub duration: f32,
    pub width: i32,
    pub height: i32,
    pub coordinates: CustomCoordinates,
}

/// Arc record as stored in difficulty files.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Slider {
    pub color: i32,

    pub beat: f32,
    pub x: i32,
    pub y: i32,
    pub direction: i32,
    /// Head control point length multiplier.
    pub head_multiplier: f32,

    pub tail_beat: f32,
    pub tail_x: i32,
    pub tail_y: i32,
    pub tail_direction: i32,
    /// Tail control point length multiplier.
    pub tail_multiplier: f32,

    /// 0 = straight, 1 = clockwise, 2 = counter-clockwise.
    pub mid_anchor_mode: i32,

    pub coordinates: CustomCoordinates,
    pub tail_coordinates: CustomCoordinates,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chain {
    pub color: i32,

    pub beat: f32,
    pub x: i32,
    pub y: i32,
    pub direction: i32,

    pub tail_beat: f32,
    pub tail_x: i32,
    pub tail_y: i32,

    pub slice_count: i32,
    pub squish: f32,

    pub coordinates: CustomCoordinates,
    pub tail_coordinates: CustomCoordinates,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BpmChange {
    pub beat: f32,
    pub bpm: f32,
}

/// Canonical difficulty document; all vecs are in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BeatmapDifficulty {
    pub notes: Vec<Note>,
    pub bombs: Vec<Bomb>,
    pub walls: Vec<Wall>,
    pub arcs: Vec<Slider>,
    pub chains: Vec<Chain>,
    pub bpm_changes: Vec<BpmChange>,
}

impl BeatmapDifficulty {
    pub fn object_count(&self) -> usize {
        self.notes.len() + self.bombs.len() + self.walls.len() + self.arcs.len() + self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_count() == 0
    }
}

/// A difficulty as handed to the previewer, together with the reference metadata.
#[derive(Clone, Debug)]
pub struct LoadedDifficulty {
    pub characteristic: String,
    pub level: DifficultyLevel,
    pub note_jump_speed: f32,
    pub spawn_offset: f32,
    pub mappers: Vec<String>,
    pub lighters: Vec<String>,
    pub beatmap: BeatmapDifficulty,
    /// Set when `beatmap` is a default produced by a failed load.
    pub issue: Option<LoadError>,
}

impl LoadedDifficulty {
    pub fn from_reference(reference: &DifficultyBeatmap, beatmap: BeatmapDifficulty) -> Self {
        Self {
            characteristic: reference.characteristic.clone(),
            level: reference.difficulty,
            note_jump_speed: reference.note_jump_movement_speed,
            spawn_offset: reference.note_jump_start_beat_offset,
            mappers: reference.mappers.clone(),
            lighters: reference.lighters.clone(),
            beatmap,
            issue: None,
        }
    }

    pub(crate) fn issue(mut self, issue: LoadError) -> Self {
        self.issue = Some(issue);
        self
    }
}
