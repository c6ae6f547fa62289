//! Raw `Info.dat` schemas and their conversion into [`BeatmapInfo`].

use serde::Deserialize;

use crate::{
    util::{lenient, lenient_int, lenient_seq},
    AudioInfo, BeatmapInfo, DifficultyBeatmap, DifficultyLevel, SongInfo,
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InfoV4 {
    #[serde(deserialize_with = "lenient")]
    pub version: String,
    #[serde(deserialize_with = "lenient")]
    pub song: Option<SongV4>,
    #[serde(deserialize_with = "lenient")]
    pub audio: AudioV4,
    #[serde(deserialize_with = "lenient")]
    pub cover_image_filename: String,
    #[serde(deserialize_with = "lenient_seq")]
    pub environment_names: Vec<String>,
    #[serde(deserialize_with = "lenient_seq")]
    pub difficulty_beatmaps: Vec<DifficultyBeatmapV4>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SongV4 {
    #[serde(deserialize_with = "lenient")]
    pub title: String,
    #[serde(deserialize_with = "lenient")]
    pub sub_title: String,
    #[serde(deserialize_with = "lenient")]
    pub author: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioV4 {
    #[serde(deserialize_with = "lenient")]
    pub song_filename: String,
    #[serde(deserialize_with = "lenient")]
    pub song_duration: f32,
    #[serde(deserialize_with = "lenient")]
    pub bpm: f32,
    #[serde(deserialize_with = "lenient")]
    pub preview_start_time: f32,
    #[serde(deserialize_with = "lenient")]
    pub preview_duration: f32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BeatmapAuthorsV4 {
    #[serde(deserialize_with = "lenient_seq")]
    pub mappers: Vec<String>,
    #[serde(deserialize_with = "lenient_seq")]
    pub lighters: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DifficultyBeatmapV4 {
    #[serde(deserialize_with = "lenient")]
    pub characteristic: String,
    #[serde(deserialize_with = "lenient")]
    pub difficulty: String,
    #[serde(deserialize_with = "lenient")]
    pub beatmap_authors: BeatmapAuthorsV4,
    #[serde(deserialize_with = "lenient")]
    pub note_jump_movement_speed: f32,
    #[serde(deserialize_with = "lenient")]
    pub note_jump_start_beat_offset: f32,
    #[serde(deserialize_with = "lenient")]
    pub beatmap_data_filename: String,
    #[serde(deserialize_with = "lenient")]
    pub lightshow_data_filename: String,
}

impl InfoV4 {
    pub fn has_fields(&self) -> bool {
        self.song.is_some() || !self.difficulty_beatmaps.is_empty()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct InfoV2 {
    #[serde(rename = "_version", deserialize_with = "lenient")]
    pub version: String,
    #[serde(rename = "_songName", deserialize_with = "lenient")]
    pub song_name: String,
    #[serde(rename = "_songSubName", deserialize_with = "lenient")]
    pub song_sub_name: String,
    #[serde(rename = "_songAuthorName", deserialize_with = "lenient")]
    pub song_author_name: String,
    #[serde(rename = "_levelAuthorName", deserialize_with = "lenient")]
    pub level_author_name: String,
    #[serde(rename = "_beatsPerMinute", deserialize_with = "lenient")]
    pub beats_per_minute: f32,
    #[serde(rename = "_previewStartTime", deserialize_with = "lenient")]
    pub preview_start_time: f32,
    #[serde(rename = "_previewDuration", deserialize_with = "lenient")]
    pub preview_duration: f32,
    #[serde(rename = "_songFilename", deserialize_with = "lenient")]
    pub song_filename: String,
    #[serde(rename = "_coverImageFilename", deserialize_with = "lenient")]
    pub cover_image_filename: String,
    #[serde(rename = "_environmentName", deserialize_with = "lenient")]
    pub environment_name: String,
    #[serde(rename = "_difficultyBeatmapSets", deserialize_with = "lenient_seq")]
    pub difficulty_beatmap_sets: Vec<DifficultyBeatmapSetV2>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DifficultyBeatmapSetV2 {
    #[serde(rename = "_beatmapCharacteristicName", deserialize_with = "lenient")]
    pub characteristic_name: String,
    #[serde(rename = "_difficultyBeatmaps", deserialize_with = "lenient_seq")]
    pub difficulty_beatmaps: Vec<DifficultyBeatmapV2>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DifficultyBeatmapV2 {
    #[serde(rename = "_difficulty", deserialize_with = "lenient")]
    pub difficulty: String,
    #[serde(rename = "_difficultyRank", deserialize_with = "lenient_int")]
    pub difficulty_rank: i32,
    #[serde(rename = "_beatmapFilename", deserialize_with = "lenient")]
    pub beatmap_filename: String,
    #[serde(rename = "_noteJumpMovementSpeed", deserialize_with = "lenient")]
    pub note_jump_movement_speed: f32,
    #[serde(rename = "_noteJumpStartBeatOffset", deserialize_with = "lenient")]
    pub note_jump_start_beat_offset: f32,
}

impl InfoV2 {
    pub fn has_fields(&self) -> bool {
        !self.difficulty_beatmap_sets.is_empty() || !self.song_name.is_empty()
    }
}

fn difficulty_level(name: &str) -> Option<DifficultyLevel> {
    match name.parse() {
        Ok(level) => Some(level),
        Err(err) => {
            log::warn!("Skipping difficulty reference: {}", err);
            None
        }
    }
}

impl From<InfoV4> for BeatmapInfo {
    fn from(info: InfoV4) -> Self {
        let song = info.song.unwrap_or_default();
        let difficulty_beatmaps = info
            .difficulty_beatmaps
            .into_iter()
            .filter_map(|d| {
                Some(DifficultyBeatmap {
                    difficulty: difficulty_level(&d.difficulty)?,
                    characteristic: d.characteristic,
                    mappers: d.beatmap_authors.mappers,
                    lighters: d.beatmap_authors.lighters,
                    note_jump_movement_speed: d.note_jump_movement_speed,
                    note_jump_start_beat_offset: d.note_jump_start_beat_offset,
                    beatmap_data_filename: d.beatmap_data_filename,
                    lightshow_data_filename: d.lightshow_data_filename,
                })
            })
            .collect();

        Self {
            version: info.version,
            song: SongInfo {
                title: song.title,
                sub_title: song.sub_title,
                author: song.author,
            },
            audio: AudioInfo {
                song_filename: info.audio.song_filename,
                song_duration: info.audio.song_duration,
                bpm: info.audio.bpm,
                preview_start_time: info.audio.preview_start_time,
                preview_duration: info.audio.preview_duration,
            },
            cover_image_filename: info.cover_image_filename,
            environment_names: info.environment_names,
            difficulty_beatmaps,
        }
    }
}

impl From<InfoV2> for BeatmapInfo {
    fn from(info: InfoV2) -> Self {
        let mappers = if info.level_author_name.is_empty() {
            Vec::new()
        } else {
            vec![info.level_author_name.clone()]
        };

        let difficulty_beatmaps = info
            .difficulty_beatmap_sets
            .iter()
            .flat_map(|set| {
                let mappers = &mappers;
                set.difficulty_beatmaps.iter().filter_map(move |d| {
                    let difficulty = difficulty_level(&d.difficulty)?;
                    if d.difficulty_rank != 0 && d.difficulty_rank != difficulty.rank() as i32 {
                        log::debug!(
                            "Difficulty rank {} does not match {}, using {}",
                            d.difficulty_rank,
                            difficulty,
                            difficulty.rank()
                        );
                    }
                    Some(DifficultyBeatmap {
                        characteristic: set.characteristic_name.clone(),
                        difficulty,
                        mappers: mappers.clone(),
                        lighters: Vec::new(),
                        note_jump_movement_speed: d.note_jump_movement_speed,
                        note_jump_start_beat_offset: d.note_jump_start_beat_offset,
                        beatmap_data_filename: d.beatmap_filename.clone(),
                        lightshow_data_filename: String::new(),
                    })
                })
            })
            .collect();

        let environment_names = if info.environment_name.is_empty() {
            Vec::new()
        } else {
            vec![info.environment_name]
        };

        Self {
            version: info.version,
            song: SongInfo {
                title: info.song_name,
                sub_title: info.song_sub_name,
                author: info.song_author_name,
            },
            audio: AudioInfo {
                song_filename: info.song_filename,
                // v2 does not store the duration.
                song_duration: 0.0,
                bpm: info.beats_per_minute,
                preview_start_time: info.preview_start_time,
                preview_duration: info.preview_duration,
            },
            cover_image_filename: info.cover_image_filename,
            environment_names,
            difficulty_beatmaps,
        }
    }
}

/// Info document in whichever schema it was read as.
#[derive(Clone, Debug)]
pub enum RawInfo {
    V4(InfoV4),
    V2(InfoV2),
}

impl RawInfo {
    pub fn has_fields(&self) -> bool {
        match self {
            Self::V4(info) => info.has_fields(),
            Self::V2(info) => info.has_fields(),
        }
    }

    pub fn into_canonical(self) -> BeatmapInfo {
        match self {
            Self::V4(info) => info.into(),
            Self::V2(info) => info.into(),
        }
    }
}
