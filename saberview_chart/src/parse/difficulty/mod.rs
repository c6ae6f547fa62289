//! Raw difficulty schemas. Conversion to [`BeatmapDifficulty`] happens once,
//! right after deserialization.

use crate::BeatmapDifficulty;

pub mod v2;
pub mod v3;
pub mod v4;

use v2::DifficultyV2;
use v3::DifficultyV3;
use v4::DifficultyV4;

/// Difficulty document in whichever schema it was read as.
#[derive(Clone, Debug)]
pub enum RawDifficulty {
    V4(DifficultyV4),
    V3(DifficultyV3),
    V2(DifficultyV2),
}

impl RawDifficulty {
    pub fn has_objects(&self) -> bool {
        match self {
            Self::V4(d) => d.has_objects(),
            Self::V3(d) => d.has_objects(),
            Self::V2(d) => d.has_objects(),
        }
    }

    pub fn into_canonical(self) -> BeatmapDifficulty {
        match self {
            Self::V4(d) => d.into(),
            Self::V3(d) => d.into(),
            Self::V2(d) => d.into_v3().into(),
        }
    }
}
