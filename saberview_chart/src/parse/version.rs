use anyhow::Result;
use regex::Regex;

const INFO_V4_VERSIONS: &[&str] = &["4.0.0"];
const INFO_V2_VERSIONS: &[&str] = &["2.0.0", "2.1.0"];

const DIFFICULTY_V4_VERSIONS: &[&str] = &["4.0.0"];
const DIFFICULTY_V3_VERSIONS: &[&str] = &["3.0.0", "3.1.0", "3.2.0", "3.3.0"];
const DIFFICULTY_V2_VERSIONS: &[&str] = &["2.0.0", "2.2.0", "2.5.0", "2.6.0"];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InfoSchema {
    V4,
    V2,
}

impl InfoSchema {
    /// Newest first, the order the fallback cascade tries them in.
    pub const FALLBACK_ORDER: [Self; 2] = [Self::V4, Self::V2];

    pub fn classify(version: &str) -> Option<Self> {
        if INFO_V4_VERSIONS.contains(&version) {
            Some(Self::V4)
        } else if INFO_V2_VERSIONS.contains(&version) {
            Some(Self::V2)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DifficultySchema {
    V4,
    V3,
    V2,
}

impl DifficultySchema {
    /// Newest first, the order the fallback cascade tries them in.
    pub const FALLBACK_ORDER: [Self; 3] = [Self::V4, Self::V3, Self::V2];

    pub fn classify(version: &str) -> Option<Self> {
        if DIFFICULTY_V4_VERSIONS.contains(&version) {
            Some(Self::V4)
        } else if DIFFICULTY_V3_VERSIONS.contains(&version) {
            Some(Self::V3)
        } else if DIFFICULTY_V2_VERSIONS.contains(&version) {
            Some(Self::V2)
        } else {
            None
        }
    }
}

/// Finds the `"version": "X.Y.Z"` field of a document without parsing it.
pub struct VersionResolver {
    regex_version: Regex,
}

impl VersionResolver {
    pub fn new() -> Result<Self> {
        Ok(Self {
            // Also matches the `_version` key of v2 documents.
            regex_version: Regex::new(r#"version"\s*:\s*"((?:\d\.?)*)"#)?,
        })
    }

    /// Version string of the first version field, if there is one.
    pub fn extract<'a>(&self, json: &'a str) -> Option<&'a str> {
        self.regex_version
            .captures(json)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
            .filter(|version| !version.is_empty())
    }

    pub fn info_schema(&self, json: &str) -> Option<InfoSchema> {
        self.extract(json).and_then(InfoSchema::classify)
    }

    pub fn difficulty_schema(&self, json: &str) -> Option<DifficultySchema> {
        self.extract(json).and_then(DifficultySchema::classify)
    }
}
