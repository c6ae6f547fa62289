use std::path::Path;

use anyhow::Result;
use serde_json::Value;

use crate::{
    parse::{
        deserialize_tree,
        difficulty::RawDifficulty,
        info::RawInfo,
        parse_tree, read_file_text,
        version::{DifficultySchema, InfoSchema, VersionResolver},
    },
    BeatmapDifficulty, BeatmapInfo, DifficultyBeatmap, LoadError, LoadedDifficulty,
};

fn read_info(tree: &Value, schema: InfoSchema) -> Result<RawInfo, LoadError> {
    Ok(match schema {
        InfoSchema::V4 => RawInfo::V4(deserialize_tree(tree)?),
        InfoSchema::V2 => RawInfo::V2(deserialize_tree(tree)?),
    })
}

fn read_difficulty(tree: &Value, schema: DifficultySchema) -> Result<RawDifficulty, LoadError> {
    Ok(match schema {
        DifficultySchema::V4 => RawDifficulty::V4(deserialize_tree(tree)?),
        DifficultySchema::V3 => RawDifficulty::V3(deserialize_tree(tree)?),
        DifficultySchema::V2 => RawDifficulty::V2(deserialize_tree(tree)?),
    })
}

/// Loads info and difficulty documents of any supported version and hands out
/// canonical data only.
pub struct BeatmapLoader {
    resolver: VersionResolver,
}

impl BeatmapLoader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            resolver: VersionResolver::new()?,
        })
    }

    pub fn resolver(&self) -> &VersionResolver {
        &self.resolver
    }

    pub fn load_info<P>(&self, path: P) -> Result<BeatmapInfo, LoadError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        log::info!("Loading text from {}", path.display());

        let json = read_file_text(path);
        if json.is_empty() {
            return Err(LoadError::NoDocument);
        }

        log::info!("Parsing {}", path.display());
        self.parse_info(&json)
    }

    pub fn parse_info(&self, json: &str) -> Result<BeatmapInfo, LoadError> {
        let tree = parse_tree(json).map_err(|err| {
            log::warn!("Unable to parse info from json with error: {}", err);
            err
        })?;

        let version = self.resolver.extract(json);
        log::info!("Info document is version: {}", version.unwrap_or("<missing>"));

        let raw = match version.and_then(InfoSchema::classify) {
            Some(schema) => {
                log::info!("Parsing info document in {:?} format.", schema);
                read_info(&tree, schema)?
            }
            None => {
                log::warn!("Info document has missing or unsupported version.");
                Self::info_fallback(&tree)?
            }
        };

        Ok(raw.into_canonical())
    }

    fn info_fallback(tree: &Value) -> Result<RawInfo, LoadError> {
        for schema in InfoSchema::FALLBACK_ORDER {
            log::info!("Trying to fallback load info document in {:?} format.", schema);
            match read_info(tree, schema) {
                Ok(raw) if raw.has_fields() => {
                    log::info!("Fallback for info document succeeded in {:?}.", schema);
                    return Ok(raw);
                }
                Ok(_) => log::info!("Fallback for info document failed in {:?}.", schema),
                Err(err) => log::info!(
                    "Fallback for info document failed in {:?}: {}",
                    schema,
                    err
                ),
            }
        }

        log::warn!("Info document is in an unsupported or missing version!");
        Err(LoadError::UnsupportedVersion)
    }

    /// Never fails: problems are logged and reported through
    /// [`LoadedDifficulty::issue`] alongside an empty document.
    pub fn load_difficulty<P>(&self, directory: P, reference: &DifficultyBeatmap) -> LoadedDifficulty
    where
        P: AsRef<Path>,
    {
        let filename = &reference.beatmap_data_filename;
        let loaded = LoadedDifficulty::from_reference(reference, BeatmapDifficulty::default());

        log::info!("Loading json from {}", filename);
        let json = read_file_text(directory.as_ref().join(filename));
        if json.is_empty() {
            log::warn!("Unable to load {}!", filename);
            return loaded.issue(LoadError::NoDocument);
        }

        log::info!("Parsing {}", filename);
        match self.parse_difficulty(&json, filename) {
            Ok(beatmap) => LoadedDifficulty { beatmap, ..loaded },
            Err(err) => loaded.issue(err),
        }
    }

    pub fn parse_difficulty(
        &self,
        json: &str,
        filename: &str,
    ) -> Result<BeatmapDifficulty, LoadError> {
        let tree = parse_tree(json).map_err(|err| {
            log::warn!("Unable to parse {} with error: {}", filename, err);
            err
        })?;

        let version = self.resolver.extract(json);
        log::info!("{} is version: {}", filename, version.unwrap_or("<missing>"));

        let raw = match version.and_then(DifficultySchema::classify) {
            Some(schema) => {
                log::info!("Parsing {} in {:?} format.", filename, schema);
                read_difficulty(&tree, schema)?
            }
            None => {
                log::warn!(
                    "Unable to match map version for {}. The map has either a missing or unsupported version.",
                    filename
                );
                Self::difficulty_fallback(&tree, filename)?
            }
        };

        let difficulty = raw.into_canonical();
        log::info!(
            "Parsed {} with {} notes, {} bombs, {} walls, {} arcs, {} chains.",
            filename,
            difficulty.notes.len(),
            difficulty.bombs.len(),
            difficulty.walls.len(),
            difficulty.arcs.len(),
            difficulty.chains.len()
        );

        Ok(difficulty)
    }

    fn difficulty_fallback(tree: &Value, filename: &str) -> Result<RawDifficulty, LoadError> {
        for schema in DifficultySchema::FALLBACK_ORDER {
            log::info!("Trying to fallback load {} in {:?} format.", filename, schema);
            match read_difficulty(tree, schema) {
                Ok(raw) if raw.has_objects() => {
                    log::info!("Fallback for {} succeeded in {:?}.", filename, schema);
                    return Ok(raw);
                }
                Ok(_) => log::info!("Fallback for {} failed in {:?}.", filename, schema),
                Err(err) => log::info!("Fallback for {} failed in {:?}: {}", filename, schema, err),
            }
        }

        log::warn!("{} is in an unsupported or missing version!", filename);
        Err(LoadError::UnsupportedVersion)
    }
}
