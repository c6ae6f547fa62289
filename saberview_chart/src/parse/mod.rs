use std::{fs, path::Path};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::LoadError;

pub mod difficulty;
pub mod info;
pub mod loader;
pub mod version;

pub use loader::BeatmapLoader;

/// Reads a whole text file. Missing or unreadable files yield an empty string,
/// which callers treat as "no document".
pub fn read_file_text<P>(path: P) -> String
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.is_file() {
        log::warn!("Trying to read a file that doesn't exist: {}", path.display());
        return String::new();
    }

    match fs::read_to_string(path) {
        // Some editors save with a byte order mark, which the json parser rejects.
        Ok(text) => text.trim_start_matches('\u{feff}').to_owned(),
        Err(err) => {
            log::warn!(
                "Unable to read the text from {} with error: {}",
                path.display(),
                err
            );
            String::new()
        }
    }
}

/// Parses the document tree. Anything that is not a JSON object is a
/// structural failure; field-level problems are left to the schema types.
pub(crate) fn parse_tree(json: &str) -> Result<Value, LoadError> {
    let tree = serde_json::from_str::<Value>(json).map_err(|err| LoadError::parse(&err))?;
    if tree.is_object() {
        Ok(tree)
    } else {
        Err(LoadError::Parse {
            message: String::from("expected a JSON object at the top level"),
            line: 1,
            column: 1,
        })
    }
}

pub(crate) fn deserialize_tree<T>(tree: &Value) -> Result<T, LoadError>
where
    T: DeserializeOwned,
{
    T::deserialize(tree).map_err(|err| LoadError::parse(&err))
}
