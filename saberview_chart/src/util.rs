//! Lenient field deserializers.
//!
//! Beatmap files are hand-edited by a lot of tools, so a single bad field must
//! not throw away the whole document. Each helper logs what it skips.

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

use crate::CustomCoordinates;

fn from_value_or_default<T>(value: Value) -> T
where
    T: DeserializeOwned + Default,
{
    serde_json::from_value(value).unwrap_or_else(|err| {
        log::warn!("Error parsing json: {}", err);
        T::default()
    })
}

/// Any field; a type mismatch yields the default value.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(from_value_or_default(value))
}

/// Integer field that also accepts integral floats (`1.0`). Fractions and
/// values outside `i32` fall back to 0.
pub(crate) fn lenient_int<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let int = match &value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|v| v.fract() == 0.0 && v.abs() <= i32::MAX as f64)
                    .map(|v| v as i64)
            })
            .and_then(|v| i32::try_from(v).ok()),
        _ => None,
    };
    Ok(int.unwrap_or_else(|| {
        if !value.is_null() {
            log::warn!("Error parsing json: expected integer, found {}", value);
        }
        0
    }))
}

/// Array field; elements that fail to deserialize are skipped individually.
pub(crate) fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            log::warn!("Error parsing json: expected array, found {}", other);
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                log::warn!("Error parsing json: skipping element {}: {}", index, err);
                None
            }
        })
        .collect())
}

/// `[x, y, ...]` custom placement; anything else is ignored.
pub(crate) fn lenient_coordinates<'de, D>(deserializer: D) -> Result<CustomCoordinates, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Option<Vec<f32>> = lenient(deserializer)?;
    Ok(match values.as_deref() {
        Some([x, y, ..]) => Some([*x, *y]),
        Some(_) => {
            log::warn!("Error parsing json: custom coordinates need two values");
            None
        }
        None => None,
    })
}
