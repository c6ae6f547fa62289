//! User settings over a fixed set of named options.
//!
//! Every option has a default, so lookups never fail. Persisted settings use
//! `{"Bools": {..}, "Ints": {..}, "Floats": {..}}` keyed by option name.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use serde_json::{Map, Value};

macro_rules! setting_kind {
    ($kind:ident, $value:ty, { $($variant:ident => ($name:literal, $default:expr)),* $(,)? }) => {
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
        pub enum $kind {
            $($variant),*
        }

        impl $kind {
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),*
                }
            }

            pub fn default_value(self) -> $value {
                match self {
                    $(Self::$variant => $default),*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|s| s.name() == name)
            }
        }
    };
}

setting_kind!(BoolSetting, bool, {
    RandomHitsoundPitch => ("randomhitsoundpitch", false),
    SpatialHitsounds => ("spatialhitsounds", false),
    SimpleNotes => ("simplenotes", false),
    MoveAnimations => ("moveanimations", true),
    RotateAnimations => ("rotateanimations", true),
    ArcFadeAnimation => ("arcfadeanimation", true),
    ArcTextureAnimation => ("arctextureanimation", true),
    Vsync => ("vsync", true),
    Ssao => ("ssao", true),
    DynamicSoundPriority => ("dynamicsoundpriority", true),
});

setting_kind!(IntSetting, i32, {
    Hitsound => ("hitsound", 0),
    ArcDensity => ("arcdensity", 60),
    CameraFov => ("camerafov", 80),
    CameraTilt => ("cameratilt", 0),
    FrameCap => ("framecap", 60),
    Antialiasing => ("antialiasing", 0),
    CacheSize => ("cachesize", 3),
});

setting_kind!(FloatSetting, f32, {
    MusicVolume => ("musicvolume", 0.5),
    HitsoundVolume => ("hitsoundvolume", 0.5),
    UiScale => ("uiscale", 1.0),
    ChainVolume => ("chainvolume", 0.8),
    WallOpacity => ("wallopacity", 0.5),
    CameraPosition => ("cameraposition", -2.0),
    Bloom => ("bloom", 1.0),
    BackgroundBloom => ("backgroundbloom", 1.0),
    HitsoundBuffer => ("hitsoundbuffer", 0.2),
    ArcWidth => ("arcwidth", 0.1),
    ArcBrightness => ("arcbrightness", 1.0),
});

const BOOLS_KEY: &str = "Bools";
const INTS_KEY: &str = "Ints";
const FLOATS_KEY: &str = "Floats";

/// Only overrides are stored; anything unset reads as its default.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settings {
    bools: HashMap<BoolSetting, bool>,
    ints: HashMap<IntSetting, i32>,
    floats: HashMap<FloatSetting, f32>,
}

fn round_3(value: f32) -> f64 {
    (value as f64 * 1000.0).round() / 1000.0
}

/// Reads one section of the persisted settings, skipping what it can't use.
fn read_section<K, V>(
    root: &Map<String, Value>,
    section: &str,
    key: impl Fn(&str) -> Option<K>,
    value: impl Fn(&Value) -> Option<V>,
) -> HashMap<K, V>
where
    K: Eq + std::hash::Hash,
{
    let entries = match root.get(section) {
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            log::warn!("Settings section {} is not an object: {}", section, other);
            return HashMap::new();
        }
        None => return HashMap::new(),
    };

    entries
        .iter()
        .filter_map(|(name, raw)| {
            let Some(setting) = key(name) else {
                log::warn!("Ignoring unknown setting {}.{}", section, name);
                return None;
            };
            match value(raw) {
                Some(v) => Some((setting, v)),
                None => {
                    log::warn!("Ignoring setting {}.{} with invalid value {}", section, name, raw);
                    None
                }
            }
        })
        .collect()
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        let root = match serde_json::from_str::<Value>(json)? {
            Value::Object(root) => root,
            other => return Err(anyhow!("Settings must be a json object, found {}", other)),
        };

        Ok(Self {
            bools: read_section(&root, BOOLS_KEY, BoolSetting::from_name, Value::as_bool),
            ints: read_section(&root, INTS_KEY, IntSetting::from_name, |v| {
                v.as_i64()
                    .or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                    .and_then(|i| i32::try_from(i).ok())
            }),
            floats: read_section(&root, FLOATS_KEY, FloatSetting::from_name, |v| {
                v.as_f64().map(|f| f as f32)
            }),
        })
    }

    /// Every setting with its current value. Floats are rounded to three decimals.
    pub fn to_json(&self) -> Result<String> {
        let bools = BoolSetting::ALL
            .iter()
            .map(|&s| (s.name().to_owned(), Value::from(self.get_bool(s))))
            .collect::<Map<_, _>>();
        let ints = IntSetting::ALL
            .iter()
            .map(|&s| (s.name().to_owned(), Value::from(self.get_int(s))))
            .collect::<Map<_, _>>();
        let floats = FloatSetting::ALL
            .iter()
            .map(|&s| (s.name().to_owned(), Value::from(round_3(self.get_float(s)))))
            .collect::<Map<_, _>>();

        let mut root = Map::new();
        root.insert(BOOLS_KEY.to_owned(), Value::Object(bools));
        root.insert(INTS_KEY.to_owned(), Value::Object(ints));
        root.insert(FLOATS_KEY.to_owned(), Value::Object(floats));

        Ok(serde_json::to_string_pretty(&Value::Object(root))?)
    }

    pub fn get_bool(&self, setting: BoolSetting) -> bool {
        self.bools
            .get(&setting)
            .copied()
            .unwrap_or_else(|| setting.default_value())
    }

    pub fn get_int(&self, setting: IntSetting) -> i32 {
        self.ints
            .get(&setting)
            .copied()
            .unwrap_or_else(|| setting.default_value())
    }

    pub fn get_float(&self, setting: FloatSetting) -> f32 {
        self.floats
            .get(&setting)
            .copied()
            .unwrap_or_else(|| setting.default_value())
    }

    pub fn set_bool(&mut self, setting: BoolSetting, value: bool) {
        self.bools.insert(setting, value);
    }

    pub fn set_int(&mut self, setting: IntSetting, value: i32) {
        self.ints.insert(setting, value);
    }

    pub fn set_float(&mut self, setting: FloatSetting, value: f32) {
        self.floats.insert(setting, value);
    }

    pub fn reset(&mut self) {
        self.bools.clear();
        self.ints.clear();
        self.floats.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_settings_read_as_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.get_int(IntSetting::ArcDensity), 60);
        assert_eq!(settings.get_float(FloatSetting::ArcWidth), 0.1);
        assert_eq!(settings.get_float(FloatSetting::ArcBrightness), 1.0);
        assert!(settings.get_bool(BoolSetting::ArcFadeAnimation));
        assert!(settings.get_bool(BoolSetting::MoveAnimations));
        assert!(!settings.get_bool(BoolSetting::SimpleNotes));
    }

    #[test]
    fn overrides_and_reset() {
        let mut settings = Settings::default();
        settings.set_int(IntSetting::ArcDensity, 30);
        settings.set_bool(BoolSetting::ArcTextureAnimation, false);
        assert_eq!(settings.get_int(IntSetting::ArcDensity), 30);
        assert!(!settings.get_bool(BoolSetting::ArcTextureAnimation));

        settings.reset();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn names_are_unique_per_kind() {
        for (i, a) in FloatSetting::ALL.iter().enumerate() {
            assert_eq!(FloatSetting::from_name(a.name()), Some(*a));
            assert!(FloatSetting::ALL[i + 1..].iter().all(|b| b.name() != a.name()));
        }
        assert_eq!(BoolSetting::from_name("vsync"), Some(BoolSetting::Vsync));
        assert_eq!(IntSetting::from_name("nope"), None);
    }

    #[test]
    fn json_skips_unknown_and_mismatched_values() {
        let settings = Settings::from_json(
            r#"{
                "Bools": {"arcfadeanimation": false, "nonsense": true, "vsync": "yes"},
                "Ints": {"arcdensity": 24.0, "framecap": 1.5},
                "Floats": {"arcwidth": 0.25}
            }"#,
        )
        .unwrap();

        assert!(!settings.get_bool(BoolSetting::ArcFadeAnimation));
        assert!(settings.get_bool(BoolSetting::Vsync));
        assert_eq!(settings.get_int(IntSetting::ArcDensity), 24);
        assert_eq!(settings.get_int(IntSetting::FrameCap), 60);
        assert_eq!(settings.get_float(FloatSetting::ArcWidth), 0.25);

        assert!(Settings::from_json("[]").is_err());
        assert!(Settings::from_json("{").is_err());
    }

    #[test]
    fn json_round_trip_rounds_floats() {
        let mut settings = Settings::default();
        settings.set_float(FloatSetting::MusicVolume, 0.123456);
        settings.set_int(IntSetting::ArcDensity, 90);

        let json = settings.to_json().unwrap();
        let restored = Settings::from_json(&json).unwrap();

        assert_eq!(restored.get_int(IntSetting::ArcDensity), 90);
        assert!((restored.get_float(FloatSetting::MusicVolume) - 0.123).abs() < 1e-6);
        assert_eq!(restored.get_float(FloatSetting::CameraPosition), -2.0);
    }
}
