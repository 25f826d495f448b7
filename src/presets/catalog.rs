use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{GradeError, GradeResult};
use crate::grade::settings::{PartialSettings, Settings};

/// A named look: a partial set of settings plus an accent color for UI chips.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Display name; lookups ignore case.
    pub name: String,
    /// Chip color, straight RGB.
    #[serde(default)]
    pub accent: [u8; 3],
    /// Fields this preset sets. Everything else stays at 0.
    pub settings: PartialSettings,
}

impl Preset {
    /// Full settings for this preset: its fields merged over the defaults.
    pub fn resolve(&self) -> Settings {
        Settings::default().merged(&self.settings)
    }
}

/// An ordered collection of presets with unique (case-insensitive) names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetCatalog {
    /// Presets in display order.
    pub presets: Vec<Preset>,
}

const UNSET: PartialSettings = PartialSettings {
    exposure: None,
    contrast: None,
    shadows: None,
    highlights: None,
    whites: None,
    temp: None,
    tint: None,
    saturation: None,
    vibrance: None,
    sharpness: None,
    clarity: None,
    vignette: None,
};

const BUILTIN: &[(&str, [u8; 3], PartialSettings)] = &[
    (
        "Vivid",
        [255, 94, 58],
        PartialSettings {
            contrast: Some(20.0),
            saturation: Some(25.0),
            vibrance: Some(30.0),
            clarity: Some(15.0),
            ..UNSET
        },
    ),
    (
        "Warm Glow",
        [255, 170, 60],
        PartialSettings {
            exposure: Some(10.0),
            temp: Some(35.0),
            highlights: Some(-15.0),
            vignette: Some(15.0),
            ..UNSET
        },
    ),
    (
        "Cool Breeze",
        [80, 160, 255],
        PartialSettings {
            temp: Some(-30.0),
            tint: Some(10.0),
            contrast: Some(10.0),
            saturation: Some(-10.0),
            ..UNSET
        },
    ),
    (
        "Dramatic",
        [120, 40, 160],
        PartialSettings {
            contrast: Some(45.0),
            shadows: Some(-20.0),
            highlights: Some(-25.0),
            clarity: Some(40.0),
            vignette: Some(50.0),
            ..UNSET
        },
    ),
    (
        "Faded Film",
        [190, 170, 150],
        PartialSettings {
            contrast: Some(-25.0),
            shadows: Some(30.0),
            saturation: Some(-20.0),
            temp: Some(10.0),
            ..UNSET
        },
    ),
    (
        "Noir",
        [40, 40, 40],
        PartialSettings {
            saturation: Some(-100.0),
            contrast: Some(35.0),
            vignette: Some(35.0),
            sharpness: Some(20.0),
            ..UNSET
        },
    ),
    (
        "Soft Dream",
        [255, 190, 220],
        PartialSettings {
            exposure: Some(15.0),
            clarity: Some(-40.0),
            highlights: Some(10.0),
            vignette: Some(-20.0),
            ..UNSET
        },
    ),
    (
        "Crisp",
        [60, 220, 170],
        PartialSettings {
            sharpness: Some(60.0),
            clarity: Some(30.0),
            whites: Some(15.0),
            vibrance: Some(10.0),
            ..UNSET
        },
    ),
];

impl PresetCatalog {
    /// The presets that ship with the crate.
    pub fn builtin() -> Self {
        let presets = BUILTIN
            .iter()
            .map(|&(name, accent, settings)| Preset {
                name: name.to_string(),
                accent,
                settings,
            })
            .collect();
        Self { presets }
    }

    /// Parse a catalog document: `{"presets": [{"name": .., "accent": [r,g,b], "settings": {..}}]}`.
    pub fn from_json(text: &str) -> GradeResult<Self> {
        let catalog: PresetCatalog = serde_json::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Read and parse a catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> GradeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read preset catalog '{}'", path.display()))?;
        Self::from_json(&text)
    }

    fn validate(&self) -> GradeResult<()> {
        for (i, p) in self.presets.iter().enumerate() {
            if p.name.trim().is_empty() {
                return Err(GradeError::invalid_input(format!(
                    "preset #{i} needs a non-empty name"
                )));
            }
            if self.presets[..i]
                .iter()
                .any(|q| q.name.eq_ignore_ascii_case(&p.name))
            {
                return Err(GradeError::invalid_input(format!(
                    "duplicate preset name '{}'",
                    p.name
                )));
            }
        }
        Ok(())
    }

    /// Find a preset by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> GradeResult<&Preset> {
        let name = name.trim();
        self.presets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| GradeError::invalid_input(format!("unknown preset '{name}'")))
    }

    /// Full settings for the named preset.
    pub fn resolve(&self, name: &str) -> GradeResult<Settings> {
        self.get(name).map(Preset::resolve)
    }

    /// Preset names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.name.as_str())
    }

    /// Add `other`'s presets. A preset whose name already exists replaces the old one in place.
    pub fn extend(&mut self, other: PresetCatalog) {
        for p in other.presets {
            match self
                .presets
                .iter_mut()
                .find(|q| q.name.eq_ignore_ascii_case(&p.name))
            {
                Some(slot) => *slot = p,
                None => self.presets.push(p),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/presets/catalog.rs"]
mod tests;
