use std::fmt;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{GradeError, GradeResult};

/// The twelve grading parameters of one edit.
///
/// Every field defaults to 0, and all-zero settings render the source unchanged. Conventional
/// slider domains are listed in [`Settings::FIELDS`]; values outside them are clamped at the
/// render boundary, not rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Exposure in hundredths of a stop.
    pub exposure: f32,
    /// Contrast around mid-gray.
    pub contrast: f32,
    /// Lift applied in proportion to darkness.
    pub shadows: f32,
    /// Shift applied in proportion to brightness.
    pub highlights: f32,
    /// Lift applied to very bright pixels only.
    pub whites: f32,
    /// Warm (positive, red) or cool (negative, blue) shift.
    pub temp: f32,
    /// Green (positive) or magenta (negative) shift.
    pub tint: f32,
    /// Uniform saturation change.
    pub saturation: f32,
    /// Saturation change that spares already-saturated pixels when positive.
    pub vibrance: f32,
    /// Self-overlay sharpening strength. Never negative.
    pub sharpness: f32,
    /// Midtone punch when positive, soft glow when negative.
    pub clarity: f32,
    /// Darkened (positive) or brightened (negative) edges.
    pub vignette: f32,
}

/// Name and documented domain of one [`Settings`] field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SettingField {
    /// Field name as used in JSON and on the command line.
    pub name: &'static str,
    /// Lowest valid value.
    pub min: f32,
    /// Highest valid value.
    pub max: f32,
}

impl SettingField {
    const fn new(name: &'static str, min: f32, max: f32) -> Self {
        Self { name, min, max }
    }
}

/// A setting that was outside its domain and got clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutOfRangeSetting {
    /// Field name.
    pub field: &'static str,
    /// The value supplied.
    pub value: f32,
    /// The value used instead.
    pub clamped_to: f32,
}

impl fmt::Display for OutOfRangeSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "setting '{}' = {} is out of range, clamped to {}",
            self.field, self.value, self.clamped_to
        )
    }
}

impl Settings {
    /// All fields in canonical order, with their domains.
    pub const FIELDS: [SettingField; 12] = [
        SettingField::new("exposure", -100.0, 100.0),
        SettingField::new("contrast", -100.0, 100.0),
        SettingField::new("shadows", -100.0, 100.0),
        SettingField::new("highlights", -100.0, 100.0),
        SettingField::new("whites", -100.0, 100.0),
        SettingField::new("temp", -100.0, 100.0),
        SettingField::new("tint", -100.0, 100.0),
        SettingField::new("saturation", -100.0, 100.0),
        SettingField::new("vibrance", -100.0, 100.0),
        SettingField::new("sharpness", 0.0, 100.0),
        SettingField::new("clarity", -100.0, 100.0),
        SettingField::new("vignette", -100.0, 100.0),
    ];

    /// Look up a field definition by name.
    pub fn field(name: &str) -> Option<&'static SettingField> {
        Self::FIELDS.iter().find(|f| f.name == name)
    }

    /// Read a field by name.
    pub fn get(&self, name: &str) -> Option<f32> {
        let v = match name {
            "exposure" => self.exposure,
            "contrast" => self.contrast,
            "shadows" => self.shadows,
            "highlights" => self.highlights,
            "whites" => self.whites,
            "temp" => self.temp,
            "tint" => self.tint,
            "saturation" => self.saturation,
            "vibrance" => self.vibrance,
            "sharpness" => self.sharpness,
            "clarity" => self.clarity,
            "vignette" => self.vignette,
            _ => return None,
        };
        Some(v)
    }

    /// Write a field by name. Unknown names are [`GradeError::InvalidInput`].
    pub fn set(&mut self, name: &str, value: f32) -> GradeResult<()> {
        let slot = self
            .slot_mut(name)
            .ok_or_else(|| GradeError::invalid_input(format!("unknown setting '{name}'")))?;
        *slot = value;
        Ok(())
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut f32> {
        let slot = match name {
            "exposure" => &mut self.exposure,
            "contrast" => &mut self.contrast,
            "shadows" => &mut self.shadows,
            "highlights" => &mut self.highlights,
            "whites" => &mut self.whites,
            "temp" => &mut self.temp,
            "tint" => &mut self.tint,
            "saturation" => &mut self.saturation,
            "vibrance" => &mut self.vibrance,
            "sharpness" => &mut self.sharpness,
            "clarity" => &mut self.clarity,
            "vignette" => &mut self.vignette,
            _ => return None,
        };
        Some(slot)
    }

    /// `true` when every field is exactly 0.
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// Clamp every field into its domain.
    ///
    /// Non-finite values are [`GradeError::InvalidInput`]. Out-of-range values are clamped and
    /// reported, not rejected.
    pub fn sanitize(&self) -> GradeResult<(Settings, Vec<OutOfRangeSetting>)> {
        let mut out = *self;
        let mut clamped = Vec::new();
        for f in &Self::FIELDS {
            let Some(slot) = out.slot_mut(f.name) else {
                continue;
            };
            let v = *slot;
            if !v.is_finite() {
                return Err(GradeError::invalid_input(format!(
                    "setting '{}' must be finite, got {v}",
                    f.name
                )));
            }
            let c = v.clamp(f.min, f.max);
            if c != v {
                *slot = c;
                clamped.push(OutOfRangeSetting {
                    field: f.name,
                    value: v,
                    clamped_to: c,
                });
            }
        }
        Ok((out, clamped))
    }

    /// These settings with every field present in `partial` replaced.
    pub fn merged(&self, partial: &PartialSettings) -> Settings {
        let mut out = *self;
        for f in &Self::FIELDS {
            if let (Some(v), Some(slot)) = (partial.get(f.name), out.slot_mut(f.name)) {
                *slot = v;
            }
        }
        out
    }

    /// Parse settings JSON. Missing fields default to 0; unknown fields are rejected.
    pub fn from_json(text: &str) -> GradeResult<Settings> {
        let partial: PartialSettings = serde_json::from_str(text)?;
        Ok(Settings::default().merged(&partial))
    }

    /// Parse a `name=value` assignment such as `exposure=25`.
    pub fn parse_assignment(text: &str) -> GradeResult<(&'static str, f32)> {
        let (name, value) = text.split_once('=').ok_or_else(|| {
            GradeError::invalid_input(format!("expected name=value, got '{text}'"))
        })?;
        let field = Self::field(name.trim())
            .ok_or_else(|| GradeError::invalid_input(format!("unknown setting '{}'", name.trim())))?;
        let value: f32 = value.trim().parse().map_err(|_| {
            GradeError::invalid_input(format!("setting '{}' needs a number", field.name))
        })?;
        Ok((field.name, value))
    }
}

/// A subset of [`Settings`]; absent fields leave the base value alone when merged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(missing_docs)]
pub struct PartialSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadows: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whites: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tint: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibrance: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clarity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vignette: Option<f32>,
}

impl PartialSettings {
    /// Read a field by name; `None` when absent or unknown.
    pub fn get(&self, name: &str) -> Option<f32> {
        match name {
            "exposure" => self.exposure,
            "contrast" => self.contrast,
            "shadows" => self.shadows,
            "highlights" => self.highlights,
            "whites" => self.whites,
            "temp" => self.temp,
            "tint" => self.tint,
            "saturation" => self.saturation,
            "vibrance" => self.vibrance,
            "sharpness" => self.sharpness,
            "clarity" => self.clarity,
            "vignette" => self.vignette,
            _ => None,
        }
    }

    /// Set a field by name. Unknown names are [`GradeError::InvalidInput`].
    pub fn set(&mut self, name: &str, value: f32) -> GradeResult<()> {
        let slot = match name {
            "exposure" => &mut self.exposure,
            "contrast" => &mut self.contrast,
            "shadows" => &mut self.shadows,
            "highlights" => &mut self.highlights,
            "whites" => &mut self.whites,
            "temp" => &mut self.temp,
            "tint" => &mut self.tint,
            "saturation" => &mut self.saturation,
            "vibrance" => &mut self.vibrance,
            "sharpness" => &mut self.sharpness,
            "clarity" => &mut self.clarity,
            "vignette" => &mut self.vignette,
            _ => {
                return Err(GradeError::invalid_input(format!(
                    "unknown setting '{name}'"
                )));
            }
        };
        *slot = Some(value);
        Ok(())
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        Settings::FIELDS
            .iter()
            .filter(|f| self.get(f.name).is_some())
            .count()
    }

    /// `true` when no field is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/grade/settings.rs"]
mod tests;
