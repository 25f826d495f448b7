use std::io::Cursor;
use std::time::{Duration, Instant};

use anyhow::Context as _;

use crate::foundation::error::{GradeError, GradeResult};
use crate::grade::settings::{PartialSettings, Settings};
use crate::surface::raster::RasterBuffer;

/// Longest edge of the preview sent to a suggester.
pub const SUGGESTION_MAX_EDGE: u32 = 512;

/// Something that looks at an image and answers with settings as (loosely formatted) JSON text.
///
/// Implementations own their transport. The crate ships none.
pub trait Suggester {
    /// Return the raw response text for `request`.
    fn suggest(&self, request: &SuggestionRequest) -> GradeResult<String>;
}

impl<F> Suggester for F
where
    F: Fn(&SuggestionRequest) -> GradeResult<String>,
{
    fn suggest(&self, request: &SuggestionRequest) -> GradeResult<String> {
        self(request)
    }
}

/// A downsized PNG preview plus the instruction text.
#[derive(Clone, Debug, PartialEq)]
pub struct SuggestionRequest {
    /// PNG-encoded preview.
    pub png: Vec<u8>,
    /// Preview size.
    pub width: u32,
    /// Preview size.
    pub height: u32,
    /// Instructions naming every field and its range.
    pub prompt: String,
}

impl SuggestionRequest {
    /// Build a request from `image`, downscaling so neither edge exceeds `max_edge`.
    pub fn from_image(image: &RasterBuffer, max_edge: u32) -> GradeResult<Self> {
        if image.is_empty() {
            return Err(GradeError::invalid_input(
                "suggestion source image must be non-empty",
            ));
        }
        let max_edge = max_edge.max(1);
        let (w, h) = (image.width(), image.height());
        let longest = w.max(h);
        let rgba = image.clone().into_rgba_image()?;
        let rgba = if longest > max_edge {
            let scale = f64::from(max_edge) / f64::from(longest);
            let nw = ((f64::from(w) * scale).round() as u32).max(1);
            let nh = ((f64::from(h) * scale).round() as u32).max(1);
            image::imageops::resize(&rgba, nw, nh, image::imageops::FilterType::Triangle)
        } else {
            rgba
        };
        let (width, height) = rgba.dimensions();

        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(rgba)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .context("encode suggestion preview as png")?;

        Ok(Self {
            png,
            width,
            height,
            prompt: suggestion_prompt(),
        })
    }
}

/// The instruction text sent with every request.
pub fn suggestion_prompt() -> String {
    let mut out = String::from(
        "Suggest photo grading settings for this image. Reply with a single JSON object \
         using these keys (numbers only, 0 means unchanged):\n",
    );
    for f in Settings::FIELDS.iter() {
        out.push_str(&format!("- {}: {} to {}\n", f.name, f.min, f.max));
    }
    out
}

/// Retry and deadline policy for [`suggest_settings`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SuggestPolicy {
    /// Attempts before giving up. `0` is treated as `1`.
    pub max_attempts: u32,
    /// No new attempt starts after this much time has passed. A running attempt is not interrupted.
    pub timeout: Duration,
    /// Longest preview edge.
    pub max_edge: u32,
}

impl Default for SuggestPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout: Duration::from_secs(30),
            max_edge: SUGGESTION_MAX_EDGE,
        }
    }
}

/// Parse a suggester response into settings.
///
/// Tolerates markdown fences and prose around the object; the first `{...}` wins. Known keys
/// may be numbers or numeric strings, unknown keys are ignored and missing keys stay 0. Values
/// are not clamped here.
pub fn parse_suggestion(text: &str) -> GradeResult<Settings> {
    let object = first_json_object(text)
        .ok_or_else(|| GradeError::malformed("no JSON object in response"))?;
    let value: serde_json::Value = serde_json::from_str(object)
        .map_err(|e| GradeError::malformed(format!("response is not valid JSON: {e}")))?;
    let serde_json::Value::Object(map) = value else {
        return Err(GradeError::malformed("response JSON is not an object"));
    };

    let mut partial = PartialSettings::default();
    for (key, v) in &map {
        let Some(field) = Settings::field(key) else {
            continue;
        };
        let n = match v {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .map(|n| n as f32)
        .filter(|n| n.is_finite())
        .ok_or_else(|| {
            GradeError::malformed(format!("field '{}' is not a number: {v}", field.name))
        })?;
        partial.set(field.name, n)?;
    }
    if partial.is_empty() {
        return Err(GradeError::malformed("response has no recognized settings"));
    }
    Ok(Settings::default().merged(&partial))
}

/// Ask `suggester` for settings, retrying failures within `policy`.
///
/// The result is clamped into range. Returns the last error once attempts or time run out.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(width = image.width(), height = image.height())
)]
pub fn suggest_settings<S: Suggester + ?Sized>(
    suggester: &S,
    image: &RasterBuffer,
    policy: &SuggestPolicy,
) -> GradeResult<Settings> {
    let request = SuggestionRequest::from_image(image, policy.max_edge)?;
    let started = Instant::now();
    let attempts = policy.max_attempts.max(1);
    let mut last_err = None;

    for attempt in 1..=attempts {
        if attempt > 1 && started.elapsed() >= policy.timeout {
            tracing::warn!(attempt, "suggestion deadline passed");
            break;
        }
        let result = suggester
            .suggest(&request)
            .and_then(|text| parse_suggestion(&text));
        match result {
            Ok(settings) => {
                let (settings, clamped) = settings.sanitize()?;
                for c in &clamped {
                    tracing::warn!(field = c.field, value = c.value, clamped_to = c.clamped_to, "{c}");
                }
                return Ok(settings);
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "suggestion attempt failed");
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| GradeError::malformed("no suggestion attempt was made")))
}

/// Slice of `text` covering the first balanced `{...}`, skipping braces inside strings.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_str = false;
    let mut escaped = false;
    for (i, b) in text.bytes().enumerate().skip(start) {
        if in_str {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_str = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_str = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
#[path = "../../tests/unit/suggest/collaborator.rs"]
mod tests;
