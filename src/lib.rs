//! gradekit is a parametric photo color-grading and compositing engine.
//!
//! A render takes an RGBA8 image and twelve slider [`Settings`] and produces a graded image of the
//! same size:
//!
//! - a per-pixel tone and color stage (exposure, white balance, contrast, tone ranges, saturation)
//! - then whole-image effects in a fixed order: clarity, sharpness, vignette
//!
//! Effects are built from a small compositing toolkit ([`Surface`], [`BlendMode`],
//! [`RadialGradient`]) that is usable on its own. Named looks live in a [`PresetCatalog`], and
//! [`suggest_settings`] turns an external [`Suggester`]'s loose JSON into clamped settings.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod blend;
mod foundation;
mod grade;
mod presets;
mod suggest;
mod surface;

pub use crate::foundation::error::{GradeError, GradeResult};

pub use crate::blend::composite::{BlendMode, Rgba8, composite_px, multiply, overlay, screen};
pub use crate::surface::gradient::{ColorStop, RadialGradient};
pub use crate::surface::pool::{SurfacePoolOpts, SurfacePoolStats};
pub use crate::surface::raster::{PixelLayer, RasterBuffer, Surface};

pub use crate::grade::effects::vignette_gradient;
pub use crate::grade::pipeline::{
    CancelFlag, RenderOpts, RenderStats, Renderer, Stage, apply_stages_in, render,
};
pub use crate::grade::settings::{OutOfRangeSetting, PartialSettings, SettingField, Settings};
pub use crate::grade::tone::grade_pixel;

pub use crate::presets::catalog::{Preset, PresetCatalog};
pub use crate::suggest::collaborator::{
    SUGGESTION_MAX_EDGE, SuggestPolicy, Suggester, SuggestionRequest, parse_suggestion,
    suggest_settings, suggestion_prompt,
};

pub use crate::assets::decode::{decode_image, load_image, save_png};
