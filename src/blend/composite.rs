//! Blend modes and the alpha-compositing kernel shared by every post effect.
//!
//! Samples are straight (non-premultiplied) RGBA8. For a destination sample `d`, a source sample
//! `s` and an effective source coverage `a = opacity * src_alpha`:
//!
//! ```text
//! out_c = d * (1 - a) + blend(d, s) * a      (R, G, B)
//! out_a = a + d_a * (1 - a)
//! ```

use serde::{Deserialize, Serialize};

use crate::foundation::error::{GradeError, GradeResult};
use crate::foundation::math::clamp_u8;

/// One straight-alpha RGBA8 pixel.
pub type Rgba8 = [u8; 4];

/// Per-channel compositing function selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Plain alpha-over: the source replaces the destination in proportion to its coverage.
    #[default]
    Normal,
    /// `d * s / 255`. Darkens; white is neutral.
    Multiply,
    /// `255 - (255 - d) * (255 - s) / 255`. Lightens; black is neutral.
    Screen,
    /// Multiply below mid-gray, screen above, keyed on the destination.
    Overlay,
}

impl BlendMode {
    /// Apply this mode to one color channel. Inputs and output are in `0.0..=255.0`.
    #[inline(always)]
    pub fn blend_channel(self, d: f32, s: f32) -> f32 {
        match self {
            Self::Normal => s,
            Self::Multiply => multiply(d, s),
            Self::Screen => screen(d, s),
            Self::Overlay => overlay(d, s),
        }
    }
}

/// `d * s / 255`.
#[inline(always)]
pub fn multiply(d: f32, s: f32) -> f32 {
    d * s / 255.0
}

/// `255 - (255 - d) * (255 - s) / 255`.
#[inline(always)]
pub fn screen(d: f32, s: f32) -> f32 {
    255.0 - (255.0 - d) * (255.0 - s) / 255.0
}

/// `d < 128 ? 2ds/255 : 255 - 2(255-d)(255-s)/255`.
#[inline(always)]
pub fn overlay(d: f32, s: f32) -> f32 {
    if d < 128.0 {
        2.0 * d * s / 255.0
    } else {
        255.0 - 2.0 * (255.0 - d) * (255.0 - s) / 255.0
    }
}

/// Composite a single source pixel over a destination pixel.
pub fn composite_px(dst: Rgba8, src: Rgba8, mode: BlendMode, opacity: f32) -> Rgba8 {
    let opacity = normalize_opacity(opacity);
    composite_px_with(dst, src, opacity, |d, s| mode.blend_channel(d, s))
}

/// Composite `src` over `dst` in place. Buffers are tightly packed RGBA8 of equal length.
pub(crate) fn composite_in_place(
    dst: &mut [u8],
    src: &[u8],
    mode: BlendMode,
    opacity: f32,
) -> GradeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(GradeError::invalid_input(
            "composite_in_place expects equal-length rgba8 buffers",
        ));
    }
    let opacity = normalize_opacity(opacity);
    if opacity <= 0.0 {
        return Ok(());
    }

    // Dispatch once per op; each arm monomorphizes its own kernel.
    match mode {
        BlendMode::Normal => composite_with(dst, src, opacity, |_, s| s),
        BlendMode::Multiply => composite_with(dst, src, opacity, multiply),
        BlendMode::Screen => composite_with(dst, src, opacity, screen),
        BlendMode::Overlay => composite_with(dst, src, opacity, overlay),
    }
    Ok(())
}

/// Composite a uniform color layer over `dst` in place.
pub(crate) fn composite_uniform_in_place(
    dst: &mut [u8],
    color: Rgba8,
    mode: BlendMode,
    opacity: f32,
) -> GradeResult<()> {
    if !dst.len().is_multiple_of(4) {
        return Err(GradeError::invalid_input(
            "composite_uniform_in_place expects an rgba8 buffer",
        ));
    }
    let opacity = normalize_opacity(opacity);
    if opacity <= 0.0 || color[3] == 0 {
        return Ok(());
    }

    match mode {
        BlendMode::Normal => composite_uniform_with(dst, color, opacity, |_, s| s),
        BlendMode::Multiply => composite_uniform_with(dst, color, opacity, multiply),
        BlendMode::Screen => composite_uniform_with(dst, color, opacity, screen),
        BlendMode::Overlay => composite_uniform_with(dst, color, opacity, overlay),
    }
    Ok(())
}

#[inline(always)]
fn composite_uniform_with<F>(dst: &mut [u8], color: Rgba8, opacity: f32, blend_fn: F)
where
    F: Fn(f32, f32) -> f32,
{
    for d in dst.chunks_exact_mut(4) {
        let out = composite_px_with([d[0], d[1], d[2], d[3]], color, opacity, &blend_fn);
        d.copy_from_slice(&out);
    }
}

#[inline(always)]
fn composite_with<F>(dst: &mut [u8], src: &[u8], opacity: f32, blend_fn: F)
where
    F: Fn(f32, f32) -> f32,
{
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = composite_px_with(
            [d[0], d[1], d[2], d[3]],
            [s[0], s[1], s[2], s[3]],
            opacity,
            &blend_fn,
        );
        d.copy_from_slice(&out);
    }
}

#[inline(always)]
fn composite_px_with<F>(dst: Rgba8, src: Rgba8, opacity: f32, blend_fn: F) -> Rgba8
where
    F: Fn(f32, f32) -> f32,
{
    let a = opacity * (f32::from(src[3]) / 255.0);
    if a <= 0.0 {
        return dst;
    }
    let inv = 1.0 - a;

    let mut out = [0u8; 4];
    for i in 0..3 {
        let d = f32::from(dst[i]);
        let b = blend_fn(d, f32::from(src[i]));
        out[i] = clamp_u8(d * inv + b * a);
    }
    out[3] = clamp_u8(a * 255.0 + f32::from(dst[3]) * inv);
    out
}

fn normalize_opacity(opacity: f32) -> f32 {
    if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/composite.rs"]
mod tests;
