use crate::blend::composite::BlendMode;
use crate::foundation::error::GradeResult;
use crate::foundation::math::clamp_u8;
use crate::surface::gradient::{ColorStop, RadialGradient};
use crate::surface::pool::SurfacePool;
use crate::surface::raster::{RasterBuffer, Surface};

const MID_GRAY: [u8; 4] = [128, 128, 128, 255];

/// Clarity. Positive: mid-gray overlay. Negative: blur, then let the ungraded `original` back in.
///
/// Returns `false` when `clarity` is 0 and nothing was drawn.
pub(crate) fn apply_clarity(
    surface: &mut Surface,
    original: &RasterBuffer,
    clarity: f32,
) -> GradeResult<bool> {
    if clarity > 0.0 {
        surface.fill_solid(MID_GRAY, BlendMode::Overlay, clarity / 100.0 * 0.4)?;
        Ok(true)
    } else if clarity < 0.0 {
        let amt = clarity / 100.0;
        surface.blur(amt.abs() * 2.0)?;
        // The pre-grade source, not the graded surface, is blended back.
        surface.composite(original, BlendMode::Normal, 0.5 + amt * 0.4)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Sharpness: overlay the surface onto itself at `sharpness / 400`.
pub(crate) fn apply_sharpness(
    surface: &mut Surface,
    sharpness: f32,
    pool: &mut SurfacePool,
) -> GradeResult<bool> {
    if sharpness <= 0.0 {
        return Ok(false);
    }
    let mut scratch = pool.borrow(surface.width(), surface.height())?;
    let res = surface.composite_self_with(&mut scratch, BlendMode::Overlay, sharpness / 400.0);
    pool.release(scratch);
    res.map(|()| true)
}

/// Vignette: radial ramp from the center, multiplied black when positive, screened white when
/// negative.
pub(crate) fn apply_vignette(
    surface: &mut Surface,
    vignette: f32,
    pool: &mut SurfacePool,
) -> GradeResult<bool> {
    if vignette == 0.0 {
        return Ok(false);
    }
    let gradient = vignette_gradient(surface.width(), surface.height(), vignette);
    let mode = if vignette > 0.0 {
        BlendMode::Multiply
    } else {
        BlendMode::Screen
    };

    let mut layer = pool.borrow(surface.width(), surface.height())?;
    let res = surface.fill_gradient_with(&mut layer, &gradient, mode, 1.0);
    pool.release(layer);
    res.map(|()| true)
}

/// The gradient used by the vignette for a `width x height` image.
///
/// The inner radius follows the image width alone; the outer radius follows the longer edge.
pub fn vignette_gradient(width: u32, height: u32, vignette: f32) -> RadialGradient {
    let (w, h) = (width as f32, height as f32);
    let alpha = clamp_u8(vignette.abs() / 100.0 * 0.8 * 255.0);
    let c = if vignette > 0.0 { 0 } else { 255 };
    RadialGradient {
        center: (w / 2.0, h / 2.0),
        inner_radius: w / 3.0,
        outer_radius: w.max(h) / 1.2,
        start: ColorStop::new(0.0, [c, c, c, 0]),
        end: ColorStop::new(1.0, [c, c, c, alpha]),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/grade/effects.rs"]
mod tests;
