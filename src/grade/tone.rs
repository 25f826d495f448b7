//! Per-pixel exposure, white balance, tone and color math.
//!
//! Each adjustment is gated on its setting being non-zero, so neutral settings leave every
//! sample untouched. Order per pixel:
//!
//! 1. exposure `c * 2^(exposure/100)`
//! 2. white balance (temp on R or B, tint on G or R+B)
//! 3. luminance `0.299R + 0.587G + 0.114B`
//! 4. shadows / highlights / whites, keyed on that luminance
//! 5. contrast `f * (c - 128) + 128`, `f = 259(k + 255) / (255(259 - k))`
//! 6. clamp to `0..=255`
//! 7. vibrance then saturation around `0.2989R + 0.5870G + 0.1140B`

use rayon::prelude::*;

use crate::blend::composite::Rgba8;
use crate::foundation::math::clamp_u8;
use crate::grade::settings::Settings;

const WHITES_THRESHOLD: f32 = 200.0;

/// Constants derived once per render from [`Settings`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct ToneCurve {
    exposure_mult: Option<f32>,
    temp: f32,
    tint: f32,
    shadows: f32,
    highlights: f32,
    whites: f32,
    contrast_factor: Option<f32>,
    vibrance: f32,
    saturation: f32,
}

impl ToneCurve {
    pub(crate) fn new(s: &Settings) -> Self {
        Self {
            exposure_mult: (s.exposure != 0.0).then(|| 2.0f32.powf(s.exposure / 100.0)),
            temp: s.temp,
            tint: s.tint,
            shadows: s.shadows,
            highlights: s.highlights,
            whites: s.whites,
            contrast_factor: (s.contrast != 0.0)
                .then(|| 259.0 * (s.contrast + 255.0) / (255.0 * (259.0 - s.contrast))),
            vibrance: s.vibrance,
            saturation: s.saturation,
        }
    }

    /// `true` when no tone or color setting is active.
    pub(crate) fn is_identity(&self) -> bool {
        self.exposure_mult.is_none()
            && self.contrast_factor.is_none()
            && self.temp == 0.0
            && self.tint == 0.0
            && self.shadows == 0.0
            && self.highlights == 0.0
            && self.whites == 0.0
            && self.vibrance == 0.0
            && self.saturation == 0.0
    }

    #[inline]
    pub(crate) fn apply(&self, px: Rgba8) -> Rgba8 {
        let mut r = f32::from(px[0]);
        let mut g = f32::from(px[1]);
        let mut b = f32::from(px[2]);

        if let Some(m) = self.exposure_mult {
            r *= m;
            g *= m;
            b *= m;
        }

        if self.temp > 0.0 {
            r += self.temp * 0.5;
        } else if self.temp < 0.0 {
            b += self.temp.abs() * 0.5;
        }
        if self.tint > 0.0 {
            g += self.tint * 0.3;
        } else if self.tint < 0.0 {
            let t = self.tint.abs() * 0.3;
            r += t;
            b += t;
        }

        let lum = 0.299 * r + 0.587 * g + 0.114 * b;

        if self.shadows != 0.0 {
            let lift = (1.0 - lum / 255.0) * (self.shadows / 100.0) * 80.0;
            r += lift;
            g += lift;
            b += lift;
        }
        if self.highlights != 0.0 {
            // Additive: negative highlights pull bright regions down.
            let drop = (lum / 255.0) * (self.highlights / 100.0) * 80.0;
            r += drop;
            g += drop;
            b += drop;
        }
        if self.whites != 0.0 && lum > WHITES_THRESHOLD {
            let w = (self.whites / 100.0) * 50.0;
            r += w;
            g += w;
            b += w;
        }

        if let Some(f) = self.contrast_factor {
            r = f * (r - 128.0) + 128.0;
            g = f * (g - 128.0) + 128.0;
            b = f * (b - 128.0) + 128.0;
        }

        r = r.clamp(0.0, 255.0);
        g = g.clamp(0.0, 255.0);
        b = b.clamp(0.0, 255.0);

        if self.vibrance != 0.0 || self.saturation != 0.0 {
            let gray = 0.2989 * r + 0.5870 * g + 0.1140 * b;

            if self.vibrance != 0.0 {
                let vib_mult = 1.0 + self.vibrance / 100.0;
                let max = r.max(g).max(b);
                let avg = (r + g + b) / 3.0;
                let amt = ((max - avg).abs() * 2.0 / 255.0 * 0.5).min(1.0);
                let k = if self.vibrance > 0.0 {
                    (vib_mult - 1.0) * (1.0 - amt)
                } else {
                    vib_mult - 1.0
                };
                r += (r - gray) * k;
                g += (g - gray) * k;
                b += (b - gray) * k;
            }

            if self.saturation != 0.0 {
                let sat_mult = 1.0 + self.saturation / 100.0;
                r = gray + (r - gray) * sat_mult;
                g = gray + (g - gray) * sat_mult;
                b = gray + (b - gray) * sat_mult;
            }
        }

        [clamp_u8(r), clamp_u8(g), clamp_u8(b), px[3]]
    }

    pub(crate) fn apply_in_place(&self, data: &mut [u8]) {
        for px in data.chunks_exact_mut(4) {
            let out = self.apply([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&out);
        }
    }

    /// Row-parallel variant; every pixel depends only on itself.
    pub(crate) fn apply_in_place_par(&self, data: &mut [u8], width: u32, pool: &rayon::ThreadPool) {
        let row_bytes = (width as usize).max(1) * 4;
        pool.install(|| {
            data.par_chunks_mut(row_bytes)
                .for_each(|row| self.apply_in_place(row));
        });
    }
}

/// Grade a single pixel with the tone and color stage only.
///
/// Post effects (clarity, sharpness, vignette) need neighbouring pixels and are not applied.
/// `settings` are used as given; callers wanting boundary clamping use [`Settings::sanitize`].
pub fn grade_pixel(px: Rgba8, settings: &Settings) -> Rgba8 {
    ToneCurve::new(settings).apply(px)
}

#[cfg(test)]
#[path = "../../tests/unit/grade/tone.rs"]
mod tests;
