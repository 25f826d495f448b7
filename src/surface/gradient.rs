use crate::blend::composite::Rgba8;
use crate::foundation::math::clamp_u8;

/// A color at a position along a gradient ramp. `offset` is in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    /// Position along the ramp.
    pub offset: f32,
    /// Straight-alpha color at this position.
    pub color: Rgba8,
}

impl ColorStop {
    /// Build a stop at `offset` with `color`.
    pub fn new(offset: f32, color: Rgba8) -> Self {
        Self { offset, color }
    }
}

/// Two-stop radial gradient between concentric circles.
///
/// Inside `inner_radius` the ramp position is 0, beyond `outer_radius` it is 1, and it grows
/// linearly with distance in between. Colors past either stop pad with that stop's color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialGradient {
    /// Center in pixel coordinates.
    pub center: (f32, f32),
    /// Radius where the ramp starts.
    pub inner_radius: f32,
    /// Radius where the ramp ends.
    pub outer_radius: f32,
    /// Stop reached at the start of the ramp.
    pub start: ColorStop,
    /// Stop reached at the end of the ramp.
    pub end: ColorStop,
}

impl RadialGradient {
    /// Ramp position for the point `(x, y)`.
    pub fn position_at(&self, x: f32, y: f32) -> f32 {
        let dx = x - self.center.0;
        let dy = y - self.center.1;
        let dist = (dx * dx + dy * dy).sqrt();
        let span = self.outer_radius - self.inner_radius;
        if !span.is_finite() || span <= 0.0 {
            return if dist >= self.outer_radius { 1.0 } else { 0.0 };
        }
        ((dist - self.inner_radius) / span).clamp(0.0, 1.0)
    }

    /// Color of the gradient at the point `(x, y)`.
    pub fn sample(&self, x: f32, y: f32) -> Rgba8 {
        self.color_at(self.position_at(x, y))
    }

    fn color_at(&self, t: f32) -> Rgba8 {
        let (s0, s1) = (self.start.offset, self.end.offset);
        if t <= s0 {
            return self.start.color;
        }
        if t >= s1 {
            return self.end.color;
        }
        let u = (t - s0) / (s1 - s0);
        let mut out = [0u8; 4];
        for (i, o) in out.iter_mut().enumerate() {
            let a = f32::from(self.start.color[i]);
            let b = f32::from(self.end.color[i]);
            *o = clamp_u8(a + (b - a) * u);
        }
        out
    }

    /// Fill `dst` (packed RGBA8, `width x height`) with the gradient, sampling pixel centers.
    pub(crate) fn rasterize_into(&self, dst: &mut [u8], width: u32, height: u32) {
        let w = width as usize;
        for (y, row) in dst.chunks_exact_mut(w * 4).take(height as usize).enumerate() {
            let py = y as f32 + 0.5;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let c = self.sample(x as f32 + 0.5, py);
                px.copy_from_slice(&c);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/gradient.rs"]
mod tests;
