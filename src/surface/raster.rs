use image::imageops::FilterType;

use crate::blend::composite::{
    BlendMode, Rgba8, composite_in_place, composite_uniform_in_place,
};
use crate::foundation::error::{GradeError, GradeResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};
use crate::surface::blur::blur_rgba8_premul;
use crate::surface::gradient::RadialGradient;

/// An RGBA8 image as handed to and returned from the engine.
///
/// Pixels are straight (non-premultiplied) alpha, tightly packed, row-major with a top-left
/// origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Wrap raw RGBA8 bytes. `data.len()` must equal `width * height * 4`.
    ///
    /// Zero-area buffers are representable; [`crate::render`] rejects them.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> GradeResult<Self> {
        let expected = rgba_len(width, height)?;
        if data.len() != expected {
            return Err(GradeError::invalid_input(format!(
                "raster buffer of {width}x{height} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A buffer where every pixel is `px`.
    pub fn filled(width: u32, height: u32, px: Rgba8) -> Self {
        let n = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            data: px.repeat(n),
        }
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgba8) -> Self {
        let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `true` when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Raw RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer and return its bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// The pixel at `(x, y)`. Panics when out of bounds, like slice indexing.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Convert from an `image` RGBA8 buffer.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }

    /// Convert into an `image` RGBA8 buffer.
    pub fn into_rgba_image(self) -> GradeResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data)
            .ok_or_else(|| GradeError::invalid_input("raster buffer does not match its dimensions"))
    }
}

/// Read access to a packed RGBA8 pixel layer.
///
/// Implemented by both the immutable [`RasterBuffer`] and the mutable [`Surface`], so either can
/// be composited onto a surface.
pub trait PixelLayer {
    /// `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);
    /// Packed RGBA8 bytes.
    fn pixels(&self) -> &[u8];
}

impl PixelLayer for RasterBuffer {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn pixels(&self) -> &[u8] {
        &self.data
    }
}

impl PixelLayer for Surface {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn pixels(&self) -> &[u8] {
        &self.data
    }
}

/// Mutable RGBA8 drawing surface.
///
/// Every operation takes its blend mode and opacity explicitly; there is no ambient drawing
/// state. Samples are `u8`, and every float result is rounded and clamped before it is stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// A fully transparent surface. Both dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> GradeResult<Self> {
        if width == 0 || height == 0 {
            return Err(GradeError::invalid_input(format!(
                "surface must be non-empty, got {width}x{height}"
            )));
        }
        let len = rgba_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Change dimensions, clearing to transparent when they differ.
    pub(crate) fn reset(&mut self, width: u32, height: u32) -> GradeResult<()> {
        if width == 0 || height == 0 {
            return Err(GradeError::invalid_input(format!(
                "surface must be non-empty, got {width}x{height}"
            )));
        }
        if (width, height) != (self.width, self.height) {
            let len = rgba_len(width, height)?;
            self.data.clear();
            self.data.resize(len, 0);
            self.width = width;
            self.height = height;
        }
        Ok(())
    }

    pub(crate) fn copy_from(&mut self, other: &Surface) -> GradeResult<()> {
        self.reset(other.width, other.height)?;
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Draw `image` so that it fills a `dst_w x dst_h` surface.
    ///
    /// The surface takes the destination size. Equal sizes copy bytes exactly; otherwise the
    /// image is resampled with a triangle (bilinear) filter.
    pub fn draw_scaled(&mut self, image: &RasterBuffer, dst_w: u32, dst_h: u32) -> GradeResult<()> {
        if image.is_empty() {
            return Err(GradeError::invalid_input("cannot draw an empty image"));
        }
        self.reset(dst_w, dst_h)?;

        if (image.width, image.height) == (dst_w, dst_h) {
            self.data.copy_from_slice(&image.data);
            return Ok(());
        }

        let src = image::RgbaImage::from_raw(image.width, image.height, image.data.clone())
            .ok_or_else(|| GradeError::invalid_input("raster buffer does not match its size"))?;
        let scaled = image::imageops::resize(&src, dst_w, dst_h, FilterType::Triangle);
        self.data.copy_from_slice(scaled.as_raw());
        Ok(())
    }

    /// Composite `layer` over the surface with `mode` at `opacity`.
    ///
    /// The layer must match the surface dimensions.
    pub fn composite<L: PixelLayer + ?Sized>(
        &mut self,
        layer: &L,
        mode: BlendMode,
        opacity: f32,
    ) -> GradeResult<()> {
        let (w, h) = layer.dimensions();
        if (w, h) != (self.width, self.height) {
            return Err(GradeError::invalid_input(format!(
                "layer {w}x{h} does not match surface {}x{}",
                self.width, self.height
            )));
        }
        composite_in_place(&mut self.data, layer.pixels(), mode, opacity)
    }

    /// Composite the surface's current contents onto itself.
    pub fn composite_self(&mut self, mode: BlendMode, opacity: f32) -> GradeResult<()> {
        let mut scratch = self.clone();
        self.composite_self_with(&mut scratch, mode, opacity)
    }

    pub(crate) fn composite_self_with(
        &mut self,
        scratch: &mut Surface,
        mode: BlendMode,
        opacity: f32,
    ) -> GradeResult<()> {
        scratch.copy_from(self)?;
        self.composite(&*scratch, mode, opacity)
    }

    /// Composite a uniform `color` fill over the whole surface.
    pub fn fill_solid(&mut self, color: Rgba8, mode: BlendMode, opacity: f32) -> GradeResult<()> {
        composite_uniform_in_place(&mut self.data, color, mode, opacity)
    }

    /// Rasterize `gradient` into a layer and composite it over the surface.
    pub fn fill_gradient(
        &mut self,
        gradient: &RadialGradient,
        mode: BlendMode,
        opacity: f32,
    ) -> GradeResult<()> {
        let mut layer = Surface::new(self.width, self.height)?;
        self.fill_gradient_with(&mut layer, gradient, mode, opacity)
    }

    pub(crate) fn fill_gradient_with(
        &mut self,
        layer: &mut Surface,
        gradient: &RadialGradient,
        mode: BlendMode,
        opacity: f32,
    ) -> GradeResult<()> {
        layer.reset(self.width, self.height)?;
        gradient.rasterize_into(&mut layer.data, self.width, self.height);
        self.composite(&*layer, mode, opacity)
    }

    /// Soften the surface with a gaussian of standard deviation `radius_px`.
    ///
    /// Non-positive or non-finite radii leave the surface untouched.
    pub fn blur(&mut self, radius_px: f32) -> GradeResult<()> {
        if !radius_px.is_finite() || radius_px <= 0.0 {
            return Ok(());
        }
        premultiply_rgba8_in_place(&mut self.data);
        let out = blur_rgba8_premul(&self.data, self.width, self.height, radius_px)?;
        self.data = out;
        unpremultiply_rgba8_in_place(&mut self.data);
        Ok(())
    }

    /// Copy the current contents into an immutable buffer.
    pub fn snapshot(&self) -> RasterBuffer {
        RasterBuffer {
            width: self.width,
            height: self.height,
            data: self.data.clone(),
        }
    }

    /// Hand the surface's pixels over as a [`RasterBuffer`].
    pub fn into_buffer(self) -> RasterBuffer {
        RasterBuffer {
            width: self.width,
            height: self.height,
            data: self.data,
        }
    }
}

fn rgba_len(width: u32, height: u32) -> GradeResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| GradeError::invalid_input("raster buffer size overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/surface/raster.rs"]
mod tests;
