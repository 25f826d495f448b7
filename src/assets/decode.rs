use std::path::Path;

use anyhow::Context;

use crate::foundation::error::GradeResult;
use crate::surface::raster::RasterBuffer;

/// Decode any supported format (PNG, JPEG, WebP) into a straight-alpha RGBA8 buffer.
pub fn decode_image(bytes: &[u8]) -> GradeResult<RasterBuffer> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(RasterBuffer::from_rgba_image(dyn_img.to_rgba8()))
}

/// Read and decode an image file.
pub fn load_image(path: impl AsRef<Path>) -> GradeResult<RasterBuffer> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let dyn_img = image::load_from_memory(&bytes)
        .with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(RasterBuffer::from_rgba_image(dyn_img.to_rgba8()))
}

/// Write `buf` as a PNG, creating parent directories as needed.
pub fn save_png(path: impl AsRef<Path>, buf: &RasterBuffer) -> GradeResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        buf.data(),
        buf.width(),
        buf.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
