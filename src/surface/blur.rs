use crate::foundation::error::{GradeError, GradeResult};

/// Largest kernel radius the blur will build, in pixels.
const MAX_KERNEL_RADIUS: u32 = 256;

/// Fixed-point 1.0 for kernel taps.
const Q16_ONE: u32 = 1 << 16;

/// Separable gaussian blur over premultiplied RGBA8.
///
/// `sigma` is the standard deviation in pixels; the kernel spans `ceil(3 * sigma)` on each side.
/// Samples beyond the edge repeat the border pixel.
pub(crate) fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    sigma: f32,
) -> GradeResult<Vec<u8>> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| GradeError::invalid_input("blur buffer size overflow"))?;
    if src.len() != len {
        return Err(GradeError::invalid_input(format!(
            "blur source has {} bytes, {width}x{height} needs {len}",
            src.len()
        )));
    }
    let Some(kernel) = Kernel::gaussian(sigma) else {
        return Ok(src.to_vec());
    };

    let (w, h) = (width as usize, height as usize);
    let mut rows = vec![0u8; len];
    let mut out = vec![0u8; len];
    convolve(src, &mut rows, w, h, &kernel, Axis::Horizontal);
    convolve(&rows, &mut out, w, h, &kernel, Axis::Vertical);
    Ok(out)
}

pub(crate) fn kernel_radius(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    ((sigma * 3.0).ceil() as u32).min(MAX_KERNEL_RADIUS)
}

#[derive(Clone, Copy, Debug)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Symmetric q16 taps summing to exactly [`Q16_ONE`].
#[derive(Debug)]
struct Kernel {
    taps: Vec<u32>,
}

impl Kernel {
    /// `None` when `sigma` is too small to move any pixel.
    fn gaussian(sigma: f32) -> Option<Self> {
        let r = kernel_radius(sigma) as i32;
        if r == 0 {
            return None;
        }
        let two_var = 2.0 * f64::from(sigma).powi(2);
        let raw: Vec<f64> = (-r..=r)
            .map(|i| (-f64::from(i * i) / two_var).exp())
            .collect();
        let total: f64 = raw.iter().sum();

        let mut taps: Vec<u32> = raw
            .iter()
            .map(|w| (w / total * f64::from(Q16_ONE)).round() as u32)
            .collect();
        // Rounding residue goes to the center tap.
        let sum: i64 = taps.iter().map(|&t| i64::from(t)).sum();
        let mid = taps.len() / 2;
        taps[mid] = (i64::from(taps[mid]) + i64::from(Q16_ONE) - sum).max(0) as u32;
        Some(Self { taps })
    }

    fn radius(&self) -> i64 {
        (self.taps.len() / 2) as i64
    }
}

/// One 1-D pass along `axis`, clamping sample positions to the image.
fn convolve(src: &[u8], dst: &mut [u8], width: usize, height: usize, kernel: &Kernel, axis: Axis) {
    let (extent, step) = match axis {
        Axis::Horizontal => (width, 4),
        Axis::Vertical => (height, width * 4),
    };
    let last = extent as i64 - 1;
    let r = kernel.radius();

    for (i, px) in dst.chunks_exact_mut(4).enumerate() {
        let (x, y) = (i % width, i / width);
        let (pos, line_start) = match axis {
            Axis::Horizontal => (x, y * width * 4),
            Axis::Vertical => (y, x * 4),
        };

        let mut acc = [0u64; 4];
        for (k, &tap) in kernel.taps.iter().enumerate() {
            let p = (pos as i64 + k as i64 - r).clamp(0, last) as usize;
            let at = line_start + p * step;
            for (a, &s) in acc.iter_mut().zip(&src[at..at + 4]) {
                *a += u64::from(tap) * u64::from(s);
            }
        }
        for (d, a) in px.iter_mut().zip(acc) {
            *d = ((a + u64::from(Q16_ONE / 2)) >> 16).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/blur.rs"]
mod tests;
