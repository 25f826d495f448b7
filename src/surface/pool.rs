use std::collections::HashMap;

use crate::foundation::error::GradeResult;
use crate::surface::raster::Surface;

/// Pool configuration for cached surfaces.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoolOpts {
    /// Maximum bytes retained across all buckets.
    pub max_pool_bytes: usize,
    /// Maximum number of retained surfaces per `(width, height)` bucket.
    pub max_surfaces_per_bucket: usize,
}

impl Default for SurfacePoolOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 256 * 1024 * 1024,
            max_surfaces_per_bucket: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SurfaceKey {
    w: u32,
    h: u32,
}

impl SurfaceKey {
    fn byte_len(self) -> usize {
        (self.w as usize)
            .saturating_mul(self.h as usize)
            .saturating_mul(4)
    }
}

/// Allocation counters for a [`SurfacePool`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SurfacePoolStats {
    /// Surfaces currently held by the pool.
    pub retained_surfaces: usize,
    /// Bytes currently held by the pool.
    pub retained_bytes: usize,
    /// Surfaces allocated because no pooled one fit.
    pub alloc_surfaces: u64,
    /// Bytes allocated because no pooled one fit.
    pub alloc_bytes: u64,
    /// Releases dropped because a cap was reached.
    pub dropped_on_release: u64,
}

/// Bounded pool of scratch surfaces keyed by `(width, height)`.
///
/// Borrowed surfaces keep whatever pixels they held when released; callers overwrite them.
/// Borrow/release happens per stage, never per pixel.
pub(crate) struct SurfacePool {
    opts: SurfacePoolOpts,
    stats: SurfacePoolStats,
    buckets: HashMap<SurfaceKey, Vec<Surface>>,
}

impl SurfacePool {
    pub(crate) fn new(opts: SurfacePoolOpts) -> Self {
        Self {
            opts,
            stats: SurfacePoolStats::default(),
            buckets: HashMap::new(),
        }
    }

    pub(crate) fn stats(&self) -> SurfacePoolStats {
        self.stats
    }

    pub(crate) fn borrow(&mut self, width: u32, height: u32) -> GradeResult<Surface> {
        let key = SurfaceKey {
            w: width,
            h: height,
        };
        if let Some(s) = self.buckets.get_mut(&key).and_then(Vec::pop) {
            self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(1);
            self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(key.byte_len());
            return Ok(s);
        }

        let s = Surface::new(width, height)?;
        self.stats.alloc_surfaces = self.stats.alloc_surfaces.saturating_add(1);
        self.stats.alloc_bytes = self.stats.alloc_bytes.saturating_add(key.byte_len() as u64);
        Ok(s)
    }

    pub(crate) fn release(&mut self, surface: Surface) {
        if self.opts.max_pool_bytes == 0 || self.opts.max_surfaces_per_bucket == 0 {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let key = SurfaceKey {
            w: surface.width(),
            h: surface.height(),
        };
        let bytes = key.byte_len();
        if self.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bucket = self.buckets.entry(key).or_default();
        if bucket.len() >= self.opts.max_surfaces_per_bucket {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        bucket.push(surface);
        self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bytes);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/pool.rs"]
mod tests;
