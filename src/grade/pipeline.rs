use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{GradeError, GradeResult};
use crate::grade::effects::{apply_clarity, apply_sharpness, apply_vignette};
use crate::grade::settings::{OutOfRangeSetting, Settings};
use crate::grade::tone::ToneCurve;
use crate::surface::pool::{SurfacePool, SurfacePoolOpts, SurfacePoolStats};
use crate::surface::raster::{RasterBuffer, Surface};

/// One pass of the grading pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Per-pixel exposure, white balance, tone and color.
    Tone,
    /// Mid-gray overlay or blur-and-reveal.
    Clarity,
    /// Self-overlay.
    Sharpness,
    /// Radial edge darkening or brightening.
    Vignette,
}

impl Stage {
    /// The order every render runs in. Post effects compound, so this order is part of the
    /// output contract.
    pub const ORDER: [Stage; 4] = [Stage::Tone, Stage::Clarity, Stage::Sharpness, Stage::Vignette];

    /// The whole-image stages, in render order.
    pub const POST_ORDER: [Stage; 3] = [Stage::Clarity, Stage::Sharpness, Stage::Vignette];

    /// Lowercase stage name.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Tone => "tone",
            Stage::Clarity => "clarity",
            Stage::Sharpness => "sharpness",
            Stage::Vignette => "vignette",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Renderer configuration.
#[derive(Clone, Debug, Default)]
pub struct RenderOpts {
    /// Run the tone stage row-parallel on a dedicated rayon pool.
    pub parallel: bool,
    /// Worker threads for the parallel pool; rayon's default when `None`.
    pub threads: Option<usize>,
    /// Longest output edge. Larger sources are downscaled before grading.
    pub max_dimension: Option<u32>,
    /// Scratch surface retention.
    pub pool: SurfacePoolOpts,
}

/// Cooperative cancellation shared between a render and whoever may abort it.
///
/// Checked between stages only; a stage that has started always finishes.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A flag that is not yet cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What one render did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderStats {
    /// Stages that changed pixels, in order.
    pub stages_run: Vec<Stage>,
    /// Stages skipped because their settings were neutral.
    pub stages_skipped: Vec<Stage>,
    /// Settings clamped into range at the boundary.
    pub clamped: Vec<OutOfRangeSetting>,
    /// Output size.
    pub width: u32,
    /// Output size.
    pub height: u32,
    /// Scratch pool counters after the render.
    pub pool: SurfacePoolStats,
}

/// Grades images, reusing scratch surfaces across calls.
///
/// ```no_run
/// use gradekit::{RasterBuffer, RenderOpts, Renderer, Settings};
///
/// let img = RasterBuffer::filled(64, 48, [120, 130, 140, 255]);
/// let settings = Settings { exposure: 25.0, vignette: 40.0, ..Settings::default() };
/// let mut renderer = Renderer::new(RenderOpts::default())?;
/// let out = renderer.render(&img, &settings)?;
/// assert_eq!((out.width(), out.height()), (64, 48));
/// # Ok::<(), gradekit::GradeError>(())
/// ```
pub struct Renderer {
    opts: RenderOpts,
    pool: SurfacePool,
    workers: Option<rayon::ThreadPool>,
}

impl Renderer {
    /// Build a renderer. Fails only when a parallel pool is requested and cannot be built.
    pub fn new(opts: RenderOpts) -> GradeResult<Self> {
        let workers = if opts.parallel {
            Some(build_thread_pool(opts.threads)?)
        } else {
            None
        };
        Ok(Self {
            pool: SurfacePool::new(opts.pool),
            opts,
            workers,
        })
    }

    /// Options this renderer was built with.
    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    /// Grade `source` with `settings`.
    pub fn render(&mut self, source: &RasterBuffer, settings: &Settings) -> GradeResult<RasterBuffer> {
        self.render_with_stats(source, settings, None)
            .map(|(out, _)| out)
    }

    /// Grade `source`, giving up with [`GradeError::Cancelled`] if `cancel` is set between stages.
    pub fn render_with_cancel(
        &mut self,
        source: &RasterBuffer,
        settings: &Settings,
        cancel: &CancelFlag,
    ) -> GradeResult<RasterBuffer> {
        self.render_with_stats(source, settings, Some(cancel))
            .map(|(out, _)| out)
    }

    /// Grade `source` and report what happened.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(width = source.width(), height = source.height())
    )]
    pub fn render_with_stats(
        &mut self,
        source: &RasterBuffer,
        settings: &Settings,
        cancel: Option<&CancelFlag>,
    ) -> GradeResult<(RasterBuffer, RenderStats)> {
        if source.is_empty() {
            return Err(GradeError::invalid_input(format!(
                "source image must be non-empty, got {}x{}",
                source.width(),
                source.height()
            )));
        }
        let (settings, clamped) = settings.sanitize()?;
        for c in &clamped {
            tracing::warn!(field = c.field, value = c.value, clamped_to = c.clamped_to, "{c}");
        }

        let (w, h) = fit_within(source.width(), source.height(), self.opts.max_dimension);
        let mut surface = self.pool.borrow(w, h)?;
        if let Err(e) = surface.draw_scaled(source, w, h) {
            self.pool.release(surface);
            return Err(e);
        }

        // Negative clarity needs the ungraded pixels at working size.
        let scaled_original;
        let original = if (w, h) == (source.width(), source.height()) {
            source
        } else {
            scaled_original = surface.snapshot();
            &scaled_original
        };

        let mut stats = RenderStats {
            clamped,
            width: w,
            height: h,
            ..RenderStats::default()
        };

        for stage in Stage::ORDER {
            if cancel.is_some_and(CancelFlag::is_cancelled) {
                tracing::debug!(%stage, "render cancelled");
                self.pool.release(surface);
                return Err(GradeError::Cancelled);
            }
            match self.run_stage(stage, &mut surface, original, &settings) {
                Ok(true) => {
                    tracing::debug!(%stage, "stage applied");
                    stats.stages_run.push(stage);
                }
                Ok(false) => {
                    tracing::debug!(%stage, "stage skipped");
                    stats.stages_skipped.push(stage);
                }
                Err(e) => {
                    self.pool.release(surface);
                    return Err(e);
                }
            }
        }

        stats.pool = self.pool.stats();
        Ok((surface.into_buffer(), stats))
    }

    fn run_stage(
        &mut self,
        stage: Stage,
        surface: &mut Surface,
        original: &RasterBuffer,
        settings: &Settings,
    ) -> GradeResult<bool> {
        match stage {
            Stage::Tone => {
                let curve = ToneCurve::new(settings);
                if curve.is_identity() {
                    return Ok(false);
                }
                let width = surface.width();
                match &self.workers {
                    Some(workers) => curve.apply_in_place_par(surface.data_mut(), width, workers),
                    None => curve.apply_in_place(surface.data_mut()),
                }
                Ok(true)
            }
            Stage::Clarity => apply_clarity(surface, original, settings.clarity),
            Stage::Sharpness => apply_sharpness(surface, settings.sharpness, &mut self.pool),
            Stage::Vignette => apply_vignette(surface, settings.vignette, &mut self.pool),
        }
    }
}

/// Grade `source` with `settings` in one shot.
///
/// The output has the source's dimensions. All-zero settings return the source unchanged.
pub fn render(source: &RasterBuffer, settings: &Settings) -> GradeResult<RasterBuffer> {
    Renderer::new(RenderOpts::default())?.render(source, settings)
}

/// Run whole-image stages over `surface` in an explicit order.
///
/// `original` is what negative clarity blends back and must match the surface size.
/// [`Stage::Tone`] entries are applied like any other stage. Settings are clamped first.
pub fn apply_stages_in(
    surface: &mut Surface,
    original: &RasterBuffer,
    settings: &Settings,
    order: &[Stage],
) -> GradeResult<()> {
    let (settings, _) = settings.sanitize()?;
    let mut renderer = Renderer::new(RenderOpts::default())?;
    for &stage in order {
        renderer.run_stage(stage, surface, original, &settings)?;
    }
    Ok(())
}

fn fit_within(width: u32, height: u32, max_dimension: Option<u32>) -> (u32, u32) {
    let Some(max) = max_dimension.filter(|&m| m > 0) else {
        return (width, height);
    };
    let longest = width.max(height);
    if longest <= max {
        return (width, height);
    }
    let scale = f64::from(max) / f64::from(longest);
    let w = ((f64::from(width) * scale).round() as u32).clamp(1, max);
    let h = ((f64::from(height) * scale).round() as u32).clamp(1, max);
    (w, h)
}

fn build_thread_pool(threads: Option<usize>) -> GradeResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(GradeError::invalid_input(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| GradeError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/grade/pipeline.rs"]
mod tests;
