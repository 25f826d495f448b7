use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use gradekit::{PartialSettings, PresetCatalog, RenderOpts, Renderer, Settings};

#[derive(Parser, Debug)]
#[command(name = "gradekit", version)]
struct Cli {
    /// More log output (`-v` debug, `-vv` trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grade an image and write a PNG.
    Render(RenderArgs),
    /// List the preset catalog.
    Presets(PresetsArgs),
    /// Turn a raw suggestion response into clamped settings JSON.
    Sanitize(SanitizeArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input image (PNG, JPEG or WebP).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Settings JSON file. Missing fields are 0.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Start from a named preset; `--settings` and `--set` apply on top.
    #[arg(long)]
    preset: Option<String>,

    /// Extra preset catalog JSON, merged over the built-in presets.
    #[arg(long)]
    presets: Option<PathBuf>,

    /// Override one setting, e.g. `--set exposure=20`. Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Downscale so the longest edge is at most this many pixels.
    #[arg(long)]
    max_size: Option<u32>,

    /// Run the tone stage row-parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct PresetsArgs {
    /// Extra preset catalog JSON, merged over the built-in presets.
    #[arg(long)]
    presets: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SanitizeArgs {
    /// File holding the raw response text; `-` reads stdin.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Presets(args) => cmd_presets(args),
        Command::Sanitize(args) => cmd_sanitize(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(extra: Option<&PathBuf>) -> anyhow::Result<PresetCatalog> {
    let mut catalog = PresetCatalog::builtin();
    if let Some(path) = extra {
        catalog.extend(PresetCatalog::from_path(path)?);
    }
    Ok(catalog)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(args.presets.as_ref())?;
    let mut settings = match &args.preset {
        Some(name) => catalog.resolve(name)?,
        None => Settings::default(),
    };
    if let Some(path) = &args.settings {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        let partial: PartialSettings = serde_json::from_str(&text)
            .with_context(|| format!("parse settings '{}'", path.display()))?;
        settings = settings.merged(&partial);
    }
    for assignment in &args.set {
        let (name, value) = Settings::parse_assignment(assignment)?;
        settings.set(name, value)?;
    }

    let source = gradekit::load_image(&args.in_path)?;
    let mut renderer = Renderer::new(RenderOpts {
        parallel: args.parallel,
        threads: args.threads,
        max_dimension: args.max_size,
        ..RenderOpts::default()
    })?;
    let (out, stats) = renderer.render_with_stats(&source, &settings, None)?;
    tracing::debug!(
        stages_run = stats.stages_run.len(),
        clamped = stats.clamped.len(),
        "render finished"
    );

    gradekit::save_png(&args.out, &out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_presets(args: PresetsArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(args.presets.as_ref())?;
    for preset in &catalog.presets {
        let [r, g, b] = preset.accent;
        let fields = serde_json::to_string(&preset.settings).context("serialize preset")?;
        println!("{:<14} #{r:02x}{g:02x}{b:02x} {fields}", preset.name);
    }
    Ok(())
}

fn cmd_sanitize(args: SanitizeArgs) -> anyhow::Result<()> {
    let text = if args.in_path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("read stdin")?
    } else {
        std::fs::read_to_string(&args.in_path)
            .with_context(|| format!("read '{}'", args.in_path.display()))?
    };
    let (settings, clamped) = gradekit::parse_suggestion(&text)?.sanitize()?;
    for c in &clamped {
        tracing::warn!("{c}");
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&settings).context("serialize settings")?
    );
    Ok(())
}
