//! Command-line front end: generates a gradient-noise field and reports
//! summary statistics, optionally with a character-shaded preview.

use std::fs;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gradfield_core::noise::fbm::snap_dimensions;
use gradfield_core::noise::params::{DEFAULT_BASE_CELL_SIZE, DEFAULT_CELL_SIZE, DEFAULT_WORKERS};
use gradfield_core::{EdgeMode, FieldGenerator, GeneratorConfig, NoiseMode, ScalarField};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Single,
    Octaves,
    Fixed,
}

#[derive(Parser, Debug)]
#[command(name = "gradfield", about = "Parallel 2D gradient-noise field generator")]
struct Args {
    /// JSON generator configuration; overrides every mode flag below.
    #[arg(short, long)]
    config: Option<String>,

    #[arg(long, default_value_t = 1280)]
    width: usize,

    #[arg(long, default_value_t = 720)]
    height: usize,

    #[arg(short, long, value_enum, default_value_t = Mode::Single)]
    mode: Mode,

    /// Cell size in single mode, base cell size in fixed mode.
    #[arg(long)]
    cell_size: Option<usize>,

    #[arg(long, default_value_t = 6)]
    octaves: u32,

    #[arg(long, default_value_t = 0.5)]
    persistence: f32,

    #[arg(long, default_value_t = 2.0)]
    lacunarity: f32,

    #[arg(long, default_value_t = 2.0)]
    base_scale: f32,

    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Reject dimensions that are not whole multiples of every pass's cell size.
    #[arg(long)]
    strict: bool,

    /// Shrink width and height until every pass's cell size divides them.
    #[arg(long)]
    snap: bool,

    #[arg(short, long)]
    seed: Option<u64>,

    /// Print a character-shaded preview this many columns wide.
    #[arg(long)]
    preview: Option<usize>,

    /// Print the whole field as JSON on stdout instead of the summary.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn generator_config(&self) -> Result<GeneratorConfig> {
        if let Some(path) = &self.config {
            let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            return GeneratorConfig::from_json(&text).with_context(|| format!("parsing {path}"));
        }
        let mode = match self.mode {
            Mode::Single => NoiseMode::Single {
                cell_size: self.cell_size.unwrap_or(DEFAULT_CELL_SIZE),
            },
            Mode::Octaves => NoiseMode::Octaves {
                octave_count: self.octaves,
                persistence: self.persistence,
                lacunarity: self.lacunarity,
                base_scale: self.base_scale,
                base_amplitude: 1.0,
            },
            Mode::Fixed => NoiseMode::FixedSchedule {
                base_cell_size: self.cell_size.unwrap_or(DEFAULT_BASE_CELL_SIZE),
            },
        };
        Ok(GeneratorConfig {
            mode,
            workers: self.workers,
            edges: if self.strict { EdgeMode::Strict } else { EdgeMode::Clip },
            seed: self.seed,
        })
    }
}

/// Shade ramp from low to high intensity.
const RAMP: &[u8] = b" .:-=+*#%@";

fn print_preview(field: &ScalarField, columns: usize) {
    let columns = columns.clamp(1, field.width());
    let step_x = field.width() as f64 / columns as f64;
    // Terminal cells are roughly twice as tall as wide.
    let step_y = step_x * 2.0;
    let levels = field.to_intensities();
    let rows = ((field.height() as f64 / step_y).floor() as usize).max(1);
    for r in 0..rows {
        let y = ((r as f64 * step_y) as usize).min(field.height() - 1);
        let line: String = (0..columns)
            .map(|c| {
                let x = ((c as f64 * step_x) as usize).min(field.width() - 1);
                let level = levels[y * field.width() + x] as usize * (RAMP.len() - 1) / 255;
                RAMP[level] as char
            })
            .collect();
        println!("{line}");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.generator_config()?;

    let (mut width, mut height) = (args.width, args.height);
    if args.snap {
        let snapped = snap_dimensions(&config.mode, width, height)
            .with_context(|| format!("snapping {width}x{height} to the pass cell sizes"))?;
        (width, height) = snapped;
        tracing::info!(width, height, "snapped dimensions to pass cell sizes");
    }

    let generator = FieldGenerator::new(config);
    let start = Instant::now();
    let field = generator
        .generate(width, height)
        .with_context(|| format!("generating {width}x{height} field"))?;
    tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "field generated");

    if args.json {
        println!("{}", serde_json::to_string(&field).context("serialising field")?);
        return Ok(());
    }

    println!("size    {}x{}", field.width(), field.height());
    println!("min     {:.4}", field.min_value());
    println!("max     {:.4}", field.max_value());
    println!("mean    {:.4}", field.mean());

    if let Some(columns) = args.preview {
        print_preview(&field, columns);
    }

    Ok(())
}
