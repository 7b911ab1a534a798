/// Point cloud ingest entry point: decode a LAS/LAZ file and print a summary
use argh::FromArgs;
use indicatif::{ProgressBar, ProgressStyle};
use point_cloud_ingest::{LoadOptions, ProgressSink, loader};
use std::path::PathBuf;
use std::sync::Arc;

/// Decodes a LAS or LAZ file into a projected, coloured point set
#[derive(Debug, FromArgs)]
struct Args {
    /// input .las or .laz file
    #[argh(positional)]
    path: PathBuf,

    /// JSON file with load options (isGeographic, maxPoints, useWorker)
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// subsampling budget, overrides the config file
    #[argh(option, short = 'm')]
    max_points: Option<usize>,

    /// decode on the calling thread instead of a worker
    #[argh(switch)]
    inline: bool,

    /// only check the header and print the estimate
    #[argh(switch)]
    validate_only: bool,

    /// write the JSON summary to this path instead of stdout
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,
}

/// Terminal progress bar fed by the decode phases.
struct BarProgress(ProgressBar);

impl ProgressSink for BarProgress {
    fn report(&self, percent: f32, phase: &str) {
        self.0.set_position(percent.clamp(0.0, 100.0) as u64);
        self.0.set_message(phase.to_string());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut options = match &args.config {
        Some(path) => LoadOptions::from_json_file(path)?,
        None => LoadOptions::default(),
    };
    if let Some(max_points) = args.max_points {
        options.max_points = max_points;
    }
    if args.inline {
        options.use_worker = false;
    }

    let verdict = loader::validate_file(&args.path, options.max_points)?;
    println!("LAS/LAZ File Information:");
    println!("  File: {}", args.path.display());
    println!("  Version: {}", verdict.version);
    println!("  Points: {}", verdict.point_count);
    println!(
        "  Point format: {}{}",
        verdict.point_format,
        if verdict.compressed { " (compressed)" } else { "" }
    );
    println!(
        "  Estimated memory: {:.1} MiB",
        verdict.estimated_bytes as f64 / (1024.0 * 1024.0)
    );

    if args.validate_only {
        return emit(&args.output, &serde_json::to_value(&verdict)?);
    }

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}% {msg}")?
            .progress_chars("▉▊▋▌▍▎▏ "),
    );
    let progress = Arc::new(BarProgress(pb.clone()));
    let cloud = loader::load_file(&args.path, options, progress)?;
    pb.finish_with_message("Points loaded");

    let bounds = &cloud.summary.geodetic_bounds;
    println!("Geodetic bounds:");
    println!("  Lon: {:.7} to {:.7}", bounds.min_lon, bounds.max_lon);
    println!("  Lat: {:.7} to {:.7}", bounds.min_lat, bounds.max_lat);
    println!(
        "  Elevation: {:.2} to {:.2}",
        bounds.min_elevation, bounds.max_elevation
    );
    println!(
        "  Loaded: {} of {} points (step {})",
        cloud.summary.loaded_points, cloud.summary.total_points, cloud.summary.step
    );

    let summary = serde_json::json!({
        "header": cloud.header,
        "summary": cloud.summary,
        "has_colour": cloud.has_colour,
    });
    emit(&args.output, &summary)
}

fn emit(
    output: &Option<PathBuf>,
    value: &serde_json::Value,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            println!("Saved {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}
