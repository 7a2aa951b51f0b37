//! `raymond` - render a built-in scene to a PNG file.

mod cli;
mod logger;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cli::Args;
use raymond_renderer::{scenes, RenderSettings, Renderer, Sensor, WorkPartition};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// How often the main thread reports progress while workers render.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

fn load_settings(args: &Args) -> Result<RenderSettings> {
    let mut settings = match &args.settings {
        Some(path) => read_settings(path)?,
        None => RenderSettings::default(),
    };

    if let Some(samples) = args.samples {
        settings.samples = samples;
    }
    if let Some(ao_samples) = args.ao_samples {
        settings.ao_samples = ao_samples;
    }
    if let Some(max_bounces) = args.max_bounces {
        settings.max_bounces = max_bounces;
    }
    if let Some(threads) = args.threads {
        settings.threads = threads;
    }
    if let Some(seed) = args.seed {
        settings.seed = Some(seed);
    }
    if let Some(size) = args.buckets {
        settings.partition = WorkPartition::Buckets { size };
    }
    if let Some(ambient) = args.ambient {
        settings.ambient = ambient;
    }
    if let Some(background) = args.background {
        settings.background = background;
    }

    settings.validate().context("Invalid render settings")?;
    Ok(settings)
}

fn read_settings(path: &Path) -> Result<RenderSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse settings file {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_logger(args.log_level.into());

    let settings = load_settings(&args)?;
    let scene = scenes::by_name(&args.scene, args.width, args.height).ok_or_else(|| {
        anyhow!(
            "Unknown scene `{}` (available: {})",
            args.scene,
            scenes::NAMES.join(", ")
        )
    })?;
    log::info!(
        "Scene `{}`: {} primitives, {} lights",
        args.scene,
        scene.len(),
        scene.lights().len()
    );

    let sensor = Sensor::new(args.width, args.height);
    let renderer = Renderer::new(settings);
    let time_limit = args.time_limit;

    let report = thread::scope(|s| {
        let handle = s.spawn(|| renderer.render(&scene, &sensor));
        let start = Instant::now();
        while !handle.is_finished() {
            thread::sleep(PROGRESS_INTERVAL);
            log::info!("Progress: {:5.1}%", renderer.progress() * 100.0);
            if time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                log::info!("Time limit reached, stopping");
                renderer.stop();
            }
        }
        handle.join()
    })
    .map_err(|_| anyhow!("Render thread panicked"))?
    .context("Render failed")?;

    log::info!(
        "{} of {} pixels in {:.2?} ({} rays)",
        report.pixels_completed,
        report.total_pixels,
        report.elapsed,
        report.rays_traced
    );

    sensor
        .to_image()
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}
