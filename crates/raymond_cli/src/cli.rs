use clap::{Parser, ValueEnum};
use log::LevelFilter;
use raymond_math::Vec3;
use std::path::PathBuf;
use std::time::Duration;

/// Log levels selectable from the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments. Anything left unset keeps the value from the
/// settings file (or the built-in default).
#[derive(Parser, Debug)]
#[command(name = "raymond")]
#[command(about = "Multithreaded CPU ray tracer")]
pub struct Args {
    /// Built-in scene to render (cornell_box, mirror_box, checker)
    #[arg(default_value = "cornell_box")]
    pub scene: String,

    /// Image width in pixels
    #[arg(long, default_value = "300")]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "300")]
    pub height: u32,

    /// JSON file with render settings
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Camera rays per pixel
    #[arg(long, short = 'n')]
    pub samples: Option<u32>,

    /// Ambient occlusion rays per shaded point (0 disables AO)
    #[arg(long)]
    pub ao_samples: Option<u32>,

    /// Mirror reflection depth limit
    #[arg(long)]
    pub max_bounces: Option<u32>,

    /// Worker thread count
    #[arg(long, short = 'j')]
    pub threads: Option<usize>,

    /// Seed for pixel jitter; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Render in square buckets of this size instead of rows
    #[arg(long)]
    pub buckets: Option<u32>,

    /// Ambient light as "r,g,b"
    #[arg(long, value_parser = parse_color)]
    pub ambient: Option<Vec3>,

    /// Background color as "r,g,b"
    #[arg(long, value_parser = parse_color)]
    pub background: Option<Vec3>,

    /// Stop the render after this many seconds and keep the partial image
    #[arg(long, value_parser = parse_seconds)]
    pub time_limit: Option<Duration>,

    /// Output PNG path
    #[arg(short, long, default_value = "raymond.png")]
    pub output: PathBuf,

    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,
}

/// Parse "r,g,b" into a color.
fn parse_color(text: &str) -> Result<Vec3, String> {
    let parts = text
        .split(',')
        .map(|c| c.trim().parse::<f32>().map_err(|e| format!("`{c}`: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [r, g, b] => Ok(Vec3::new(*r, *g, *b)),
        _ => Err(format!("expected three comma-separated values, got {}", parts.len())),
    }
}

/// Parse a non-negative number of seconds.
fn parse_seconds(text: &str) -> Result<Duration, String> {
    let seconds = text.trim().parse::<f64>().map_err(|e| format!("`{text}`: {e}"))?;
    Duration::try_from_secs_f64(seconds).map_err(|e| format!("`{text}`: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("0.1, 0.2,0.3").unwrap(), Vec3::new(0.1, 0.2, 0.3));
        assert!(parse_color("1,2").is_err());
        assert!(parse_color("a,b,c").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "raymond",
            "mirror_box",
            "--samples",
            "4",
            "--buckets",
            "16",
            "--ambient",
            "0.1,0.1,0.1",
        ]);
        assert_eq!(args.scene, "mirror_box");
        assert_eq!(args.samples, Some(4));
        assert_eq!(args.buckets, Some(16));
        assert_eq!(args.ambient, Some(Vec3::splat(0.1)));
        assert_eq!(args.threads, None);
        assert_eq!(args.time_limit, None);
    }

    #[test]
    fn test_time_limit_rejects_negative_and_nan() {
        assert_eq!(parse_seconds("1.5").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_seconds("0").unwrap(), Duration::ZERO);
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("NaN").is_err());
        assert!(parse_seconds("inf").is_err());
        assert!(parse_seconds("soon").is_err());

        assert!(Args::try_parse_from(["raymond", "--time-limit=-1"]).is_err());
        let args = Args::try_parse_from(["raymond", "--time-limit", "2"]).unwrap();
        assert_eq!(args.time_limit, Some(Duration::from_secs(2)));
    }
}
