//! Render the Cornell box with bucket scheduling and save it next to the
//! working directory.
//!
//! `cargo run -p raymond_renderer --example cornell_box --release`

use raymond_renderer::{scenes, Color, RenderSettings, Renderer, Sensor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let (width, height) = (400, 400);
    let scene = scenes::cornell_box(width, height);
    let sensor = Sensor::new(width, height);

    let settings = RenderSettings::default()
        .with_samples(32)
        .with_ao_samples(4)
        .with_ambient(Color::splat(0.25))
        .with_threads(std::thread::available_parallelism().map_or(4, |n| n.get()))
        .with_buckets();
    let report = Renderer::new(settings).render(&scene, &sensor)?;
    println!("{report:#?}");

    sensor.to_image().save("cornell_box.png")?;
    Ok(())
}
