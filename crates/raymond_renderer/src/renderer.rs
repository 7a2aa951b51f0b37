//! Multithreaded render driver.
//!
//! A render runs on a dedicated rayon pool of `settings.threads` workers.
//! Work is split either into interleaved rows (worker `w` owns rows
//! `w, w + n, ...`) or into spiral-ordered buckets pulled from a shared
//! counter. Each worker keeps its own completed-pixel counter, so progress
//! can be polled from any thread without contention, and checks the stop
//! flag before starting each row or bucket.

use crate::{
    generate_buckets, Bucket, Camera, RenderError, RenderResult, RenderSettings, Scene, Sensor,
    TraceContext, Tracer, WorkPartition,
};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Summary of a finished (or cancelled) render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub width: u32,
    pub height: u32,
    /// Pixels written to the sensor
    pub pixels_completed: u64,
    pub total_pixels: u64,
    /// Whether `stop` cut the render short
    pub cancelled: bool,
    pub elapsed: Duration,
    /// Camera and reflection rays traced (shadow and AO rays excluded)
    pub rays_traced: u64,
    /// Deepest reflection bounce reached by any ray
    pub deepest_bounce: u32,
    pub threads: usize,
}

impl RenderReport {
    pub fn is_complete(&self) -> bool {
        self.pixels_completed == self.total_pixels
    }

    /// Fraction of pixels written, in [0, 1].
    pub fn completion(&self) -> f32 {
        if self.total_pixels == 0 {
            return 0.0;
        }
        self.pixels_completed as f32 / self.total_pixels as f32
    }
}

/// Per-worker totals folded into the report.
#[derive(Default)]
struct WorkerStats {
    rays_traced: u64,
    deepest_bounce: u32,
}

/// Moves the epoch to the next idle value when a render ends, however it
/// ends.
struct EpochGuard<'a> {
    epoch: &'a AtomicU64,
    idle: u64,
}

impl Drop for EpochGuard<'_> {
    fn drop(&mut self) {
        self.epoch.store(self.idle, Ordering::Release);
    }
}

/// Everything a worker reads while rendering.
struct Job<'a> {
    tracer: Tracer<'a>,
    camera: &'a Camera,
    sensor: &'a Sensor,
    seed: u64,
    epoch: u64,
}

/// Drives renders of a [`Scene`] into a [`Sensor`].
///
/// `render` blocks the calling thread; `progress` and `stop` may be called
/// concurrently from any other thread holding a shared reference.
pub struct Renderer {
    settings: RenderSettings,
    /// Render epoch: odd while a render runs, advanced by two per render
    epoch: AtomicU64,
    /// Epoch of the render `stop` was last called during
    stopped_epoch: AtomicU64,
    /// Completed pixels, one counter per worker
    progress: Vec<AtomicU64>,
    total_pixels: AtomicU64,
}

impl Renderer {
    pub fn new(settings: RenderSettings) -> Self {
        let progress = Self::counters(settings.threads);
        Self {
            settings,
            epoch: AtomicU64::new(0),
            stopped_epoch: AtomicU64::new(0),
            progress,
            total_pixels: AtomicU64::new(0),
        }
    }

    fn counters(threads: usize) -> Vec<AtomicU64> {
        (0..threads).map(|_| AtomicU64::new(0)).collect()
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Replace the settings. Needs exclusive access, so it can never race a
    /// running render.
    pub fn set_settings(&mut self, settings: RenderSettings) {
        if settings.threads != self.progress.len() {
            self.progress = Self::counters(settings.threads);
        }
        self.settings = settings;
    }

    pub fn is_rendering(&self) -> bool {
        self.epoch.load(Ordering::Acquire) % 2 == 1
    }

    /// Fraction of the current (or last) render's pixels that are done.
    ///
    /// Returns 0 before the first render. Never decreases during a render.
    pub fn progress(&self) -> f32 {
        let total = self.total_pixels.load(Ordering::Acquire);
        if total == 0 {
            return 0.0;
        }
        let done = self.completed_pixels();
        (done as f64 / total as f64).min(1.0) as f32
    }

    fn completed_pixels(&self) -> u64 {
        self.progress.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    /// Ask the running render to finish early.
    ///
    /// Workers stop at their next row or bucket boundary; pixels already
    /// written stay on the sensor. A call made while no render is running
    /// is ignored and never cancels a render started later.
    pub fn stop(&self) {
        let epoch = self.epoch.load(Ordering::Acquire);
        if epoch % 2 == 1 {
            self.stopped_epoch.store(epoch, Ordering::Release);
        }
    }

    fn should_stop(&self, epoch: u64) -> bool {
        self.stopped_epoch.load(Ordering::Acquire) == epoch
    }

    /// Render `scene` into `sensor`, blocking until done or stopped.
    ///
    /// The sensor is cleared first. Fails without touching the sensor if the
    /// settings are invalid, the sensor is empty, the camera resolution does
    /// not match the sensor, or another render is already in progress.
    pub fn render(&self, scene: &Scene, sensor: &Sensor) -> RenderResult<RenderReport> {
        self.settings.validate()?;

        let (width, height) = (sensor.width(), sensor.height());
        if sensor.pixel_count() == 0 {
            return Err(RenderError::EmptySensor { width, height });
        }
        let camera = scene.camera();
        if (camera.width(), camera.height()) != (width, height) {
            return Err(RenderError::ResolutionMismatch {
                camera: (camera.width(), camera.height()),
                sensor: (width, height),
            });
        }

        let idle = self.epoch.load(Ordering::Acquire);
        if idle % 2 == 1
            || self
                .epoch
                .compare_exchange(idle, idle + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            return Err(RenderError::AlreadyRendering);
        }
        let epoch = idle + 1;
        let _guard = EpochGuard {
            epoch: &self.epoch,
            idle: idle + 2,
        };

        let start = Instant::now();
        for counter in &self.progress {
            counter.store(0, Ordering::Relaxed);
        }
        let total_pixels = sensor.pixel_count() as u64;
        self.total_pixels.store(total_pixels, Ordering::Release);
        sensor.clear();

        let settings = &self.settings;
        let tracer = Tracer::new(scene, settings);
        let bvh = tracer.bvh();
        log::info!(
            "BVH built: {} primitives ({} unbounded), depth {}, {} leaves",
            bvh.len(),
            bvh.unbounded_len(),
            bvh.depth(),
            bvh.leaf_count()
        );

        let seed = settings.seed.unwrap_or_else(rand::random);
        log::debug!("Render seed: {seed}");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.threads)
            .thread_name(|i| format!("raymond-worker-{i}"))
            .build()?;

        log::info!(
            "Rendering {}x{} with {} threads ({:?}), {} spp, {} AO samples, {} max bounces",
            width,
            height,
            settings.threads,
            settings.partition,
            settings.samples,
            settings.ao_samples,
            settings.max_bounces
        );

        let job = Job {
            tracer,
            camera: scene.camera(),
            sensor,
            seed,
            epoch,
        };
        let stats = match settings.partition {
            WorkPartition::Rows => {
                pool.broadcast(|ctx| self.render_rows(&job, ctx.index(), ctx.num_threads()))
            }
            WorkPartition::Buckets { size } => {
                let buckets = generate_buckets(width, height, size);
                let next = AtomicUsize::new(0);
                log::debug!("{} buckets of {}px", buckets.len(), size);
                pool.broadcast(|ctx| self.render_buckets(&job, &buckets, &next, ctx.index()))
            }
        };

        let report = RenderReport {
            width,
            height,
            pixels_completed: self.completed_pixels(),
            total_pixels,
            cancelled: self.should_stop(epoch),
            elapsed: start.elapsed(),
            rays_traced: stats.iter().map(|s| s.rays_traced).sum(),
            deepest_bounce: stats.iter().map(|s| s.deepest_bounce).max().unwrap_or(0),
            threads: settings.threads,
        };

        if report.cancelled {
            log::warn!(
                "Render stopped after {:.2?}: {}/{} pixels",
                report.elapsed,
                report.pixels_completed,
                report.total_pixels
            );
        } else {
            log::info!(
                "Render finished in {:.2?}: {} rays, deepest bounce {}",
                report.elapsed,
                report.rays_traced,
                report.deepest_bounce
            );
        }

        Ok(report)
    }

    fn render_rows(&self, job: &Job<'_>, worker: usize, workers: usize) -> WorkerStats {
        let sensor = job.sensor;
        let mut ctx = TraceContext::new(job.seed);

        for y in (worker..sensor.height() as usize).step_by(workers) {
            if self.should_stop(job.epoch) {
                break;
            }
            let y = y as u32;
            for x in 0..sensor.width() {
                let color = job.tracer.sample_pixel(job.camera, x, y, job.seed, &mut ctx);
                sensor.set_pixel(x, y, color);
            }
            self.progress[worker].fetch_add(sensor.width() as u64, Ordering::Relaxed);
        }

        WorkerStats {
            rays_traced: ctx.rays_traced,
            deepest_bounce: ctx.deepest_bounce,
        }
    }

    fn render_buckets(
        &self,
        job: &Job<'_>,
        buckets: &[Bucket],
        next: &AtomicUsize,
        worker: usize,
    ) -> WorkerStats {
        let mut ctx = TraceContext::new(job.seed);

        while !self.should_stop(job.epoch) {
            let Some(bucket) = buckets.get(next.fetch_add(1, Ordering::Relaxed)) else {
                break;
            };
            for (x, y) in bucket.pixels() {
                let color = job.tracer.sample_pixel(job.camera, x, y, job.seed, &mut ctx);
                job.sensor.set_pixel(x, y, color);
            }
            self.progress[worker].fetch_add(bucket.pixel_count(), Ordering::Relaxed);
        }

        WorkerStats {
            rays_traced: ctx.rays_traced,
            deepest_bounce: ctx.deepest_bounce,
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}
