/*
 * Flox - Boid Flocking Simulation
 *
 * Boids move under three local rules (separation, alignment, cohesion),
 * are pulled back when they leave the bound around the origin, and steer
 * towards a cruise speed. The window shows them as oriented triangles with
 * sliders for every tunable; --headless runs the same simulation without a
 * window and reports statistics and timings.
 */

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use flox::{Flock, Pose, SimulationParams, Timer};

#[derive(Parser, Debug)]
#[command(name = "flox", version, about = "Boid flocking simulation")]
struct Args {
    /// TOML file with simulation parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of boids
    #[arg(short, long)]
    population: Option<usize>,

    /// Seed for the initial velocities
    #[arg(short, long)]
    seed: Option<u64>,

    /// Containment radius around the origin
    #[arg(long)]
    bound_radius: Option<f64>,

    /// Run without a window
    #[arg(long)]
    headless: bool,

    /// Simulation ticks to run in headless mode
    #[arg(long, default_value_t = 600)]
    steps: u64,

    /// Log flock statistics every N headless ticks (0 disables)
    #[arg(long, default_value_t = 100)]
    report_every: u64,

    /// Run the update on a single thread
    #[arg(long)]
    no_parallel: bool,
}

impl Args {
    // File values first, then command line overrides
    fn params(&self) -> Result<SimulationParams> {
        let mut params = match &self.config {
            Some(path) => SimulationParams::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SimulationParams::default(),
        };

        if let Some(population) = self.population {
            params.population = population;
        }
        if self.seed.is_some() {
            params.seed = self.seed;
        }
        if self.bound_radius.is_some() {
            params.bound_radius = self.bound_radius;
        }
        if self.no_parallel {
            params.flocking.parallel = false;
        }

        params.validate().context("invalid simulation parameters")?;
        Ok(params)
    }
}

fn run_headless(params: &SimulationParams, steps: u64, report_every: u64) -> Result<()> {
    let mut rng = match params.seed {
        Some(seed) => ChaCha12Rng::seed_from_u64(seed),
        None => ChaCha12Rng::from_entropy(),
    };
    let mut flock = Flock::new(
        params.population,
        params.start_center,
        params.bound_radius(),
        params.flocking,
        &mut rng,
    )
    .context("building flock")?;

    let dt = params.timestep();
    let mut timer = Timer::new();
    let mut poses: Vec<Pose> = Vec::with_capacity(flock.len());

    info!(steps, dt, population = flock.len(), "headless run started");
    for step in 1..=steps {
        timer.time("flock.update", || flock.update(dt));
        timer.time("flock.draw", || flock.draw(&mut poses));

        if report_every > 0 && step % report_every == 0 {
            let stats = flock.stats();
            info!(
                tick = stats.tick,
                mean_speed = stats.mean_speed,
                outside_bound = stats.outside_bound,
                centroid_x = stats.centroid.x,
                centroid_y = stats.centroid.y,
                "flock stats"
            );
        }
    }

    let stats = flock.stats();
    info!(
        tick = stats.tick,
        mean_speed = stats.mean_speed,
        min_speed = stats.min_speed,
        max_speed = stats.max_speed,
        outside_bound = stats.outside_bound,
        "headless run finished"
    );
    timer.report();
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flox=info")),
        )
        .init();

    let args = Args::parse();
    let params = args.params()?;

    if args.headless {
        run_headless(&params, args.steps, args.report_every)
    } else {
        flox::app::launch(params).context("starting simulation window")
    }
}
