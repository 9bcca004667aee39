/*
 * Application Module
 *
 * This module defines the main application model and the nannou callbacks.
 * It handles initialization, the fixed-timestep update loop, and hands each
 * frame's poses from the flock to the renderer.
 *
 * The simulation always advances in fixed ticks of dt = 1 / tick_rate.
 * Wall time is accumulated between frames and drained one tick at a time,
 * capped per frame so a stall cannot snowball into ever longer frames.
 */

use std::sync::Mutex;
use std::time::Duration;

use nannou::prelude::*;
use nannou_egui::Egui;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use tracing::{debug, info};

use crate::debug::DebugInfo;
use crate::error::FlockError;
use crate::flock::Flock;
use crate::input;
use crate::params::SimulationParams;
use crate::renderer::{self, PoseBuffer};
use crate::timer::Timer;
use crate::ui;
use crate::world::World;

/// Upper bound on simulation ticks run inside a single frame.
pub const MAX_TICKS_PER_FRAME: usize = 8;

// Main model for the application
pub struct Model {
    pub flock: Flock,
    pub params: SimulationParams,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub world: World,
    pub pose_buffer: PoseBuffer,
    pub rng: ChaCha12Rng,
    pub mouse_position: Vec2,
    pub physics_accumulator: Duration,
    pub physics_step_size: Duration,
}

// Everything the window needs, prepared before the event loop starts
struct Launch {
    params: SimulationParams,
    flock: Flock,
    rng: ChaCha12Rng,
}

// nannou's model callback takes no arguments, so launch state is parked here
static LAUNCH: Mutex<Option<Launch>> = Mutex::new(None);

fn prepare(params: SimulationParams) -> Result<Launch, FlockError> {
    params.validate()?;
    let mut rng = match params.seed {
        Some(seed) => ChaCha12Rng::seed_from_u64(seed),
        None => ChaCha12Rng::from_entropy(),
    };
    let flock = Flock::new(
        params.population,
        params.start_center,
        params.bound_radius(),
        params.flocking,
        &mut rng,
    )?;
    Ok(Launch { params, flock, rng })
}

/// Validate `params`, build the flock and run the windowed simulation.
///
/// Returns once the window is closed.
pub fn launch(params: SimulationParams) -> Result<(), FlockError> {
    let prepared = prepare(params)?;
    if let Ok(mut slot) = LAUNCH.lock() {
        *slot = Some(prepared);
    }
    nannou::app(model).update(update).run();
    Ok(())
}

// Initialize the model
pub fn model(app: &App) -> Model {
    let parked = LAUNCH.lock().ok().and_then(|mut slot| slot.take());
    let Launch { params, flock, rng } = match parked {
        Some(launch) => launch,
        None => prepare(SimulationParams::default()).expect("default parameters are valid"),
    };

    let window_id = app
        .new_window()
        .title("Flox")
        .size(params.window_width, params.window_height)
        .view(renderer::view)
        .resized(input::resized)
        .key_pressed(input::key_pressed)
        .mouse_moved(input::mouse_moved)
        .mouse_pressed(input::mouse_pressed)
        .mouse_released(input::mouse_released)
        .mouse_wheel(input::mouse_wheel)
        .raw_event(input::raw_window_event)
        .build()
        .expect("Failed to create window");

    let window = app.window(window_id).expect("window was just created");
    let egui = Egui::from_window(&window);

    let mut world = World::new(params.window_width as f32, params.window_height as f32);
    let (width, height) = window.inner_size_points();
    world.set(width, height);

    let mut pose_buffer = PoseBuffer::with_capacity(flock.len());
    flock.draw(&mut pose_buffer);

    info!(
        population = flock.len(),
        bound_radius = flock.bound_radius(),
        tick_rate = params.tick_rate,
        "simulation window ready"
    );

    Model {
        physics_step_size: Duration::from_secs_f64(params.timestep()),
        flock,
        params,
        egui,
        debug_info: DebugInfo::default(),
        world,
        pose_buffer,
        rng,
        mouse_position: Vec2::ZERO,
        physics_accumulator: Duration::ZERO,
    }
}

impl Model {
    pub fn reset_flock(&mut self) {
        self.flock.reset(&mut self.rng);
        self.flock.draw(&mut self.pose_buffer);
        self.physics_accumulator = Duration::ZERO;
    }

    // Push UI edits into the flock
    fn apply_ui(&mut self, response: ui::UiResponse) {
        if response.changes.population_changed {
            if let Err(err) = self.flock.resize(self.params.population, &mut self.rng) {
                tracing::warn!(%err, "population change rejected");
                self.params.population = self.flock.len();
            }
        }
        if response.changes.flocking_changed {
            if let Err(err) = self.flock.set_params(self.params.flocking) {
                tracing::warn!(%err, "parameter change rejected");
                self.params.flocking = *self.flock.params();
            }
        }
        if response.reset_requested {
            self.reset_flock();
        }
    }

    fn advance(&mut self, elapsed: Duration) -> usize {
        if self.params.pause_simulation {
            self.physics_accumulator = Duration::ZERO;
            return 0;
        }
        drain_ticks(
            &mut self.flock,
            &mut self.debug_info.timer,
            &mut self.physics_accumulator,
            self.physics_step_size,
            self.params.timestep(),
            elapsed,
        )
    }
}

// Run every whole tick that has accumulated, up to the per-frame cap.
// `step` only paces the accumulator; the flock always advances by the exact `dt`.
fn drain_ticks(
    flock: &mut Flock,
    timer: &mut Timer,
    accumulator: &mut Duration,
    step: Duration,
    dt: f64,
    elapsed: Duration,
) -> usize {
    *accumulator += elapsed;
    let mut ticks = 0;
    while *accumulator >= step && ticks < MAX_TICKS_PER_FRAME {
        timer.time("flock.update", || flock.update(dt));
        *accumulator -= step;
        ticks += 1;
    }

    if *accumulator >= step {
        debug!(backlog = ?*accumulator, "dropping simulation backlog");
        *accumulator = Duration::ZERO;
    }
    ticks
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    model.egui.set_elapsed_time(update.since_start);
    let response = ui::update_ui(&mut model.egui, &mut model.params, &model.debug_info);
    model.apply_ui(response);

    model.debug_info.ticks_per_frame = model.advance(update.since_last);

    let Model { flock, pose_buffer, debug_info, .. } = model;
    debug_info.timer.time("flock.draw", || flock.draw(pose_buffer));
    debug_info.stats = flock.stats();
}
