/*
 * Flox - Boid Flocking Simulation - Module Definitions
 *
 * The simulation core (vector, boid, distance, flock, pose, params, error,
 * timer) has no windowing dependencies. The remaining modules wire it into
 * a nannou window with an egui control panel.
 */

// Re-export key components for easier access
pub use boid::Boid;
pub use distance::DistanceTable;
pub use error::{ConfigError, FlockError, VectorError};
pub use flock::{Flock, FlockStats};
pub use params::{FlockingParams, SimulationParams};
pub use pose::{Pose, PoseSink};
pub use timer::Timer;
pub use vector::Vector2;
pub use world::World;
pub use app::Model;

// Define modules
pub mod vector;
pub mod error;
pub mod params;
pub mod boid;
pub mod distance;
pub mod pose;
pub mod flock;
pub mod timer;
pub mod world;
pub mod debug;
pub mod app;
pub mod ui;
pub mod renderer;
pub mod input;

// Constants
/// Render radius of a boid triangle, in world units.
pub const BOID_SIZE: f32 = 10.0;
