/*
 * Simulation Parameters Module
 *
 * This module defines the parameters for the flocking simulation.
 *
 * - FlockingParams: the tunables the Flock itself reads every frame
 *   (steering limits, perception ranges, rule weights, boundary softening).
 * - SimulationParams: FlockingParams plus the application settings
 *   (population, seed, tick rate, window size, bound radius).
 *
 * Both can be loaded from TOML, where every key is optional, and adjusted
 * through the UI. SimulationParams also provides change detection so the
 * app knows when the flock needs to be rebuilt or re-tuned.
 */

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, FlockError};
use crate::vector::Vector2;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockingParams {
    /// Cruise speed every boid steers toward, in world units per second.
    pub max_speed: f64,
    /// Upper bound on each individual steering force.
    pub max_force: f64,
    pub align_range: f64,
    pub cohesion_range: f64,
    pub separation_range: f64,
    /// Steering rules are divided by their weight before being applied.
    pub align_weight: f64,
    pub cohesion_weight: f64,
    pub separation_weight: f64,
    /// Divisor for the pull back toward the origin outside the bound.
    pub boundary_softening: f64,
    /// Speed regulation is limited to `max_force * cruise_force_scale`.
    pub cruise_force_scale: f64,
    /// Run the distance and steering phases on the rayon pool.
    pub parallel: bool,
}

impl Default for FlockingParams {
    fn default() -> Self {
        Self {
            max_speed: 100.0,
            max_force: 10.0,
            align_range: 70.0,
            cohesion_range: 70.0,
            separation_range: 25.0,
            align_weight: 4.0,
            cohesion_weight: 16.0,
            separation_weight: 2.0,
            boundary_softening: 1.5,
            cruise_force_scale: 0.5,
            parallel: true,
        }
    }
}

impl FlockingParams {
    pub fn validate(&self) -> Result<(), FlockError> {
        let positive = [
            ("max_speed", self.max_speed),
            ("max_force", self.max_force),
            ("align_range", self.align_range),
            ("cohesion_range", self.cohesion_range),
            ("separation_range", self.separation_range),
            ("align_weight", self.align_weight),
            ("cohesion_weight", self.cohesion_weight),
            ("separation_weight", self.separation_weight),
            ("boundary_softening", self.boundary_softening),
            ("cruise_force_scale", self.cruise_force_scale),
        ];
        for (name, actual) in positive {
            if !(actual.is_finite() && actual > 0.0) {
                return Err(FlockError::InvalidParameter { name, actual });
            }
        }
        Ok(())
    }

    pub fn get_speed_range() -> std::ops::RangeInclusive<f64> {
        10.0..=400.0
    }

    pub fn get_force_range() -> std::ops::RangeInclusive<f64> {
        0.5..=50.0
    }

    pub fn get_range_range() -> std::ops::RangeInclusive<f64> {
        5.0..=200.0
    }

    pub fn get_weight_range() -> std::ops::RangeInclusive<f64> {
        0.5..=32.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub population: usize,
    /// Seed for the initial velocities. `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Fixed simulation ticks per second.
    pub tick_rate: f64,
    pub window_width: u32,
    pub window_height: u32,
    /// Containment radius around the origin. `None` derives it from the window.
    pub bound_radius: Option<f64>,
    pub start_center: Vector2,
    pub flocking: FlockingParams,
    pub show_debug: bool,
    pub pause_simulation: bool,

    // Internal state for tracking changes
    #[serde(skip)]
    previous_values: Option<ParamSnapshot>,
}

// A snapshot of parameter values used for change detection
#[derive(Clone, Debug, PartialEq)]
struct ParamSnapshot {
    population: usize,
    flocking: FlockingParams,
    show_debug: bool,
    pause_simulation: bool,
}

/// What changed between two UI frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParamChanges {
    pub population_changed: bool,
    pub flocking_changed: bool,
    pub any_changed: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            population: 50,
            seed: None,
            tick_rate: 30.0,
            window_width: 960,
            window_height: 720,
            bound_radius: None,
            start_center: Vector2::ZERO,
            flocking: FlockingParams::default(),
            show_debug: false,
            pause_simulation: false,
            previous_values: None,
        }
    }
}

impl SimulationParams {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let params: SimulationParams = toml::from_str(source)?;
        params.validate()?;
        Ok(params)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), FlockError> {
        if self.population == 0 {
            return Err(FlockError::EmptyPopulation);
        }
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return Err(FlockError::InvalidParameter {
                name: "tick_rate",
                actual: self.tick_rate,
            });
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(FlockError::InvalidParameter {
                name: "window size",
                actual: self.window_width.min(self.window_height) as f64,
            });
        }
        let radius = self.bound_radius();
        if !(radius.is_finite() && radius > 0.0) {
            return Err(FlockError::InvalidBoundRadius { actual: radius });
        }
        self.flocking.validate()
    }

    // Explicit radius, or a third of the shorter window side
    pub fn bound_radius(&self) -> f64 {
        self.bound_radius
            .unwrap_or_else(|| self.window_width.min(self.window_height) as f64 / 3.0)
    }

    pub fn timestep(&self) -> f64 {
        1.0 / self.tick_rate
    }

    // Take a snapshot of current parameter values for change detection
    pub fn take_snapshot(&mut self) {
        self.previous_values = Some(ParamSnapshot {
            population: self.population,
            flocking: self.flocking,
            show_debug: self.show_debug,
            pause_simulation: self.pause_simulation,
        });
    }

    // Compare against the last snapshot; nothing has changed without one
    pub fn detect_changes(&self) -> ParamChanges {
        let Some(prev) = &self.previous_values else {
            return ParamChanges::default();
        };

        let population_changed = self.population != prev.population;
        let flocking_changed = self.flocking != prev.flocking;
        let any_changed = population_changed
            || flocking_changed
            || self.show_debug != prev.show_debug
            || self.pause_simulation != prev.pause_simulation;

        ParamChanges {
            population_changed,
            flocking_changed,
            any_changed,
        }
    }

    pub fn get_population_range() -> std::ops::RangeInclusive<usize> {
        1..=2000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = SimulationParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.flocking.separation_range, 25.0);
        assert_eq!(params.bound_radius(), 240.0);
        assert!((params.timestep() - 1.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn partial_toml_overrides_defaults() {
        let params = SimulationParams::from_toml_str(
            r#"
            population = 12
            seed = 7
            bound_radius = 150.0
            start_center = { x = 5.0, y = -5.0 }

            [flocking]
            separation_range = 20.0
            align_weight = 8.0
            "#,
        )
        .unwrap();

        assert_eq!(params.population, 12);
        assert_eq!(params.seed, Some(7));
        assert_eq!(params.bound_radius(), 150.0);
        assert_eq!(params.start_center, Vector2::new(5.0, -5.0));
        assert_eq!(params.flocking.separation_range, 20.0);
        assert_eq!(params.flocking.align_weight, 8.0);
        assert_eq!(params.flocking.cohesion_weight, 16.0);
        assert_eq!(params.tick_rate, 30.0);
    }

    #[test]
    fn empty_population_is_rejected() {
        let err = SimulationParams::from_toml_str("population = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(FlockError::EmptyPopulation)));
    }

    #[test]
    fn non_positive_weight_is_rejected() {
        let err = SimulationParams::from_toml_str("[flocking]\ncohesion_weight = 0.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(FlockError::InvalidParameter { name: "cohesion_weight", .. })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = SimulationParams::from_toml_str("population = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SimulationParams::load(Path::new("/nonexistent/flox.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn change_detection() {
        let mut params = SimulationParams::default();
        assert_eq!(params.detect_changes(), ParamChanges::default());

        params.take_snapshot();
        assert!(!params.detect_changes().any_changed);

        params.flocking.align_weight = 6.0;
        let changes = params.detect_changes();
        assert!(changes.flocking_changed);
        assert!(!changes.population_changed);
        assert!(changes.any_changed);

        params.take_snapshot();
        params.population = 80;
        let changes = params.detect_changes();
        assert!(changes.population_changed);
        assert!(!changes.flocking_changed);

        params.take_snapshot();
        params.show_debug = true;
        let changes = params.detect_changes();
        assert!(changes.any_changed);
        assert!(!changes.flocking_changed);
    }
}
