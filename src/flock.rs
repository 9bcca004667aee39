/*
 * Flock Module
 *
 * This module owns the boid population and the per-frame update:
 * 1. Snapshot every boid as of the start of the frame
 * 2. Fill the pairwise squared distance table from the snapshot
 * 3. For each boid: integrate, add boundary containment and speed
 *    regulation, select neighbors from the table, add the weighted
 *    alignment / cohesion / separation forces, and record its pose
 *
 * Neighbor rules only ever read the snapshot, so the result does not depend
 * on the order boids are processed in. That is what lets step 3 run on the
 * rayon pool with output identical to the sequential path.
 */

use std::collections::HashSet;
use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::boid::Boid;
use crate::distance::DistanceTable;
use crate::error::FlockError;
use crate::params::FlockingParams;
use crate::pose::{Pose, PoseSink};
use crate::vector::Vector2;

/// Radius of the ring new boids are placed on.
pub const SPAWN_RADIUS: f64 = 100.0;

#[derive(Clone, Debug)]
pub struct Flock {
    boids: Vec<Boid>,
    snapshot: Vec<Boid>,
    distances: DistanceTable,
    poses: Vec<Pose>,
    bound_radius: f64,
    start: Vector2,
    params: FlockingParams,
    tick: u64,
}

/// Aggregate state of the population, for the debug overlay and logs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlockStats {
    pub population: usize,
    pub tick: u64,
    pub mean_speed: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    pub centroid: Vector2,
    /// Boids currently farther from the origin than the bound radius.
    pub outside_bound: usize,
}

fn check_bound_radius(radius: f64) -> Result<(), FlockError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(FlockError::InvalidBoundRadius { actual: radius })
    }
}

// Evenly spaced around `start`, each heading in a random direction at cruise speed
fn spawn_ring<R: Rng + ?Sized>(
    count: usize,
    start: Vector2,
    params: &FlockingParams,
    rng: &mut R,
) -> Vec<Boid> {
    (0..count)
        .map(|id| {
            let angle = TAU * id as f64 / count as f64;
            let position = start + Vector2::from_polar(SPAWN_RADIUS, angle);
            let velocity = Vector2::from_random(rng, params.max_speed);
            let mut boid = Boid::new(id, position, velocity);
            boid.apply_limits(params);
            boid
        })
        .collect()
}

// A rule divided by its weight; a zero weight contributes nothing
#[inline]
fn weighted(force: Vector2, weight: f64) -> Vector2 {
    force.checked_div(weight).unwrap_or(Vector2::ZERO)
}

// Neighbor lists for one boid, reused across boids to avoid per-boid allocation
#[derive(Default)]
struct Neighbors<'a> {
    align: Vec<&'a Boid>,
    cohere: Vec<&'a Boid>,
    separate: Vec<&'a Boid>,
}

impl<'a> Neighbors<'a> {
    // Strict `<` against each squared range
    fn select(&mut self, index: usize, snapshot: &'a [Boid], row: &[f64], params: &FlockingParams) {
        let align_sq = params.align_range * params.align_range;
        let cohesion_sq = params.cohesion_range * params.cohesion_range;
        let separation_sq = params.separation_range * params.separation_range;

        self.align.clear();
        self.cohere.clear();
        self.separate.clear();
        for (j, (other, &d2)) in snapshot.iter().zip(row).enumerate() {
            if j == index {
                continue;
            }
            if d2 < align_sq {
                self.align.push(other);
            }
            if d2 < cohesion_sq {
                self.cohere.push(other);
            }
            if d2 < separation_sq {
                self.separate.push(other);
            }
        }
    }
}

// One boid's share of the update. Reads only the frame-start snapshot.
#[allow(clippy::too_many_arguments)]
fn step_boid<'a>(
    index: usize,
    boid: &mut Boid,
    neighbors: &mut Neighbors<'a>,
    snapshot: &'a [Boid],
    distances: &DistanceTable,
    params: &FlockingParams,
    bound_radius: f64,
    dt: f64,
) -> Pose {
    neighbors.select(index, snapshot, distances.row(index), params);

    let before = &snapshot[index];
    let alignment = before.alignment(&neighbors.align);
    let cohesion = before.cohesion(&neighbors.cohere);
    let separation = before.separation(&neighbors.separate);

    boid.integrate(dt);

    // stay near the origin
    if boid.position.magnitude_squared() > bound_radius * bound_radius {
        boid.apply_force(weighted(boid.seek(Vector2::ZERO), params.boundary_softening));
    }

    boid.apply_force(boid.cruise(params.max_force * params.cruise_force_scale));

    boid.apply_force(weighted(alignment, params.align_weight));
    boid.apply_force(weighted(cohesion, params.cohesion_weight));
    boid.apply_force(weighted(separation, params.separation_weight));

    boid.pose()
}

impl Flock {
    /// Create `count` boids on a ring around `start`.
    ///
    /// Initial headings come from `rng`; pass a seeded generator (or use
    /// [`Flock::seeded`]) for reproducible runs.
    pub fn new<R: Rng + ?Sized>(
        count: usize,
        start: Vector2,
        bound_radius: f64,
        params: FlockingParams,
        rng: &mut R,
    ) -> Result<Self, FlockError> {
        if count == 0 {
            return Err(FlockError::EmptyPopulation);
        }
        check_bound_radius(bound_radius)?;
        params.validate()?;

        let boids = spawn_ring(count, start, &params, rng);
        info!(count, bound_radius, "flock created");
        Ok(Self::assemble(boids, start, bound_radius, params))
    }

    pub fn seeded(
        count: usize,
        start: Vector2,
        bound_radius: f64,
        params: FlockingParams,
        seed: u64,
    ) -> Result<Self, FlockError> {
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        Self::new(count, start, bound_radius, params, &mut rng)
    }

    /// Build a flock from explicitly placed boids.
    ///
    /// Boid ids must be unique. Steering limits are overwritten from `params`.
    pub fn from_boids(
        mut boids: Vec<Boid>,
        bound_radius: f64,
        params: FlockingParams,
    ) -> Result<Self, FlockError> {
        if boids.is_empty() {
            return Err(FlockError::EmptyPopulation);
        }
        check_bound_radius(bound_radius)?;
        params.validate()?;

        let mut seen = HashSet::with_capacity(boids.len());
        for boid in &mut boids {
            if !seen.insert(boid.id()) {
                return Err(FlockError::DuplicateId { id: boid.id() });
            }
            boid.apply_limits(&params);
        }
        Ok(Self::assemble(boids, Vector2::ZERO, bound_radius, params))
    }

    fn assemble(boids: Vec<Boid>, start: Vector2, bound_radius: f64, params: FlockingParams) -> Self {
        let count = boids.len();
        let poses = boids.iter().map(Boid::pose).collect();
        Self {
            snapshot: Vec::with_capacity(count),
            distances: DistanceTable::new(count),
            poses,
            boids,
            bound_radius,
            start,
            params,
            tick: 0,
        }
    }

    // Re-seed the current population on a fresh ring
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let count = self.boids.len();
        self.rebuild(count, rng);
        info!(count, "flock reset");
    }

    pub fn resize<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Result<(), FlockError> {
        if count == 0 {
            return Err(FlockError::EmptyPopulation);
        }
        self.rebuild(count, rng);
        info!(count, "flock resized");
        Ok(())
    }

    fn rebuild<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        self.boids = spawn_ring(count, self.start, &self.params, rng);
        self.distances.resize(count);
        self.poses = self.boids.iter().map(Boid::pose).collect();
        self.snapshot.clear();
        self.tick = 0;
    }

    pub fn set_params(&mut self, params: FlockingParams) -> Result<(), FlockError> {
        params.validate()?;
        for boid in &mut self.boids {
            boid.apply_limits(&params);
        }
        self.params = params;
        Ok(())
    }

    pub fn set_bound_radius(&mut self, bound_radius: f64) -> Result<(), FlockError> {
        check_bound_radius(bound_radius)?;
        self.bound_radius = bound_radius;
        Ok(())
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn bound_radius(&self) -> f64 {
        self.bound_radius
    }

    pub fn params(&self) -> &FlockingParams {
        &self.params
    }

    pub fn distances(&self) -> &DistanceTable {
        &self.distances
    }

    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advance the whole population by one frame of `dt` seconds.
    ///
    /// A non-finite or non-positive `dt` skips the frame.
    pub fn update(&mut self, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            warn!(dt, "skipping flock update with invalid timestep");
            return;
        }

        self.snapshot.clear();
        self.snapshot.extend_from_slice(&self.boids);

        let positions: Vec<Vector2> = self.snapshot.iter().map(|boid| boid.position).collect();
        if self.params.parallel {
            self.distances.compute_parallel(&positions);
        } else {
            self.distances.compute(&positions);
        }

        let snapshot = &self.snapshot;
        let distances = &self.distances;
        let params = &self.params;
        let bound_radius = self.bound_radius;

        if params.parallel {
            self.boids
                .par_iter_mut()
                .zip(self.poses.par_iter_mut())
                .enumerate()
                .for_each_init(Neighbors::default, |neighbors, (i, (boid, pose))| {
                    *pose = step_boid(i, boid, neighbors, snapshot, distances, params, bound_radius, dt);
                });
        } else {
            let mut neighbors = Neighbors::default();
            for (i, (boid, pose)) in self.boids.iter_mut().zip(self.poses.iter_mut()).enumerate() {
                *pose = step_boid(i, boid, &mut neighbors, snapshot, distances, params, bound_radius, dt);
            }
        }

        self.tick += 1;
    }

    // Hand this frame's poses to the renderer
    pub fn draw<S: PoseSink + ?Sized>(&self, sink: &mut S) {
        sink.submit(&self.poses);
    }

    pub fn stats(&self) -> FlockStats {
        let population = self.boids.len();
        let mut stats = FlockStats {
            population,
            tick: self.tick,
            min_speed: f64::INFINITY,
            ..FlockStats::default()
        };

        let bound_sq = self.bound_radius * self.bound_radius;
        let mut speed_sum = 0.0;
        let mut position_sum = Vector2::ZERO;
        for boid in &self.boids {
            let speed = boid.velocity.magnitude();
            speed_sum += speed;
            stats.min_speed = stats.min_speed.min(speed);
            stats.max_speed = stats.max_speed.max(speed);
            position_sum += boid.position;
            if boid.position.magnitude_squared() > bound_sq {
                stats.outside_bound += 1;
            }
        }

        if population > 0 {
            stats.mean_speed = speed_sum / population as f64;
            stats.centroid = position_sum.checked_div(population as f64).unwrap_or(Vector2::ZERO);
        } else {
            stats.min_speed = 0.0;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn still(id: usize, x: f64, y: f64) -> Boid {
        Boid::new(id, Vector2::new(x, y), Vector2::ZERO)
    }

    #[test]
    fn construction_rejects_bad_arguments() {
        let params = FlockingParams::default();
        assert_eq!(
            Flock::seeded(0, Vector2::ZERO, 100.0, params, 1).unwrap_err(),
            FlockError::EmptyPopulation
        );
        assert!(matches!(
            Flock::seeded(5, Vector2::ZERO, 0.0, params, 1),
            Err(FlockError::InvalidBoundRadius { .. })
        ));
        assert!(matches!(
            Flock::seeded(5, Vector2::ZERO, f64::NAN, params, 1),
            Err(FlockError::InvalidBoundRadius { .. })
        ));
        let bad = FlockingParams { max_speed: -1.0, ..params };
        assert!(matches!(
            Flock::seeded(5, Vector2::ZERO, 100.0, bad, 1),
            Err(FlockError::InvalidParameter { name: "max_speed", .. })
        ));
        assert_eq!(
            Flock::from_boids(vec![still(1, 0.0, 0.0), still(1, 5.0, 0.0)], 100.0, params).unwrap_err(),
            FlockError::DuplicateId { id: 1 }
        );
        assert_eq!(
            Flock::from_boids(Vec::new(), 100.0, params).unwrap_err(),
            FlockError::EmptyPopulation
        );
    }

    #[test]
    fn boids_spawn_evenly_on_a_ring() {
        let start = Vector2::new(20.0, -10.0);
        let flock = Flock::seeded(8, start, 300.0, FlockingParams::default(), 5).unwrap();
        assert_eq!(flock.len(), 8);

        for (k, boid) in flock.boids().iter().enumerate() {
            assert_eq!(boid.id(), k);
            let offset = boid.position - start;
            assert!((offset.magnitude() - SPAWN_RADIUS).abs() < EPS);
            let expected = Vector2::from_polar(SPAWN_RADIUS, TAU * k as f64 / 8.0);
            assert!(offset.distance_to(&expected) < EPS);
            assert!((boid.velocity.magnitude() - Boid::MAX_SPEED).abs() < EPS);
            assert_eq!(boid.acceleration, Vector2::ZERO);
        }
    }

    #[test]
    fn distances_reflect_frame_start_positions() {
        let boids = vec![
            Boid::new(0, Vector2::new(0.0, 0.0), Vector2::new(100.0, 0.0)),
            Boid::new(1, Vector2::new(30.0, 40.0), Vector2::new(0.0, 100.0)),
        ];
        let mut flock = Flock::from_boids(boids, 1000.0, FlockingParams::default()).unwrap();
        flock.update(0.1);

        // positions moved during the update, the table did not follow
        assert_eq!(flock.distances().get(0, 1), 2500.0);
        assert_eq!(flock.distances().get(1, 0), 2500.0);
        assert_ne!(flock.boids()[0].position, Vector2::ZERO);
    }

    #[test]
    fn update_is_independent_of_population_order() {
        let forward = vec![
            Boid::new(0, Vector2::new(0.0, 0.0), Vector2::new(50.0, 10.0)),
            Boid::new(1, Vector2::new(12.0, 3.0), Vector2::new(-20.0, 40.0)),
            Boid::new(2, Vector2::new(-8.0, 15.0), Vector2::new(5.0, -60.0)),
        ];
        let reversed: Vec<Boid> = forward.iter().rev().copied().collect();
        let params = FlockingParams { parallel: false, ..FlockingParams::default() };

        let mut a = Flock::from_boids(forward, 200.0, params).unwrap();
        let mut b = Flock::from_boids(reversed, 200.0, params).unwrap();
        for _ in 0..5 {
            a.update(1.0 / 30.0);
            b.update(1.0 / 30.0);
        }

        for boid in a.boids() {
            let twin = b.boids().iter().find(|other| other.id() == boid.id()).unwrap();
            assert!(boid.position.distance_to(&twin.position) < 1e-9);
            assert!(boid.velocity.distance_to(&twin.velocity) < 1e-9);
        }
    }

    #[test]
    fn isolated_cruising_boid_keeps_its_velocity() {
        let boid = Boid::new(0, Vector2::ZERO, Vector2::new(100.0, 0.0));
        let mut flock = Flock::from_boids(vec![boid], 500.0, FlockingParams::default()).unwrap();
        flock.update(0.5);
        let boid = flock.boids()[0];
        assert!((boid.position.x - 50.0).abs() < EPS);
        assert!(boid.acceleration.magnitude() < EPS);
    }

    #[test]
    fn acceleration_is_rebuilt_every_frame() {
        let mut boid = Boid::new(0, Vector2::ZERO, Vector2::new(100.0, 0.0));
        boid.acceleration = Vector2::new(0.0, 40.0);
        let mut flock = Flock::from_boids(vec![boid], 500.0, FlockingParams::default()).unwrap();
        flock.update(0.1);

        let boid = flock.boids()[0];
        assert_eq!(boid.velocity.y, 40.0);
        // only the cruise term is left, nothing of the stale 40
        let cruise_limit = Boid::MAX_FORCE * 0.5;
        assert!(boid.acceleration.magnitude() <= cruise_limit + EPS);
    }

    #[test]
    fn poses_follow_the_update() {
        let mut flock = Flock::seeded(6, Vector2::ZERO, 200.0, FlockingParams::default(), 9).unwrap();
        flock.update(1.0 / 30.0);

        let mut sink: Vec<Pose> = Vec::new();
        flock.draw(&mut sink);
        assert_eq!(sink.len(), 6);
        for (pose, boid) in sink.iter().zip(flock.boids()) {
            assert_eq!(*pose, boid.pose());
        }
    }

    #[test]
    fn invalid_timestep_skips_the_frame() {
        let mut flock = Flock::seeded(4, Vector2::ZERO, 200.0, FlockingParams::default(), 2).unwrap();
        let before: Vec<Boid> = flock.boids().to_vec();
        flock.update(0.0);
        flock.update(-1.0);
        flock.update(f64::NAN);
        assert_eq!(flock.boids(), &before[..]);
        assert_eq!(flock.tick(), 0);
    }

    #[test]
    fn resize_and_reset_rebuild_the_ring() {
        let mut rng = ChaCha12Rng::seed_from_u64(4);
        let mut flock = Flock::new(3, Vector2::ZERO, 200.0, FlockingParams::default(), &mut rng).unwrap();
        flock.update(0.1);

        flock.resize(10, &mut rng).unwrap();
        assert_eq!(flock.len(), 10);
        assert_eq!(flock.poses().len(), 10);
        assert_eq!(flock.tick(), 0);
        flock.update(0.1);
        assert_eq!(flock.distances().len(), 10);

        flock.reset(&mut rng);
        assert_eq!(flock.len(), 10);
        assert!((flock.boids()[0].position.x - SPAWN_RADIUS).abs() < EPS);

        assert_eq!(flock.resize(0, &mut rng).unwrap_err(), FlockError::EmptyPopulation);
    }

    #[test]
    fn set_params_updates_boid_limits() {
        let mut flock = Flock::seeded(3, Vector2::ZERO, 200.0, FlockingParams::default(), 1).unwrap();
        let params = FlockingParams { max_speed: 50.0, max_force: 3.0, ..FlockingParams::default() };
        flock.set_params(params).unwrap();
        assert!(flock.boids().iter().all(|b| b.max_speed == 50.0 && b.max_force == 3.0));

        let bad = FlockingParams { separation_weight: 0.0, ..params };
        assert!(flock.set_params(bad).is_err());
        assert_eq!(flock.params().max_speed, 50.0);

        assert!(flock.set_bound_radius(-3.0).is_err());
        flock.set_bound_radius(50.0).unwrap();
        assert_eq!(flock.bound_radius(), 50.0);
    }

    #[test]
    fn stats_summarize_the_population() {
        let boids = vec![
            Boid::new(0, Vector2::new(-10.0, 0.0), Vector2::new(3.0, 4.0)),
            Boid::new(1, Vector2::new(200.0, 0.0), Vector2::new(0.0, 10.0)),
        ];
        let flock = Flock::from_boids(boids, 100.0, FlockingParams::default()).unwrap();
        let stats = flock.stats();
        assert_eq!(stats.population, 2);
        assert_eq!(stats.outside_bound, 1);
        assert_eq!(stats.min_speed, 5.0);
        assert_eq!(stats.max_speed, 10.0);
        assert_eq!(stats.mean_speed, 7.5);
        assert_eq!(stats.centroid, Vector2::new(95.0, 0.0));
    }

    // Acceleration of boid 0 after one update against a single neighbor at (x, 0)
    fn pull_from(x: f64, neighbor_velocity: Vector2, params: FlockingParams) -> Vector2 {
        let boids = vec![still(0, 0.0, 0.0), Boid::new(1, Vector2::new(x, 0.0), neighbor_velocity)];
        let mut flock = Flock::from_boids(boids, 1000.0, params).unwrap();
        flock.update(1.0 / 30.0);
        flock.boids()[0].acceleration
    }

    fn assert_close(actual: Vector2, expected: Vector2) {
        assert!(actual.distance_to(&expected) < EPS, "{actual:?} != {expected:?}");
    }

    #[test]
    fn neighbor_ranges_are_strict() {
        let params = FlockingParams::default();

        // exactly at separation_range: cohesion only
        assert_close(pull_from(25.0, Vector2::ZERO, params), Vector2::new(0.625, 0.0));
        // just inside: separation (10 / 2) against cohesion (10 / 16)
        assert_close(pull_from(24.999, Vector2::ZERO, params), Vector2::new(0.625 - 5.0, 0.0));
        // between separation and align range: no push
        assert_close(pull_from(50.0, Vector2::ZERO, params), Vector2::new(0.625, 0.0));
        // exactly at align and cohesion range: nothing
        assert_close(pull_from(70.0, Vector2::new(0.0, 50.0), params), Vector2::ZERO);
    }

    #[test]
    fn cohesion_and_alignment_use_their_own_ranges() {
        let moving = Vector2::new(0.0, 50.0);

        let narrow_cohesion = FlockingParams {
            cohesion_range: 30.0,
            ..FlockingParams::default()
        };
        // aligns with the neighbor (10 / 4) but does not approach it
        assert_close(pull_from(40.0, moving, narrow_cohesion), Vector2::new(0.0, 2.5));

        let narrow_alignment = FlockingParams {
            align_range: 30.0,
            ..FlockingParams::default()
        };
        assert_close(pull_from(40.0, moving, narrow_alignment), Vector2::new(0.625, 0.0));
    }
}
