/*
 * Boid Module
 *
 * This module defines the Boid struct and its steering behavior.
 * Each boid follows three local rules plus a seek rule:
 * 1. Separation: Avoid crowding neighbors
 * 2. Alignment: Steer towards the average heading of neighbors
 * 3. Cohesion: Steer towards the average position of neighbors
 * 4. Seek: Steer towards a target point (used for boundary containment)
 *
 * Every rule produces a Reynolds steering force: the desired velocity at
 * cruise speed minus the current velocity, limited to max_force.
 * Neighbor lists are range-filtered by the caller.
 */

use crate::params::FlockingParams;
use crate::pose::Pose;
use crate::vector::Vector2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boid {
    id: usize,
    pub position: Vector2,
    pub velocity: Vector2,
    pub acceleration: Vector2,
    pub max_speed: f64,
    pub max_force: f64,
}

impl Boid {
    pub const MAX_FORCE: f64 = 10.0;
    pub const MAX_SPEED: f64 = 100.0;
    pub const ALIGN_RANGE: f64 = 70.0;
    pub const SEPARATE_RANGE: f64 = 25.0;

    pub fn new(id: usize, position: Vector2, velocity: Vector2) -> Self {
        Self {
            id,
            position,
            velocity,
            acceleration: Vector2::ZERO,
            max_speed: Self::MAX_SPEED,
            max_force: Self::MAX_FORCE,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn heading(&self) -> f64 {
        self.velocity.angle()
    }

    pub fn pose(&self) -> Pose {
        Pose {
            x: self.position.x,
            y: self.position.y,
            heading: self.heading(),
        }
    }

    // Copy the steering limits from the flock's tunables
    pub fn apply_limits(&mut self, params: &FlockingParams) {
        self.max_speed = params.max_speed;
        self.max_force = params.max_force;
    }

    pub fn apply_force(&mut self, force: Vector2) {
        self.acceleration += force;
    }

    // Advance one frame and clear the force accumulator
    pub fn integrate(&mut self, dt: f64) {
        self.velocity += self.acceleration;
        self.position += self.velocity * dt;
        self.acceleration = Vector2::ZERO;
    }

    // desired = raw at cruise speed; steering = desired - velocity, limited
    fn steer(&self, raw: Vector2) -> Vector2 {
        let desired = raw.with_magnitude(self.max_speed);
        (desired - self.velocity).limited(self.max_force)
    }

    // Mean of `value` over every neighbor except self
    fn average_over<F>(&self, neighbors: &[&Boid], value: F) -> Option<Vector2>
    where
        F: Fn(&Boid) -> Vector2,
    {
        let mut sum = Vector2::ZERO;
        let mut total = 0usize;
        for other in neighbors.iter().filter(|other| other.id != self.id) {
            sum += value(other);
            total += 1;
        }
        if total == 0 {
            return None;
        }
        sum.checked_div(total as f64).ok()
    }

    // Steer to match the average velocity of neighbors
    pub fn alignment(&self, neighbors: &[&Boid]) -> Vector2 {
        match self.average_over(neighbors, |other| other.velocity) {
            Some(average) => self.steer(average),
            None => Vector2::ZERO,
        }
    }

    // Steer towards the centroid of neighbors
    pub fn cohesion(&self, neighbors: &[&Boid]) -> Vector2 {
        match self.average_over(neighbors, |other| other.position) {
            Some(centroid) => self.steer(centroid - self.position),
            None => Vector2::ZERO,
        }
    }

    /// Steer away from neighbors, weighting each by inverse squared distance.
    ///
    /// A neighbor at exactly the same position contributes nothing (but is
    /// still counted in the average) instead of an infinite push.
    pub fn separation(&self, neighbors: &[&Boid]) -> Vector2 {
        let repulsion = self.average_over(neighbors, |other| {
            let diff = self.position - other.position;
            diff.checked_div(self.position.distance_2(&other.position))
                .unwrap_or(Vector2::ZERO)
        });
        match repulsion {
            Some(average) => self.steer(average),
            None => Vector2::ZERO,
        }
    }

    pub fn seek(&self, target: Vector2) -> Vector2 {
        self.steer(target - self.position)
    }

    // Pull the current velocity towards cruise speed, limited to `max`
    pub fn cruise(&self, max: f64) -> Vector2 {
        (self.velocity.with_magnitude(self.max_speed) - self.velocity).limited(max)
    }
}
