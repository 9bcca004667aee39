/*
 * Vector Module
 *
 * A small 2D vector value type used by every part of the simulation.
 * Positions, velocities and steering forces are all Vector2.
 *
 * Division is checked: dividing by a zero scalar, a vector with a zero
 * component, or normalizing the zero vector returns VectorError::DivideByZero.
 * Changing the magnitude of the zero vector is a no-op.
 */

use std::f64::consts::TAU;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::VectorError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn from_scalar(value: f64) -> Self {
        Self { x: value, y: value }
    }

    pub fn from_polar(magnitude: f64, angle: f64) -> Self {
        Self {
            x: magnitude * angle.cos(),
            y: magnitude * angle.sin(),
        }
    }

    // A vector of the given length pointing in a uniformly random direction
    pub fn from_random<R: Rng + ?Sized>(rng: &mut R, strength: f64) -> Self {
        let angle = rng.gen_range(0.0..TAU);
        Self::from_polar(strength, angle)
    }

    #[inline]
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    #[inline]
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    // Rescale to the given length; the zero vector stays zero
    pub fn set_magnitude(&mut self, magnitude: f64) {
        let current = self.magnitude();
        if current != 0.0 {
            *self *= magnitude / current;
        }
    }

    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.set_magnitude(magnitude);
        self
    }

    pub fn with_angle(self, angle: f64) -> Self {
        Self::from_polar(self.magnitude(), angle)
    }

    pub fn normalized(self) -> Result<Self, VectorError> {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            return Err(VectorError::DivideByZero);
        }
        Ok(self * (1.0 / magnitude))
    }

    pub fn normalize(&mut self) -> Result<(), VectorError> {
        *self = self.normalized()?;
        Ok(())
    }

    /// Clamp to exactly `max` when the magnitude exceeds it.
    ///
    /// The comparison is done on squared magnitudes, so vectors already at
    /// or below `max` are returned bit-for-bit unchanged. A non-positive
    /// `max` leaves the vector untouched.
    pub fn limit(&mut self, max: f64) {
        let max_squared = max * max;
        let current_squared = self.magnitude_squared();
        if max > 0.0 && max_squared < current_squared {
            *self *= max / current_squared.sqrt();
        }
    }

    pub fn limited(mut self, max: f64) -> Self {
        self.limit(max);
        self
    }

    #[inline]
    pub fn distance_2(&self, other: &Vector2) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    pub fn distance_to(&self, other: &Vector2) -> f64 {
        self.distance_2(other).sqrt()
    }

    pub fn add_scalar(self, value: f64) -> Self {
        Self::new(self.x + value, self.y + value)
    }

    pub fn sub_scalar(self, value: f64) -> Self {
        Self::new(self.x - value, self.y - value)
    }

    pub fn checked_div(self, value: f64) -> Result<Self, VectorError> {
        if value == 0.0 {
            return Err(VectorError::DivideByZero);
        }
        Ok(Self::new(self.x / value, self.y / value))
    }

    pub fn checked_div_vec(self, other: Vector2) -> Result<Self, VectorError> {
        if other.x == 0.0 || other.y == 0.0 {
            return Err(VectorError::DivideByZero);
        }
        Ok(Self::new(self.x / other.x, self.y / other.y))
    }

    pub fn div_scalar(&mut self, value: f64) -> Result<(), VectorError> {
        *self = self.checked_div(value)?;
        Ok(())
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Vector2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

// Component-wise product
impl Mul for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl MulAssign for Vector2 {
    fn mul_assign(&mut self, rhs: Vector2) {
        self.x *= rhs.x;
        self.y *= rhs.y;
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl MulAssign<f64> for Vector2 {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}
