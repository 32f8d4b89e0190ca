//! Two-dimensional vector value type.
//!
//! [`Vector2D`] is a plain `f64` pair. Every operation returns a new value,
//! nothing mutates in place. NaN and infinity are not guarded against; the
//! flocking rules assume finite, bounded inputs.
//!
//! The type is `#[repr(C)]` and [`bytemuck::Pod`], so a position snapshot can
//! be handed to a renderer as raw bytes with [`bytemuck::cast_slice`].

use bytemuck::{Pod, Zeroable};
use glam::DVec2;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A point or direction on the playfield.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise sum.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Component-wise difference.
    #[inline]
    pub fn subtract(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    #[inline]
    pub fn multiply_scalar(self, d: f64) -> Self {
        Self::new(self.x * d, self.y * d)
    }

    /// Divide both components by `d`. Dividing by zero is the caller's problem.
    #[inline]
    pub fn divide_scalar(self, d: f64) -> Self {
        Self::new(self.x / d, self.y / d)
    }

    /// Add `d` to both components.
    #[inline]
    pub fn add_scalar(self, d: f64) -> Self {
        Self::new(self.x + d, self.y + d)
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Clamp each component independently into `[low, high]`.
    ///
    /// A NaN component collapses to `low` rather than propagating, which is
    /// what lets an unguarded singularity in the steering rules be absorbed
    /// by the velocity clamp.
    #[inline]
    pub fn limit(self, low: f64, high: f64) -> Self {
        Self::new(self.x.max(low).min(high), self.y.max(low).min(high))
    }
}

impl Add for Vector2D {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Vector2D::add(self, rhs)
    }
}

impl Sub for Vector2D {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.subtract(rhs)
    }
}

impl Mul<f64> for Vector2D {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        self.multiply_scalar(rhs)
    }
}

impl Div<f64> for Vector2D {
    type Output = Self;

    #[inline]
    fn div(self, rhs: f64) -> Self {
        self.divide_scalar(rhs)
    }
}

impl Neg for Vector2D {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<DVec2> for Vector2D {
    fn from(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Vector2D> for DVec2 {
    fn from(v: Vector2D) -> Self {
        DVec2::new(v.x, v.y)
    }
}

impl From<(f64, f64)> for Vector2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}
