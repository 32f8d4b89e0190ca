//! A single flocking agent.

use crate::vector::Vector2D;

/// Stable identity of a boid, `0..population`.
pub type BoidId = usize;

/// Lower bound of each velocity component.
pub const MIN_SPEED: f64 = -1.0;
/// Upper bound of each velocity component.
pub const MAX_SPEED: f64 = 1.0;

/// Position, velocity and identity of one agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boid {
    pub id: BoidId,
    pub position: Vector2D,
    pub velocity: Vector2D,
}

impl Boid {
    pub fn new(id: BoidId, position: Vector2D, velocity: Vector2D) -> Self {
        Self { id, position, velocity }
    }

    /// Where the boid will be after one more tick at its current velocity.
    #[inline]
    pub fn lookahead(&self) -> Vector2D {
        self.position + self.velocity
    }

    /// Apply `acceleration`, clamp the velocity and advance one step.
    pub(crate) fn advance(&mut self, acceleration: Vector2D) {
        self.velocity = (self.velocity + acceleration).limit(MIN_SPEED, MAX_SPEED);
        self.position = self.position + self.velocity;
    }

    /// Reverse each velocity component whose look-ahead leaves
    /// `[0, width) × [0, height)`.
    pub(crate) fn bounce(&mut self, width: f64, height: f64) {
        let next = self.lookahead();
        if next.x >= width || next.x < 0.0 {
            self.velocity.x = -self.velocity.x;
        }
        if next.y >= height || next.y < 0.0 {
            self.velocity.y = -self.velocity.y;
        }
    }
}
