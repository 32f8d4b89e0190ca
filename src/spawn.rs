//! Spawn context for boid initialization.
//!
//! Provides helpers so spawner closures don't need their own RNG setup.

use crate::boid::{MAX_SPEED, MIN_SPEED};
use crate::vector::Vector2D;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Context handed to spawner functions.
///
/// ```ignore
/// Simulation::new()
///     .with_spawner(|ctx| {
///         let position = ctx.random_in_rect(Vector2D::new(300.0, 160.0), Vector2D::new(340.0, 200.0));
///         (position, Vector2D::ZERO)
///     })
/// ```
pub struct SpawnContext {
    /// Id of the boid being spawned (0 to count-1).
    pub index: usize,
    /// Total number of boids being spawned.
    pub count: usize,
    pub width: f64,
    pub height: f64,
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context for boid `index`.
    ///
    /// With a `seed` the whole population is reproducible. Without one the
    /// clock seeds it, so each run differs.
    pub fn new(index: usize, count: usize, width: f64, height: f64, seed: Option<u64>) -> Self {
        let base = seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        });

        Self {
            index,
            count,
            width,
            height,
            rng: SmallRng::seed_from_u64(base ^ index as u64),
        }
    }

    /// Random f64 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Random f64 in `[min, max)`.
    ///
    /// An empty or NaN range yields `min`.
    #[inline]
    pub fn random_range(&mut self, min: f64, max: f64) -> f64 {
        if min < max {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Uniform random point in `[0, width) × [0, height)`.
    pub fn random_in_bounds(&mut self) -> Vector2D {
        Vector2D::new(self.random() * self.width, self.random() * self.height)
    }

    /// Uniform random point in the rectangle spanned by `min` and `max`.
    ///
    /// A degenerate side collapses onto `min` along that axis.
    pub fn random_in_rect(&mut self, min: Vector2D, max: Vector2D) -> Vector2D {
        Vector2D::new(self.random_range(min.x, max.x), self.random_range(min.y, max.y))
    }

    /// Velocity with each component uniform in `[-1, 1)`.
    pub fn random_velocity(&mut self) -> Vector2D {
        Vector2D::new(
            self.random_range(MIN_SPEED, MAX_SPEED),
            self.random_range(MIN_SPEED, MAX_SPEED),
        )
    }

    /// The default spawn: anywhere in bounds, any direction.
    pub fn random_boid(&mut self) -> (Vector2D, Vector2D) {
        (self.random_in_bounds(), self.random_velocity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_boid_within_bounds() {
        for index in 0..200 {
            let mut ctx = SpawnContext::new(index, 200, 640.0, 360.0, None);
            let (position, velocity) = ctx.random_boid();

            assert!((0.0..640.0).contains(&position.x));
            assert!((0.0..360.0).contains(&position.y));
            assert!((-1.0..1.0).contains(&velocity.x));
            assert!((-1.0..1.0).contains(&velocity.y));
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = SpawnContext::new(7, 10, 640.0, 360.0, Some(99)).random_boid();
        let b = SpawnContext::new(7, 10, 640.0, 360.0, Some(99)).random_boid();
        let c = SpawnContext::new(8, 10, 640.0, 360.0, Some(99)).random_boid();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_degenerate_range_does_not_panic() {
        let mut ctx = SpawnContext::new(0, 1, 640.0, 360.0, Some(5));

        assert_eq!(ctx.random_range(3.0, 3.0), 3.0);
        assert_eq!(ctx.random_range(4.0, 2.0), 4.0);

        let point = ctx.random_in_rect(Vector2D::new(10.0, 20.0), Vector2D::new(10.0, 30.0));
        assert_eq!(point.x, 10.0);
        assert!((20.0..30.0).contains(&point.y));
    }
}
