//! The shared flock state and the per-tick update.
//!
//! A [`Flock`] owns the [`SpatialGrid`] and every [`Boid`]. The two are always
//! mutated together, so one lock around the whole flock covers both the grid
//! and the position/velocity fields other boids read during their scans.
//!
//! A tick for one boid is split in two halves:
//!
//! - [`Flock::acceleration`] only reads, and may run under a shared lock.
//! - [`Flock::integrate`] clears the boid's old cell, moves it, claims the new
//!   cell and applies the wall bounce. It needs the exclusive lock.
//!
//! [`LockDiscipline`] decides how a running simulation acquires the lock for
//! those two halves.

use crate::boid::{Boid, BoidId};
use crate::rules::{accelerate, Arena, Neighborhood, Rule};
use crate::spatial::{Cell, SpatialGrid};
use crate::vector::Vector2D;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// How a tick takes the flock lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockDiscipline {
    /// Scan under the read lock, integrate under the write lock.
    ///
    /// Other boids may move between the two halves, so the decision can be
    /// based on a slightly stale view. Scans run in parallel.
    #[default]
    Split,
    /// Scan and integrate inside one write-lock acquisition.
    ///
    /// Every decision sees a fully consistent flock, at the cost of
    /// serializing all ticks.
    Exclusive,
}

impl LockDiscipline {
    /// Run one tick of boid `id` against the locked flock.
    pub fn tick(self, flock: &RwLock<Flock>, id: BoidId) {
        match self {
            LockDiscipline::Split => {
                let acceleration = flock.read().acceleration(id);
                flock.write().integrate(id, acceleration);
            }
            LockDiscipline::Exclusive => flock.write().step(id),
        }
    }
}

/// Aggregate statistics over the whole flock.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlockSummary {
    pub population: usize,
    /// Boids currently registered in the grid. A boid whose cell was taken
    /// over by another stays invisible until it moves.
    pub visible: usize,
    pub centroid: Vector2D,
    pub mean_speed: f64,
    pub mean_pairwise_distance: f64,
}

/// Grid plus population.
#[derive(Clone, Debug)]
pub struct Flock {
    arena: Arena,
    rules: Vec<Rule>,
    scans_neighbors: bool,
    grid: SpatialGrid,
    boids: Vec<Boid>,
}

impl Flock {
    /// An empty flock on a `width × height` field.
    pub fn new(width: usize, height: usize, view_radius: f64, rules: Vec<Rule>) -> Self {
        let scans_neighbors = rules.iter().any(Rule::requires_neighbors);
        Self {
            arena: Arena {
                width: width as f64,
                height: height as f64,
                view_radius,
            },
            rules,
            scans_neighbors,
            grid: SpatialGrid::new(width, height),
            boids: Vec::new(),
        }
    }

    /// Add a boid and register it in the grid. Ids are handed out in order.
    pub fn spawn(&mut self, position: Vector2D, velocity: Vector2D) -> BoidId {
        let id = self.boids.len();
        self.boids.push(Boid::new(id, position, velocity));
        let cell = self.grid.cell_of(position);
        self.grid.set(cell, id);
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.boids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    #[inline]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    #[inline]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[inline]
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    #[inline]
    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    /// Boid `id`. Panics if the id was never spawned.
    #[inline]
    pub fn boid(&self, id: BoidId) -> &Boid {
        &self.boids[id]
    }

    /// Copy of every boid's position, indexed by id.
    pub fn positions(&self) -> Vec<Vector2D> {
        self.boids.iter().map(|b| b.position).collect()
    }

    /// Gather every visible neighbor of `id` from the grid window.
    pub fn neighborhood(&self, id: BoidId) -> Neighborhood {
        let me = &self.boids[id];
        let radius = self.arena.view_radius;
        let mut hood = Neighborhood::default();

        for cell in self.grid.window(me.position, radius) {
            match self.grid.get(cell) {
                Some(other) if other != id => {
                    hood.observe(me.position, &self.boids[other], radius);
                }
                _ => {}
            }
        }
        hood
    }

    /// Acceleration of `id` from the current state. Read-only.
    pub fn acceleration(&self, id: BoidId) -> Vector2D {
        let hood = if self.scans_neighbors {
            self.neighborhood(id)
        } else {
            Neighborhood::default()
        };
        accelerate(&self.rules, &self.boids[id], &hood, &self.arena)
    }

    /// Move `id` by `acceleration` and keep the grid in step.
    ///
    /// The old cell is released only if this boid still holds it, so a boid
    /// that moved in on top of us is not erased.
    pub fn integrate(&mut self, id: BoidId, acceleration: Vector2D) {
        let boid = &mut self.boids[id];

        let old = self.grid.cell_of(boid.position);
        self.grid.clear_if(old, id);
        boid.advance(acceleration);
        let new = self.grid.cell_of(boid.position);
        self.grid.set(new, id);

        boid.bounce(self.arena.width, self.arena.height);
    }

    /// One full tick for `id`.
    pub fn step(&mut self, id: BoidId) {
        let acceleration = self.acceleration(id);
        self.integrate(id, acceleration);
    }

    /// One tick for every boid, in id order.
    pub fn step_all(&mut self) {
        for id in 0..self.boids.len() {
            self.step(id);
        }
    }

    /// Grid entries whose occupant is no longer standing in that cell.
    ///
    /// Empty for a consistent flock.
    pub fn stale_cells(&self) -> Vec<(Cell, BoidId)> {
        self.grid
            .occupied()
            .filter(|&(cell, id)| {
                self.boids
                    .get(id)
                    .map_or(true, |b| self.grid.cell_of(b.position) != cell)
            })
            .collect()
    }

    pub fn summary(&self) -> FlockSummary {
        let population = self.boids.len();
        if population == 0 {
            return FlockSummary::default();
        }
        let n = population as f64;

        let centroid = self
            .boids
            .iter()
            .fold(Vector2D::ZERO, |acc, b| acc + b.position)
            / n;
        let mean_speed = self
            .boids
            .iter()
            .map(|b| b.velocity.distance(Vector2D::ZERO))
            .sum::<f64>()
            / n;

        FlockSummary {
            population,
            visible: self.grid.occupied().count(),
            centroid,
            mean_speed,
            mean_pairwise_distance: mean_pairwise_distance(&self.boids),
        }
    }
}

fn mean_pairwise_distance(boids: &[Boid]) -> f64 {
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in boids.iter().enumerate() {
        for b in &boids[i + 1..] {
            total += a.position.distance(b.position);
            pairs += 1;
        }
    }
    if pairs == 0 {
        0.0
    } else {
        total / pairs as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::DEFAULT_ADJUSTMENT_RATE;

    fn flock() -> Flock {
        Flock::new(640, 360, 13.0, Rule::classic(DEFAULT_ADJUSTMENT_RATE))
    }

    #[test]
    fn test_spawn_registers_in_grid() {
        let mut flock = flock();
        let a = flock.spawn(Vector2D::new(10.5, 20.9), Vector2D::ZERO);
        let b = flock.spawn(Vector2D::new(100.0, 100.0), Vector2D::ZERO);

        assert_eq!((a, b), (0, 1));
        assert_eq!(flock.grid().get(Cell::new(10, 20)), Some(0));
        assert_eq!(flock.grid().get(Cell::new(100, 100)), Some(1));
        assert!(flock.stale_cells().is_empty());
    }

    #[test]
    fn test_neighborhood_excludes_self_and_far_boids() {
        let mut flock = flock();
        flock.spawn(Vector2D::new(100.0, 100.0), Vector2D::ZERO);
        flock.spawn(Vector2D::new(105.0, 100.0), Vector2D::new(1.0, 0.0));
        flock.spawn(Vector2D::new(112.0, 108.0), Vector2D::ZERO); // in window, out of radius
        flock.spawn(Vector2D::new(200.0, 200.0), Vector2D::ZERO);

        let hood = flock.neighborhood(0);
        assert_eq!(hood.count, 1);
        assert_eq!(hood.velocity_sum, Vector2D::new(1.0, 0.0));
    }

    #[test]
    fn test_integrate_moves_grid_entry() {
        let mut flock = flock();
        flock.spawn(Vector2D::new(50.5, 50.5), Vector2D::new(1.0, 0.0));

        flock.integrate(0, Vector2D::ZERO);

        assert_eq!(flock.boid(0).position, Vector2D::new(51.5, 50.5));
        assert_eq!(flock.grid().get(Cell::new(50, 50)), None);
        assert_eq!(flock.grid().get(Cell::new(51, 50)), Some(0));
    }

    #[test]
    fn test_integrate_does_not_erase_newer_occupant() {
        let mut flock = flock();
        flock.spawn(Vector2D::new(50.2, 50.2), Vector2D::new(1.0, 0.0));
        // Second boid lands on the same cell and takes it over
        flock.spawn(Vector2D::new(50.8, 50.8), Vector2D::ZERO);
        assert_eq!(flock.grid().get(Cell::new(50, 50)), Some(1));

        flock.integrate(0, Vector2D::ZERO);

        assert_eq!(flock.grid().get(Cell::new(50, 50)), Some(1));
        assert_eq!(flock.grid().get(Cell::new(51, 50)), Some(0));
    }

    #[test]
    fn test_acceleration_without_neighbor_rules_skips_scan() {
        let mut flock = Flock::new(640, 360, 13.0, vec![Rule::AvoidBorders]);
        flock.spawn(Vector2D::new(300.0, 180.0), Vector2D::ZERO);
        flock.spawn(Vector2D::new(301.0, 180.0), Vector2D::ZERO);

        assert_eq!(flock.acceleration(0), Vector2D::ZERO);
    }

    #[test]
    fn test_lock_disciplines_agree_single_threaded() {
        let mut split = flock();
        split.spawn(Vector2D::new(10.0, 10.0), Vector2D::ZERO);
        split.spawn(Vector2D::new(12.0, 10.0), Vector2D::ZERO);
        let exclusive = RwLock::new(split.clone());
        let split = RwLock::new(split);

        for id in 0..2 {
            LockDiscipline::Split.tick(&split, id);
            LockDiscipline::Exclusive.tick(&exclusive, id);
        }

        assert_eq!(split.read().boids(), exclusive.read().boids());
    }

    #[test]
    fn test_summary() {
        let mut flock = flock();
        assert_eq!(flock.summary(), FlockSummary::default());

        flock.spawn(Vector2D::new(0.5, 0.5), Vector2D::new(0.6, 0.8));
        flock.spawn(Vector2D::new(6.5, 8.5), Vector2D::ZERO);

        let summary = flock.summary();
        assert_eq!(summary.population, 2);
        assert_eq!(summary.visible, 2);
        assert_eq!(summary.centroid, Vector2D::new(3.5, 4.5));
        assert!((summary.mean_speed - 0.5).abs() < 1e-12);
        assert_eq!(summary.mean_pairwise_distance, 10.0);
    }
}
