//! # flockbox - Boids in a box
//!
//! A concurrent flocking simulation. Every boid runs its own free-running
//! update loop on the tokio runtime, perceives nearby boids through a shared
//! spatial grid and steers by alignment, cohesion, separation and border
//! avoidance.
//!
//! ## Quick Start
//!
//! ```ignore
//! use flockbox::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SimulationError> {
//!     let sim = Simulation::new()
//!         .with_population(500)
//!         .with_bounds(640, 360)
//!         .start()?;
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//!     for position in sim.positions() {
//!         // draw it
//!     }
//!
//!     sim.stop().await
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Boids
//!
//! A [`Boid`] is an id, a position and a velocity. Velocity components are
//! clamped into `[-1, 1]` after every tick, so a boid moves at most one cell
//! per axis per tick.
//!
//! ### Rules
//!
//! Rules define boid behavior. Their contributions are summed each tick:
//!
//! ```ignore
//! .with_rule(Rule::AvoidBorders)               // Push off the walls
//! .with_rule(Rule::Align { strength: 0.015 })  // Match neighbor velocity
//! .with_rule(Rule::Cohere { strength: 0.015 }) // Move toward neighbors
//! .with_rule(Rule::Separate { strength: 0.015 }) // Keep some distance
//! ```
//!
//! Without explicit rules the simulation uses [`Rule::classic`] at the
//! configured adjustment rate.
//!
//! ### Locking
//!
//! The grid and all boids form one [`Flock`] behind one
//! [`parking_lot::RwLock`]. [`LockDiscipline`] picks whether a tick scans
//! under the read lock and integrates under the write lock, or does both
//! under a single write lock. Either way a boid's move from one grid cell to
//! the next is atomic to every other boid and to observers.
//!
//! ## Observation
//!
//! [`RunningSimulation::positions`] returns a copy of all positions taken
//! under the read lock. [`Vector2D`] is `Pod`, so the snapshot can be cast to
//! raw bytes for a renderer.

pub mod boid;
mod error;
pub mod flock;
pub mod rules;
mod simulation;
pub mod spatial;
mod spawn;
pub mod time;
pub mod vector;

pub use boid::{Boid, BoidId};
pub use error::{Result, SimulationError};
pub use flock::{Flock, FlockSummary, LockDiscipline};
pub use rules::{Arena, Neighborhood, Rule, DEFAULT_ADJUSTMENT_RATE};
pub use simulation::{RunningSimulation, Simulation, SimulationConfig};
pub use spatial::{Cell, SpatialGrid};
pub use spawn::SpawnContext;
pub use time::TickClock;
pub use vector::Vector2D;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use flockbox::prelude::*;
/// ```
pub mod prelude {
    pub use crate::boid::{Boid, BoidId};
    pub use crate::error::SimulationError;
    pub use crate::flock::{Flock, FlockSummary, LockDiscipline};
    pub use crate::rules::Rule;
    pub use crate::simulation::{RunningSimulation, Simulation, SimulationConfig};
    pub use crate::spawn::SpawnContext;
    pub use crate::vector::Vector2D;
}
