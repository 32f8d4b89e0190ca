//! Simulation builder and runner.
//!
//! [`Simulation`] collects configuration through method chaining. Calling
//! [`Simulation::start`] builds the flock, hands it to one tokio task per boid
//! and returns a [`RunningSimulation`] to observe and stop it.

use crate::boid::{Boid, BoidId};
use crate::error::{Result, SimulationError};
use crate::flock::{Flock, FlockSummary, LockDiscipline};
use crate::rules::{Rule, DEFAULT_ADJUSTMENT_RATE};
use crate::spawn::SpawnContext;
use crate::time::TickClock;
use crate::vector::Vector2D;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

type Spawner = Box<dyn Fn(&mut SpawnContext) -> (Vector2D, Vector2D) + Send + Sync>;

/// Every tunable of a simulation.
///
/// All fields have defaults, so a config document only needs the values it
/// changes:
///
/// ```json
/// { "population": 200, "tick_interval_ms": 10, "lock_discipline": "exclusive" }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Playfield width; positions live in `[0, width)`.
    pub width: u32,
    /// Playfield height; positions live in `[0, height)`.
    pub height: u32,
    /// Number of boids.
    pub population: usize,
    /// How far a boid sees, and how close to a wall border avoidance kicks in.
    pub view_radius: f64,
    /// Weight of the flocking rules when `rules` is not given.
    pub adjustment_rate: f64,
    /// Sleep between two ticks of the same boid.
    #[serde(rename = "tick_interval_ms", with = "millis")]
    pub tick_interval: Duration,
    pub lock_discipline: LockDiscipline,
    /// Seed for reproducible spawning.
    pub seed: Option<u64>,
    /// Explicit rule list. `None` means [`Rule::classic`] at `adjustment_rate`.
    pub rules: Option<Vec<Rule>>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            population: 500,
            view_radius: 13.0,
            adjustment_rate: DEFAULT_ADJUSTMENT_RATE,
            tick_interval: Duration::from_millis(5),
            lock_discipline: LockDiscipline::Split,
            seed: None,
            rules: None,
        }
    }
}

impl SimulationConfig {
    /// Parse a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The rules boids will follow.
    pub fn effective_rules(&self) -> Vec<Rule> {
        self.rules
            .clone()
            .unwrap_or_else(|| Rule::classic(self.adjustment_rate))
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SimulationError::InvalidConfig("width and height must be positive"));
        }
        if !self.view_radius.is_finite() || self.view_radius <= 0.0 {
            return Err(SimulationError::InvalidConfig("view_radius must be positive and finite"));
        }
        if !self.adjustment_rate.is_finite() {
            return Err(SimulationError::InvalidConfig("adjustment_rate must be finite"));
        }
        if self.tick_interval.is_zero() {
            return Err(SimulationError::InvalidConfig("tick_interval must be non-zero"));
        }
        let cells = (self.width as usize + 1) * (self.height as usize + 1);
        if self.population > cells {
            return Err(SimulationError::InvalidConfig("population exceeds the number of grid cells"));
        }
        let rules_finite = self
            .rules
            .iter()
            .flatten()
            .filter_map(Rule::strength)
            .all(f64::is_finite);
        if !rules_finite {
            return Err(SimulationError::InvalidConfig("rule strengths must be finite"));
        }
        Ok(())
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// A flocking simulation builder.
///
/// Use method chaining to configure, then call `.start()` from inside a tokio
/// runtime.
///
/// ```ignore
/// let sim = Simulation::new()
///     .with_population(300)
///     .with_bounds(800, 600)
///     .with_tick_interval(Duration::from_millis(10))
///     .start()?;
///
/// let positions = sim.positions();
/// sim.stop().await?;
/// ```
pub struct Simulation {
    config: SimulationConfig,
    spawner: Option<Spawner>,
}

impl Simulation {
    /// Create a new simulation with default settings.
    pub fn new() -> Self {
        Self::from_config(SimulationConfig::default())
    }

    pub fn from_config(config: SimulationConfig) -> Self {
        Self { config, spawner: None }
    }

    /// Start `population` boids on a `width × height` field with every other
    /// setting at its default.
    pub fn initialize(population: usize, width: u32, height: u32) -> Result<RunningSimulation> {
        Self::new()
            .with_population(population)
            .with_bounds(width, height)
            .start()
    }

    /// Set the number of boids.
    pub fn with_population(mut self, count: usize) -> Self {
        self.config.population = count;
        self
    }

    /// Set the playfield size.
    pub fn with_bounds(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn with_view_radius(mut self, radius: f64) -> Self {
        self.config.view_radius = radius;
        self
    }

    /// Set the weight of the default flocking rules.
    pub fn with_adjustment_rate(mut self, rate: f64) -> Self {
        self.config.adjustment_rate = rate;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval = interval;
        self
    }

    pub fn with_lock_discipline(mut self, discipline: LockDiscipline) -> Self {
        self.config.lock_discipline = discipline;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Add a rule. The first call replaces the default classic rule set.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.config.rules.get_or_insert_with(Vec::new).push(rule);
        self
    }

    /// Replace the whole rule list.
    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.config.rules = Some(rules);
        self
    }

    /// Set the boid spawner.
    /// Called once per boid; returns `(position, velocity)`.
    pub fn with_spawner<F>(mut self, spawner: F) -> Self
    where
        F: Fn(&mut SpawnContext) -> (Vector2D, Vector2D) + Send + Sync + 'static,
    {
        self.spawner = Some(Box::new(spawner));
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Validate the config and create the populated flock without starting
    /// any task.
    pub fn build_flock(&self) -> Result<Flock> {
        let config = &self.config;
        config.validate()?;

        let mut flock = Flock::new(
            config.width as usize,
            config.height as usize,
            config.view_radius,
            config.effective_rules(),
        );

        for index in 0..config.population {
            let mut ctx = SpawnContext::new(
                index,
                config.population,
                config.width as f64,
                config.height as f64,
                config.seed,
            );
            let (position, velocity) = match &self.spawner {
                Some(spawner) => spawner(&mut ctx),
                None => ctx.random_boid(),
            };
            if !(0.0..config.width as f64).contains(&position.x)
                || !(0.0..config.height as f64).contains(&position.y)
            {
                return Err(SimulationError::InvalidConfig("spawn position outside the field"));
            }
            if !velocity.x.is_finite() || !velocity.y.is_finite() {
                return Err(SimulationError::InvalidConfig("spawn velocity must be finite"));
            }
            flock.spawn(position, velocity);
        }

        Ok(flock)
    }

    /// Build the flock and launch one task per boid on the current runtime.
    pub fn start(self) -> Result<RunningSimulation> {
        let runtime = tokio::runtime::Handle::try_current()?;
        let flock = Arc::new(RwLock::new(self.build_flock()?));
        let config = self.config;

        let clock = Arc::new(TickClock::new());
        let shutdown = CancellationToken::new();

        let tasks = (0..config.population)
            .map(|id| {
                runtime.spawn(run_boid(
                    id,
                    flock.clone(),
                    config.lock_discipline,
                    config.tick_interval,
                    clock.clone(),
                    shutdown.clone(),
                ))
            })
            .collect();

        info!(
            population = config.population,
            width = config.width,
            height = config.height,
            lock_discipline = ?config.lock_discipline,
            tick_interval_ms = config.tick_interval.as_millis() as u64,
            "Simulation started"
        );

        Ok(RunningSimulation {
            config,
            flock,
            clock,
            shutdown,
            tasks,
        })
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

/// Free-running update loop of one boid.
async fn run_boid(
    id: BoidId,
    flock: Arc<RwLock<Flock>>,
    discipline: LockDiscipline,
    interval: Duration,
    clock: Arc<TickClock>,
    shutdown: CancellationToken,
) {
    trace!(id, "Boid task started");

    loop {
        discipline.tick(&flock, id);
        clock.record();

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    trace!(id, "Boid task stopped");
}

/// Handle to a running simulation.
///
/// All accessors take the flock's read lock, so they never observe a boid
/// halfway through its update. Dropping the handle signals every task to
/// stop at its next tick; [`RunningSimulation::stop`] also waits for them.
pub struct RunningSimulation {
    config: SimulationConfig,
    flock: Arc<RwLock<Flock>>,
    clock: Arc<TickClock>,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl RunningSimulation {
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn population(&self) -> usize {
        self.config.population
    }

    /// Snapshot of every boid's position, indexed by id.
    pub fn positions(&self) -> Vec<Vector2D> {
        self.flock.read().positions()
    }

    /// Snapshot of every boid.
    pub fn boids(&self) -> Vec<Boid> {
        self.flock.read().boids().to_vec()
    }

    pub fn summary(&self) -> FlockSummary {
        self.flock.read().summary()
    }

    /// Run `f` against the flock under the read lock.
    pub fn with_flock<R>(&self, f: impl FnOnce(&Flock) -> R) -> R {
        f(&self.flock.read())
    }

    /// Ticks completed by all boids together.
    pub fn ticks(&self) -> u64 {
        self.clock.ticks()
    }

    pub fn ticks_per_second(&self) -> f64 {
        self.clock.ticks_per_second()
    }

    /// Achieved over configured per-boid tick rate.
    pub fn cadence(&self) -> f64 {
        self.clock.cadence(self.config.population, self.config.tick_interval)
    }

    /// Shared tick counter, still readable after the handle is gone.
    pub fn tick_clock(&self) -> Arc<TickClock> {
        self.clock.clone()
    }

    /// Token that stops the simulation when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Signal every boid task to stop and wait for all of them.
    ///
    /// Returns the first panicked task, if any.
    pub async fn stop(mut self) -> Result<()> {
        self.shutdown.cancel();

        let mut failure = None;
        for (id, task) in std::mem::take(&mut self.tasks).into_iter().enumerate() {
            if let Err(e) = task.await {
                warn!(id, error = %e, "Boid task ended abnormally");
                if e.is_panic() && failure.is_none() {
                    failure = Some(SimulationError::TaskPanicked { id });
                }
            }
        }

        info!(
            ticks = self.clock.ticks(),
            elapsed_ms = self.clock.elapsed().as_millis() as u64,
            "Simulation stopped"
        );

        failure.map_or(Ok(()), Err)
    }
}

impl Drop for RunningSimulation {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
