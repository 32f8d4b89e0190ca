//! Steering rules.
//!
//! Each tick a boid sums the contributions of its rules into a single
//! acceleration. Rules are applied in the order they were configured.
//!
//! # Rule Categories
//!
//! - **Flocking** (neighbor): Align, Cohere, Separate
//! - **Boundaries**: AvoidBorders
//!
//! # Neighbor Rules
//!
//! Rules marked "(neighbor)" read the [`Neighborhood`] gathered from the
//! spatial grid. If no configured rule needs neighbors the grid scan is
//! skipped entirely.
//!
//! # Presets
//!
//! [`Rule::classic`] is the full three-rule flock with border avoidance.
//! [`Rule::lean`] keeps only alignment and border avoidance, which is the
//! classic set with cohesion and separation weighted to zero.

use crate::boid::Boid;
use crate::vector::Vector2D;
use serde::{Deserialize, Serialize};

/// Default weight of every flocking rule.
pub const DEFAULT_ADJUSTMENT_RATE: f64 = 0.015;

/// The region a boid lives in and how far it can see.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
    pub view_radius: f64,
}

/// Sums gathered from every visible neighbor during one scan.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Neighborhood {
    /// Number of neighbors strictly inside the view radius.
    pub count: usize,
    pub velocity_sum: Vector2D,
    pub position_sum: Vector2D,
    /// Sum of `(me - other) / distance` over all neighbors.
    pub separation: Vector2D,
}

impl Neighborhood {
    /// Record `other` as seen from `position`, if it lies within `radius`.
    ///
    /// Returns whether the neighbor was counted.
    pub fn observe(&mut self, position: Vector2D, other: &Boid, radius: f64) -> bool {
        let dist = other.position.distance(position);
        if dist >= radius {
            return false;
        }
        self.count += 1;
        self.velocity_sum = self.velocity_sum + other.velocity;
        self.position_sum = self.position_sum + other.position;
        self.separation = self.separation + (position - other.position) / dist;
        true
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Mean neighbor velocity, `None` when nobody is in view.
    pub fn average_velocity(&self) -> Option<Vector2D> {
        (!self.is_empty()).then(|| self.velocity_sum / self.count as f64)
    }

    /// Mean neighbor position, `None` when nobody is in view.
    pub fn average_position(&self) -> Option<Vector2D> {
        (!self.is_empty()).then(|| self.position_sum / self.count as f64)
    }
}

/// Rules that define boid behavior.
///
/// # Example
///
/// ```ignore
/// Simulation::new()
///     .with_rule(Rule::AvoidBorders)
///     .with_rule(Rule::Align { strength: 0.015 })
///     .with_rule(Rule::Separate { strength: 0.03 })
///     .start()?;
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// Alignment: steer velocity toward the average neighbor velocity.
    ///
    /// **Neighbor rule.** Contributes `(avg_velocity - velocity) * strength`.
    Align {
        /// Alignment strength.
        strength: f64,
    },

    /// Cohesion: steer toward the average neighbor position.
    ///
    /// **Neighbor rule.** Contributes `(avg_position - position) * strength`.
    Cohere {
        /// Cohesion strength.
        strength: f64,
    },

    /// Separation: steer away from neighbors, harder the closer they are.
    ///
    /// **Neighbor rule.** Contributes `Σ (position - other) / distance * strength`.
    /// Two boids at exactly the same position divide by zero; the resulting
    /// NaN is absorbed by the velocity clamp.
    Separate {
        /// Separation strength.
        strength: f64,
    },

    /// Push away from walls once within the view radius of one.
    ///
    /// Per axis: `1 / pos` near the low wall, `1 / (pos - max)` near the high
    /// wall, zero in between. The force is unbounded at the wall itself and
    /// undefined exactly on it; velocity clamping keeps the boid from sitting
    /// there in practice.
    AvoidBorders,
}

impl Rule {
    /// Border avoidance plus alignment, cohesion and separation, all at `rate`.
    pub fn classic(rate: f64) -> Vec<Rule> {
        vec![
            Rule::AvoidBorders,
            Rule::Align { strength: rate },
            Rule::Cohere { strength: rate },
            Rule::Separate { strength: rate },
        ]
    }

    /// Border avoidance plus alignment only.
    pub fn lean(rate: f64) -> Vec<Rule> {
        vec![Rule::AvoidBorders, Rule::Align { strength: rate }]
    }

    /// Returns `true` if this rule reads the neighborhood.
    pub fn requires_neighbors(&self) -> bool {
        match self {
            Rule::Align { .. } | Rule::Cohere { .. } | Rule::Separate { .. } => true,
            Rule::AvoidBorders => false,
        }
    }

    pub(crate) fn strength(&self) -> Option<f64> {
        match self {
            Rule::Align { strength } | Rule::Cohere { strength } | Rule::Separate { strength } => {
                Some(*strength)
            }
            Rule::AvoidBorders => None,
        }
    }

    /// This rule's contribution to `boid`'s acceleration.
    pub fn steer(&self, boid: &Boid, neighbors: &Neighborhood, arena: &Arena) -> Vector2D {
        match *self {
            Rule::Align { strength } => neighbors
                .average_velocity()
                .map_or(Vector2D::ZERO, |avg| (avg - boid.velocity) * strength),
            Rule::Cohere { strength } => neighbors
                .average_position()
                .map_or(Vector2D::ZERO, |avg| (avg - boid.position) * strength),
            Rule::Separate { strength } => {
                if neighbors.is_empty() {
                    Vector2D::ZERO
                } else {
                    neighbors.separation * strength
                }
            }
            Rule::AvoidBorders => Vector2D::new(
                border_force(boid.position.x, arena.width, arena.view_radius),
                border_force(boid.position.y, arena.height, arena.view_radius),
            ),
        }
    }
}

/// Repulsion from the walls of one axis.
pub fn border_force(pos: f64, max: f64, radius: f64) -> f64 {
    if pos < radius {
        1.0 / pos
    } else if pos > max - radius {
        1.0 / (pos - max)
    } else {
        0.0
    }
}

/// Sum the contributions of `rules` in order.
pub fn accelerate(rules: &[Rule], boid: &Boid, neighbors: &Neighborhood, arena: &Arena) -> Vector2D {
    rules
        .iter()
        .fold(Vector2D::ZERO, |acc, rule| acc + rule.steer(boid, neighbors, arena))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> Arena {
        Arena {
            width: 640.0,
            height: 360.0,
            view_radius: 13.0,
        }
    }

    fn still(id: usize, x: f64, y: f64) -> Boid {
        Boid::new(id, Vector2D::new(x, y), Vector2D::ZERO)
    }

    // ========== Neighborhood ==========

    #[test]
    fn test_observe_respects_radius() {
        let mut hood = Neighborhood::default();
        let me = Vector2D::new(100.0, 100.0);

        assert!(hood.observe(me, &still(1, 105.0, 100.0), 13.0));
        assert!(!hood.observe(me, &still(2, 113.0, 100.0), 13.0));
        assert_eq!(hood.count, 1);
        assert_eq!(hood.separation, Vector2D::new(-1.0, 0.0));
    }

    #[test]
    fn test_averages() {
        let me = Vector2D::new(50.0, 50.0);
        let mut hood = Neighborhood::default();
        assert_eq!(hood.average_position(), None);

        hood.observe(me, &Boid::new(1, Vector2D::new(52.0, 50.0), Vector2D::new(1.0, 0.0)), 13.0);
        hood.observe(me, &Boid::new(2, Vector2D::new(48.0, 54.0), Vector2D::new(0.0, 1.0)), 13.0);

        assert_eq!(hood.average_position(), Some(Vector2D::new(50.0, 52.0)));
        assert_eq!(hood.average_velocity(), Some(Vector2D::new(0.5, 0.5)));
    }

    // ========== Flocking Rules ==========

    #[test]
    fn test_flocking_rules_idle_without_neighbors() {
        let boid = Boid::new(0, Vector2D::new(300.0, 180.0), Vector2D::new(0.3, 0.1));
        let hood = Neighborhood::default();

        for rule in Rule::classic(0.015) {
            assert_eq!(rule.steer(&boid, &hood, &arena()), Vector2D::ZERO, "{:?}", rule);
        }
    }

    #[test]
    fn test_align_and_cohere() {
        let boid = Boid::new(0, Vector2D::new(300.0, 180.0), Vector2D::ZERO);
        let mut hood = Neighborhood::default();
        hood.observe(
            boid.position,
            &Boid::new(1, Vector2D::new(304.0, 180.0), Vector2D::new(1.0, 0.0)),
            13.0,
        );

        let align = Rule::Align { strength: 0.5 }.steer(&boid, &hood, &arena());
        assert_eq!(align, Vector2D::new(0.5, 0.0));

        let cohere = Rule::Cohere { strength: 0.5 }.steer(&boid, &hood, &arena());
        assert_eq!(cohere, Vector2D::new(2.0, 0.0));

        let separate = Rule::Separate { strength: 0.5 }.steer(&boid, &hood, &arena());
        assert_eq!(separate, Vector2D::new(-0.5, 0.0));
    }

    // ========== Boundaries ==========

    #[test]
    fn test_border_force() {
        assert_eq!(border_force(2.0, 640.0, 13.0), 0.5);
        assert_eq!(border_force(320.0, 640.0, 13.0), 0.0);
        assert_eq!(border_force(636.0, 640.0, 13.0), -0.25);
        // Exactly on the wall is unguarded
        assert!(border_force(0.0, 640.0, 13.0).is_infinite());
    }

    #[test]
    fn test_avoid_borders_per_axis() {
        let boid = still(0, 4.0, 180.0);
        let push = Rule::AvoidBorders.steer(&boid, &Neighborhood::default(), &arena());
        assert_eq!(push, Vector2D::new(0.25, 0.0));
    }

    // ========== Presets ==========

    #[test]
    fn test_presets() {
        let classic = Rule::classic(0.015);
        assert_eq!(classic.len(), 4);
        assert!(classic.iter().filter(|r| r.requires_neighbors()).count() == 3);

        let lean = Rule::lean(0.015);
        assert_eq!(lean, vec![Rule::AvoidBorders, Rule::Align { strength: 0.015 }]);
    }

    #[test]
    fn test_lean_matches_zeroed_classic() {
        let boid = Boid::new(0, Vector2D::new(5.0, 100.0), Vector2D::new(0.2, -0.4));
        let mut hood = Neighborhood::default();
        hood.observe(
            boid.position,
            &Boid::new(1, Vector2D::new(9.0, 103.0), Vector2D::new(-0.5, 0.5)),
            13.0,
        );

        let zeroed = vec![
            Rule::AvoidBorders,
            Rule::Align { strength: 0.015 },
            Rule::Cohere { strength: 0.0 },
            Rule::Separate { strength: 0.0 },
        ];
        assert_eq!(
            accelerate(&Rule::lean(0.015), &boid, &hood, &arena()),
            accelerate(&zeroed, &boid, &hood, &arena()),
        );
    }

    #[test]
    fn test_rule_serde() {
        let json = r#"[{"rule":"avoid_borders"},{"rule":"align","strength":0.02}]"#;
        let rules: Vec<Rule> = serde_json::from_str(json).unwrap();
        assert_eq!(rules, vec![Rule::AvoidBorders, Rule::Align { strength: 0.02 }]);
    }
}
