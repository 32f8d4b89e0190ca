//! Error types for flockbox.
//!
//! Ticking itself cannot fail. Errors come from configuration, from starting a
//! simulation in the wrong context, and from tasks that died.

use crate::boid::BoidId;
use thiserror::Error;

/// Errors that can occur when configuring, starting or stopping a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A configuration value cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// A configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// `start` was called outside a tokio runtime.
    #[error("no tokio runtime available; start the simulation from within a runtime")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// A boid task panicked.
    #[error("boid task {id} panicked")]
    TaskPanicked { id: BoidId },
}

pub type Result<T> = std::result::Result<T, SimulationError>;
