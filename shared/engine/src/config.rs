use crate::dispatch::{RetryPolicy, SuccessCode};
use crate::trajectory::{OptimalArcSolver, DEFAULT_STANDOFF, STANDARD_GRAVITY};

pub const DEFAULT_MASS: f64 = 1.0;

/// Tunables for a painting run. The binary fills this in from its command line.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub standoff: f64,
    pub gravity: f64,
    /// Mass of every projectile.
    pub mass: f64,
    pub success: SuccessCode,
    pub retry: RetryPolicy,
    /// Multiplier applied to solved power before it is sent.
    pub power_scale: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            standoff: DEFAULT_STANDOFF,
            gravity: STANDARD_GRAVITY,
            mass: DEFAULT_MASS,
            success: SuccessCode::default(),
            retry: RetryPolicy::default(),
            power_scale: 1.0,
        }
    }
}

impl EngineConfig {
    pub fn solver(&self) -> OptimalArcSolver {
        OptimalArcSolver {
            standoff: self.standoff,
            gravity: self.gravity,
        }
    }
}
