//! Firing solutions.
//!
//! The ballista sits `standoff` units in front of the canvas, centred on it. A target
//! cell at column `x`, row `y` is reached by turning `atan(a / b)` degrees, where
//! `a = width / 2 - x` is the lateral offset and `b = standoff + y` the depth, and then
//! launching the projectile far enough to cover the straight-line distance.
//!
//! Which launch model the live game actually uses has not been confirmed, so solvers
//! sit behind [`TrajectorySolver`] and callers never depend on a concrete formula.

use crate::error::TrajectoryError;

pub const STANDARD_GRAVITY: f64 = 9.80665;
pub const DEFAULT_STANDOFF: f64 = 300.0;
pub const OPTIMAL_ELEVATION: f64 = 45.0;

#[derive(PartialEq, Copy, Clone, Debug)]
pub struct TrajectoryResult {
    /// Degrees, positive towards the left edge of the canvas.
    pub horizontal_angle: f64,
    /// Degrees above the horizon.
    pub vertical_angle: f64,
    pub power: f64,
}

#[derive(PartialEq, Copy, Clone, Debug)]
pub struct Target {
    pub canvas_width: i64,
    pub x: i64,
    pub y: i64,
}

pub trait TrajectorySolver {
    fn name(&self) -> &'static str;

    fn solve(&self, target: Target, mass: f64) -> Result<TrajectoryResult, TrajectoryError>;
}

fn invalid(msg: String) -> TrajectoryError {
    TrajectoryError::InvalidTarget(msg)
}

/// Offset, depth, heading and distance shared by every launch model.
#[derive(PartialEq, Copy, Clone, Debug)]
pub struct Aim {
    pub lateral: f64,
    pub depth: f64,
    pub horizontal_angle: f64,
    pub distance: f64,
}

pub fn aim(target: Target, standoff: f64) -> Result<Aim, TrajectoryError> {
    if !standoff.is_finite() {
        return Err(invalid(format!("standoff distance {standoff} is not finite")));
    }
    let lateral = target.canvas_width.div_euclid(2) as f64 - target.x as f64;
    let depth = standoff + target.y as f64;
    if depth == 0.0 {
        return Err(invalid(format!(
            "zero depth for target ({}, {})",
            target.x, target.y
        )));
    }
    let horizontal_angle = (lateral / depth).atan().to_degrees();
    let distance = (lateral * lateral + depth * depth).sqrt();
    if !horizontal_angle.is_finite() || !distance.is_finite() {
        return Err(invalid(format!(
            "non-finite aim for target ({}, {})",
            target.x, target.y
        )));
    }
    Ok(Aim {
        lateral,
        depth,
        horizontal_angle,
        distance,
    })
}

fn check_physics(mass: f64, gravity: f64) -> Result<(), TrajectoryError> {
    if !mass.is_finite() || mass <= 0.0 {
        return Err(invalid(format!("projectile mass {mass} must be positive")));
    }
    if !gravity.is_finite() || gravity <= 0.0 {
        return Err(invalid(format!("gravity {gravity} must be positive")));
    }
    Ok(())
}

/// Solves with the default launch model.
pub fn solve(
    canvas_width: i64,
    x: i64,
    y: i64,
    mass: f64,
    standoff: f64,
    gravity: f64,
) -> Result<TrajectoryResult, TrajectoryError> {
    OptimalArcSolver { standoff, gravity }.solve(Target { canvas_width, x, y }, mass)
}

/// Always launches at 45°, the elevation with the longest range for a given speed, and
/// picks the launch energy that lands the shot exactly at the target distance.
///
/// At 45° the range is `v² / g`, so `v² = g·d` and the power (launch kinetic energy) is
/// `m·g·d / 2`.
#[derive(PartialEq, Copy, Clone, Debug)]
pub struct OptimalArcSolver {
    pub standoff: f64,
    pub gravity: f64,
}

impl Default for OptimalArcSolver {
    fn default() -> Self {
        OptimalArcSolver {
            standoff: DEFAULT_STANDOFF,
            gravity: STANDARD_GRAVITY,
        }
    }
}

impl TrajectorySolver for OptimalArcSolver {
    fn name(&self) -> &'static str {
        "optimal-arc"
    }

    fn solve(&self, target: Target, mass: f64) -> Result<TrajectoryResult, TrajectoryError> {
        check_physics(mass, self.gravity)?;
        let aim = aim(target, self.standoff)?;
        let power = mass * self.gravity * aim.distance / 2.0;
        if !power.is_finite() || power < 0.0 {
            return Err(invalid(format!("power {power} out of range")));
        }
        Ok(TrajectoryResult {
            horizontal_angle: aim.horizontal_angle,
            vertical_angle: OPTIMAL_ELEVATION,
            power,
        })
    }
}

/// Older launch model: the ballista always releases the same energy and the elevation
/// is back-solved from `sin(2θ) = g·d / v²`. Targets beyond the maximum range have no
/// solution.
#[derive(PartialEq, Copy, Clone, Debug)]
pub struct FixedEnergySolver {
    pub standoff: f64,
    pub gravity: f64,
    pub energy: f64,
}

impl Default for FixedEnergySolver {
    fn default() -> Self {
        FixedEnergySolver {
            standoff: DEFAULT_STANDOFF,
            gravity: STANDARD_GRAVITY,
            energy: 1000.0,
        }
    }
}

impl TrajectorySolver for FixedEnergySolver {
    fn name(&self) -> &'static str {
        "fixed-energy"
    }

    fn solve(&self, target: Target, mass: f64) -> Result<TrajectoryResult, TrajectoryError> {
        check_physics(mass, self.gravity)?;
        if !self.energy.is_finite() || self.energy <= 0.0 {
            return Err(invalid(format!("launch energy {} must be positive", self.energy)));
        }
        let aim = aim(target, self.standoff)?;
        let v_squared = 2.0 * self.energy / mass;
        let sin_2a = self.gravity * aim.distance / v_squared;
        if !(-1.0..=1.0).contains(&sin_2a) {
            return Err(invalid(format!(
                "target ({}, {}) is out of range at energy {}",
                target.x, target.y, self.energy
            )));
        }
        Ok(TrajectoryResult {
            horizontal_angle: aim.horizontal_angle,
            vertical_angle: sin_2a.asin().to_degrees() / 2.0,
            power: self.energy,
        })
    }
}
