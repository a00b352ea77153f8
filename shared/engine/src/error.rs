use crate::color::Color;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[error("invalid packed color {0:?}")]
pub struct ParseColorError(pub String);

#[derive(Error, Debug, PartialEq)]
pub enum TrajectoryError {
    #[error("invalid target: {0}")]
    InvalidTarget(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InventoryError {
    #[error("no pigments in inventory")]
    Empty,

    #[error("not enough of color {color}: requested {requested}, {remaining} remaining")]
    Depleted {
        color: Color,
        requested: u64,
        remaining: u64,
    },
}

/// Transport-level failure talking to the game API. Never retried by the engine.
#[derive(Error, Debug)]
#[error("remote unavailable: {0:#}")]
pub struct RemoteError(pub anyhow::Error);

impl From<anyhow::Error> for RemoteError {
    fn from(err: anyhow::Error) -> Self {
        RemoteError(err)
    }
}

#[derive(Error, Debug)]
pub enum FireError {
    #[error("shot not acknowledged after {attempts} attempts (last status {last_status})")]
    Exhausted { attempts: u32, last_status: i64 },

    #[error("command {id} did not appear in the queue after {polls} polls")]
    NotQueued { id: i64, polls: u32 },

    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[derive(Error, Debug)]
pub enum PaintError {
    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Fire(#[from] FireError),

    #[error("cell ({x}, {y}) is background")]
    Background { x: usize, y: usize },

    #[error("cell ({x}, {y}) is outside the {width}x{height} image")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}
