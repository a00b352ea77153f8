pub mod collect;
pub mod color;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod inventory;
pub mod planner;
pub mod remote;
pub mod shutdown;
pub mod trajectory;

pub use color::{Color, Rgb, WeightedColor};
pub use error::{
    FireError, InventoryError, PaintError, ParseColorError, RemoteError, TrajectoryError,
};
pub use inventory::ColorInventory;
pub use trajectory::{OptimalArcSolver, TrajectoryResult, TrajectorySolver};
