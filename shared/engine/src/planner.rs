use crate::color::{Color, Rgb};
use crate::dispatch::{Dispatcher, ShotCommand};
use crate::error::PaintError;
use crate::inventory::ColorInventory;
use crate::remote::Remote;
use crate::trajectory::{Target, TrajectorySolver};
use anyhow::ensure;
use std::collections::BTreeMap;

/// A decoded image, row-major. `x` is the column, `y` the row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Rgb>,
}

impl Grid {
    pub fn new(width: usize, height: usize, cells: Vec<Rgb>) -> anyhow::Result<Grid> {
        ensure!(
            cells.len() == width * height,
            "expected {}x{} cells, got {}",
            width,
            height,
            cells.len()
        );
        Ok(Grid {
            width,
            height,
            cells,
        })
    }

    pub fn from_rows(rows: Vec<Vec<Rgb>>) -> anyhow::Result<Grid> {
        let height = rows.len();
        let width = rows.first().map(|row| row.len()).unwrap_or(0);
        ensure!(
            rows.iter().all(|row| row.len() == width),
            "rows have different lengths"
        );
        Grid::new(width, height, rows.into_iter().flatten().collect())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Cells in row-major order with their coordinates.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Rgb)> + '_ {
        let width = self.width.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, rgb)| (i % width, i / width, *rgb))
    }

    /// Number of cells of each color, background included.
    pub fn census(&self) -> BTreeMap<Color, u64> {
        let mut counts = BTreeMap::new();
        for rgb in &self.cells {
            *counts.entry(Color::from(*rgb)).or_insert(0) += 1;
        }
        counts
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintReport {
    pub shots: usize,
    pub skipped: usize,
}

/// Paints an image one cell at a time: pick the closest pigment, take a unit of it,
/// aim, fire, and wait for the shot to be acknowledged before moving on.
pub struct ImagePlanner<S, R> {
    solver: S,
    mass: f64,
    dispatcher: Dispatcher<R>,
}

impl<S: TrajectorySolver, R: Remote> ImagePlanner<S, R> {
    pub fn new(solver: S, mass: f64, dispatcher: Dispatcher<R>) -> Self {
        ImagePlanner {
            solver,
            mass,
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<R> {
        &self.dispatcher
    }

    pub async fn paint(
        &self,
        grid: &Grid,
        inventory: &mut ColorInventory,
    ) -> Result<PaintReport, PaintError> {
        log::info!(
            "Painting {}x{} image with {} solver, {} units in stock",
            grid.width(),
            grid.height(),
            self.solver.name(),
            inventory.total_units()
        );
        let mut report = PaintReport::default();
        for (x, y, rgb) in grid.cells() {
            if rgb.is_white() {
                report.skipped += 1;
                continue;
            }
            self.fire_cell(grid.width(), x, y, rgb, inventory).await?;
            report.shots += 1;
        }
        log::info!(
            "Finished painting: {} shots, {} background cells",
            report.shots,
            report.skipped
        );
        Ok(report)
    }

    /// Fires a single cell. Useful for checking the aim before a full run.
    pub async fn paint_cell(
        &self,
        grid: &Grid,
        x: usize,
        y: usize,
        inventory: &mut ColorInventory,
    ) -> Result<Option<i64>, PaintError> {
        let rgb = grid.get(x, y).ok_or(PaintError::OutOfBounds {
            x,
            y,
            width: grid.width(),
            height: grid.height(),
        })?;
        if rgb.is_white() {
            return Err(PaintError::Background { x, y });
        }
        self.fire_cell(grid.width(), x, y, rgb, inventory).await
    }

    async fn fire_cell(
        &self,
        width: usize,
        x: usize,
        y: usize,
        rgb: Rgb,
        inventory: &mut ColorInventory,
    ) -> Result<Option<i64>, PaintError> {
        let color = inventory.nearest_color(rgb)?;
        let remaining = inventory.decrement(color, 1)?;
        let target = Target {
            canvas_width: width as i64,
            x: x as i64,
            y: y as i64,
        };
        let trajectory = self.solver.solve(target, self.mass)?;
        log::debug!(
            "({}, {}) {:?} -> color {} ({} left), {:?}",
            x,
            y,
            rgb,
            color,
            remaining,
            trajectory
        );
        let id = self
            .dispatcher
            .fire(&ShotCommand::single(trajectory, color))
            .await?;
        Ok(id)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::color::WHITE;

    #[test]
    fn test_grid_shape() {
        assert!(Grid::new(2, 2, vec![WHITE; 3]).is_err());
        assert!(Grid::from_rows(vec![vec![WHITE; 2], vec![WHITE; 3]]).is_err());
        let grid = Grid::from_rows(vec![
            vec![Rgb::new(1, 0, 0), Rgb::new(2, 0, 0), Rgb::new(3, 0, 0)],
            vec![Rgb::new(4, 0, 0), Rgb::new(5, 0, 0), Rgb::new(6, 0, 0)],
        ])
        .unwrap();
        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert_eq!(grid.get(2, 1), Some(Rgb::new(6, 0, 0)));
        assert_eq!(grid.get(3, 0), None);
        let order: Vec<_> = grid.cells().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(order, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn test_census() {
        let black = Rgb::new(0, 0, 0);
        let grid = Grid::from_rows(vec![vec![WHITE, black], vec![black, black]]).unwrap();
        let census = grid.census();
        assert_eq!(census.get(&Color::from(black)), Some(&3));
        assert_eq!(census.get(&Color::from(WHITE)), Some(&1));
    }

    #[test]
    fn test_empty_grid() {
        let grid = Grid::from_rows(vec![]).unwrap();
        assert_eq!(grid.cells().count(), 0);
    }
}
