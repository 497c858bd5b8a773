// Grid occupancy matrix derived from placed panels
use super::panel::Panel;
use std::fmt;

/// Fixed width of the dashboard layout in grid columns.
pub const GRID_WIDTH: usize = 48;

/// Deepest row a panel may reach. Rows past it are clipped like columns past
/// [`GRID_WIDTH`].
pub const MAX_GRID_HEIGHT: usize = 10_000;

pub type GridRow = [u32; GRID_WIDTH];

/// `max_y` rows by [`GRID_WIDTH`] columns. Each cell counts the panels covering
/// it: 0 is free, 1 is occupied, anything above 1 is an overlap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GridMatrix {
    rows: Vec<GridRow>,
}

impl GridMatrix {
    pub fn build(panels: &[Panel]) -> Self {
        let mut rows = vec![[0u32; GRID_WIDTH]; max_y(panels).min(MAX_GRID_HEIGHT)];

        for panel in panels {
            let x_end = panel.x2().min(GRID_WIDTH);
            for row in rows.iter_mut().skip(panel.grid.y).take(panel.grid.h) {
                for cell in row.iter_mut().take(x_end).skip(panel.grid.x) {
                    *cell += 1;
                }
            }
        }

        Self { rows }
    }

    pub fn from_rows(rows: Vec<GridRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    /// Number of rows, equal to the largest panel bottom edge.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<u32> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    pub fn empty_space_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|c| **c == 0).count())
            .sum()
    }

    /// No two panels share a cell.
    pub fn is_valid(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(|c| *c <= 1))
    }
}

impl fmt::Display for GridMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let line: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            writeln!(f, "[{}]", line.join(", "))?;
        }
        Ok(())
    }
}

pub fn min_x(panels: &[Panel]) -> usize {
    panels.iter().map(|p| p.grid.x).min().unwrap_or(0)
}

pub fn max_x(panels: &[Panel]) -> usize {
    panels.iter().map(Panel::x2).max().unwrap_or(0)
}

pub fn min_y(panels: &[Panel]) -> usize {
    panels.iter().map(|p| p.grid.y).min().unwrap_or(0)
}

pub fn max_y(panels: &[Panel]) -> usize {
    panels.iter().map(Panel::y2).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(id: &str, x: usize, y: usize, w: usize, h: usize) -> Panel {
        Panel::new(id, x, y, w, h, None)
    }

    #[test]
    fn test_empty_matrix() {
        let matrix = GridMatrix::build(&[]);
        assert_eq!(matrix.height(), 0);
        assert_eq!(matrix.empty_space_count(), 0);
        assert!(matrix.is_valid());
        assert_eq!((min_x(&[]), max_x(&[]), min_y(&[]), max_y(&[])), (0, 0, 0, 0));
    }

    #[test]
    fn test_build_counts_cells() {
        let panels = vec![panel("a", 0, 0, 10, 5), panel("b", 10, 2, 4, 6)];
        let matrix = GridMatrix::build(&panels);

        assert_eq!(matrix.height(), 8);
        assert_eq!(matrix.cell(0, 0), Some(1));
        assert_eq!(matrix.cell(9, 4), Some(1));
        assert_eq!(matrix.cell(10, 0), Some(0));
        assert_eq!(matrix.cell(13, 7), Some(1));
        assert_eq!(matrix.cell(0, 5), Some(0));
        assert_eq!(matrix.empty_space_count(), 8 * GRID_WIDTH - 50 - 24);
        assert!(matrix.is_valid());
    }

    #[test]
    fn test_overlap_is_invalid() {
        let panels = vec![panel("a", 0, 0, 10, 5), panel("b", 5, 3, 10, 5)];
        let matrix = GridMatrix::build(&panels);
        assert_eq!(matrix.cell(6, 4), Some(2));
        assert!(!matrix.is_valid());
    }

    #[test]
    fn test_columns_past_width_are_clipped() {
        let matrix = GridMatrix::build(&[panel("a", 40, 0, 20, 1)]);
        assert_eq!(matrix.height(), 1);
        assert_eq!(matrix.rows()[0].iter().filter(|c| **c == 1).count(), 8);
        assert_eq!(matrix.cell(GRID_WIDTH, 0), None);
    }

    #[test]
    fn test_rows_past_max_height_are_clipped() {
        let matrix = GridMatrix::build(&[panel("a", 0, 0, 4, 2), panel("deep", 0, usize::MAX - 1, 4, 8)]);
        assert_eq!(matrix.height(), MAX_GRID_HEIGHT);
        assert_eq!(matrix.cell(0, 0), Some(1));
        assert_eq!(matrix.empty_space_count(), MAX_GRID_HEIGHT * GRID_WIDTH - 8);
    }

    #[test]
    fn test_extents() {
        let panels = vec![panel("a", 4, 2, 10, 5), panel("b", 20, 9, 4, 6)];
        assert_eq!(min_x(&panels), 4);
        assert_eq!(max_x(&panels), 24);
        assert_eq!(min_y(&panels), 2);
        assert_eq!(max_y(&panels), 15);
    }

    #[test]
    fn test_display_prints_rows() {
        let matrix = GridMatrix::build(&[panel("a", 0, 0, 2, 2)]);
        let printed = matrix.to_string();
        assert_eq!(printed.lines().count(), 2);
        assert!(printed.starts_with("[1, 1, 0"));
    }
}
