// Free-space search over the grid matrix
use super::error::DashboardError;
use super::grid::{GridMatrix, GridRow, GRID_WIDTH};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Corner of the grid the search starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPolicy {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ScanPolicy {
    pub const ALL: [ScanPolicy; 4] = [
        ScanPolicy::TopLeft,
        ScanPolicy::TopRight,
        ScanPolicy::BottomLeft,
        ScanPolicy::BottomRight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScanPolicy::TopLeft => "top_left",
            ScanPolicy::TopRight => "top_right",
            ScanPolicy::BottomLeft => "bottom_left",
            ScanPolicy::BottomRight => "bottom_right",
        }
    }

    fn mirrors_columns(self) -> bool {
        matches!(self, ScanPolicy::TopRight | ScanPolicy::BottomRight)
    }

    fn mirrors_rows(self) -> bool {
        matches!(self, ScanPolicy::BottomLeft | ScanPolicy::BottomRight)
    }
}

impl fmt::Display for ScanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanPolicy {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScanPolicy::ALL
            .into_iter()
            .find(|policy| policy.as_str() == s)
            .ok_or_else(|| DashboardError::invalid(format!("invalid scan policy {}", s)))
    }
}

/// Finds the first free `w` x `h` rectangle in `matrix`, scanning from the
/// corner named by `policy`. Returns the top-left corner of the rectangle.
///
/// When the matrix has fewer free cells than the rectangle needs, or no free
/// rectangle exists, the answer is `(0, max_y)`: directly below the grid,
/// which is always free.
pub fn find_coordinates(matrix: &GridMatrix, w: usize, h: usize, policy: ScanPolicy) -> (usize, usize) {
    let max_y = matrix.height();

    if matrix.empty_space_count() < w.saturating_mul(h) {
        tracing::debug!("{}x{} does not fit in {} free cells, appending below", w, h, matrix.empty_space_count());
        return (0, max_y);
    }

    let grid = orient(matrix.rows(), policy);

    // Below the grid is free space, above it is not. Once rows are mirrored the
    // region past the last scanned row lies above the real grid.
    let Some((x, y)) = scan(&grid, w, h, !policy.mirrors_rows()) else {
        tracing::debug!("no free {}x{} rectangle from {}, appending below", w, h, policy);
        return (0, max_y);
    };

    let x = if policy.mirrors_columns() { GRID_WIDTH - x - w } else { x };
    let y = if policy.mirrors_rows() { max_y - y - h } else { y };
    (x, y)
}

fn orient(rows: &[GridRow], policy: ScanPolicy) -> Vec<GridRow> {
    let mut grid = rows.to_vec();
    if policy.mirrors_rows() {
        grid.reverse();
    }
    if policy.mirrors_columns() {
        for row in &mut grid {
            row.reverse();
        }
    }
    grid
}

fn scan(grid: &[GridRow], w: usize, h: usize, open_below: bool) -> Option<(usize, usize)> {
    if w > GRID_WIDTH {
        return None;
    }

    for (row_i, row) in grid.iter().enumerate() {
        if row.iter().filter(|c| **c == 0).count() < w {
            continue;
        }

        let mut column_i = 0;
        while column_i + w <= GRID_WIDTH {
            let run = row[column_i..column_i + w]
                .iter()
                .take_while(|c| **c == 0)
                .count();

            if run < w {
                // cells up to the run end are known; skip them
                column_i += run.max(1);
            } else if span_free_below(grid, row_i, column_i, w, h, open_below) {
                return Some((column_i, row_i));
            } else {
                column_i += 1;
            }
        }
    }

    None
}

fn span_free_below(grid: &[GridRow], row_i: usize, column_i: usize, w: usize, h: usize, open_below: bool) -> bool {
    (1..h).all(|dy| match grid.get(row_i + dy) {
        Some(row) => row[column_i..column_i + w].iter().all(|c| *c == 0),
        None => open_below,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::panel::Panel;

    fn matrix_of(panels: &[(usize, usize, usize, usize)]) -> GridMatrix {
        let panels: Vec<Panel> = panels
            .iter()
            .enumerate()
            .map(|(n, (x, y, w, h))| Panel::new(&format!("p{}", n), *x, *y, *w, *h, None))
            .collect();
        GridMatrix::build(&panels)
    }

    fn with_placed(matrix_panels: &[(usize, usize, usize, usize)], placed: (usize, usize, usize, usize)) -> GridMatrix {
        let mut all = matrix_panels.to_vec();
        all.push(placed);
        matrix_of(&all)
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("bottom_right".parse::<ScanPolicy>().unwrap(), ScanPolicy::BottomRight);
        assert_eq!(ScanPolicy::default(), ScanPolicy::TopLeft);
        let err = "middle".parse::<ScanPolicy>().unwrap_err();
        assert!(matches!(err, DashboardError::InvalidArgument(_)));
    }

    #[test]
    fn test_empty_matrix_places_at_origin() {
        for policy in ScanPolicy::ALL {
            assert_eq!(find_coordinates(&GridMatrix::default(), 10, 5, policy), (0, 0));
        }
    }

    #[test]
    fn test_top_left_next_to_existing_panel() {
        let matrix = matrix_of(&[(0, 0, 10, 5)]);
        assert_eq!(find_coordinates(&matrix, 10, 5, ScanPolicy::TopLeft), (10, 0));
    }

    #[test]
    fn test_top_right_aligns_to_right_edge() {
        let matrix = matrix_of(&[(0, 0, 10, 5)]);
        assert_eq!(find_coordinates(&matrix, 10, 5, ScanPolicy::TopRight), (38, 0));
    }

    #[test]
    fn test_bottom_left_aligns_to_bottom_edge() {
        let matrix = matrix_of(&[(0, 0, 10, 2), (20, 0, 10, 6)]);
        let (x, y) = find_coordinates(&matrix, 10, 3, ScanPolicy::BottomLeft);
        assert_eq!((x, y), (0, 3));
        assert!(with_placed(&[(0, 0, 10, 2), (20, 0, 10, 6)], (x, y, 10, 3)).is_valid());
    }

    #[test]
    fn test_bottom_right_does_not_overlap() {
        let existing = [(0, 0, 10, 5)];
        let matrix = matrix_of(&existing);
        let (x, y) = find_coordinates(&matrix, 10, 5, ScanPolicy::BottomRight);

        assert_eq!(x + 10, GRID_WIDTH);
        assert_eq!(y + 5, matrix.height());
        assert!(with_placed(&existing, (x, y, 10, 5)).is_valid());
    }

    #[test]
    fn test_fast_reject_appends_below() {
        // 48 x 2 grid with 4 free cells
        let matrix = matrix_of(&[(0, 0, 46, 2)]);
        assert_eq!(matrix.empty_space_count(), 4);
        for policy in ScanPolicy::ALL {
            assert_eq!(find_coordinates(&matrix, 3, 2, policy), (0, 2));
        }
    }

    #[test]
    fn test_scattered_free_cells_append_below() {
        // enough free cells in total but never two adjacent
        let panels: Vec<(usize, usize, usize, usize)> = (0..24).map(|n| (n * 2, 0, 1, 4)).collect();
        let matrix = matrix_of(&panels);
        assert_eq!(find_coordinates(&matrix, 2, 2, ScanPolicy::TopLeft), (0, 4));
    }

    #[test]
    fn test_rectangle_may_extend_below_grid() {
        let matrix = matrix_of(&[(0, 0, 10, 2)]);
        assert_eq!(find_coordinates(&matrix, 10, 6, ScanPolicy::TopLeft), (10, 0));
    }

    #[test]
    fn test_mirrored_rows_stay_inside_grid() {
        // free 10x2 strip exists but a 10x6 panel only fits below the grid
        let matrix = matrix_of(&[(0, 0, 48, 1), (0, 1, 10, 2)]);
        assert_eq!(find_coordinates(&matrix, 10, 6, ScanPolicy::BottomLeft), (0, 3));
        assert_eq!(find_coordinates(&matrix, 10, 6, ScanPolicy::TopLeft), (10, 1));
    }

    #[test]
    fn test_full_run_blocked_below_moves_on() {
        // row 0 is free from column 10, but column 10..20 is blocked in row 1
        let matrix = matrix_of(&[(0, 0, 10, 3), (10, 1, 10, 2)]);
        assert_eq!(find_coordinates(&matrix, 10, 3, ScanPolicy::TopLeft), (20, 0));
    }

    #[test]
    fn test_huge_size_appends_below() {
        assert_eq!(find_coordinates(&GridMatrix::default(), usize::MAX, 2, ScanPolicy::TopLeft), (0, 0));
        let matrix = matrix_of(&[(0, 0, 10, 5)]);
        assert_eq!(find_coordinates(&matrix, usize::MAX, usize::MAX, ScanPolicy::BottomRight), (0, 5));
    }

    #[test]
    fn test_wider_than_grid_appends_below() {
        let matrix = matrix_of(&[(0, 0, 1, 10)]);
        assert_eq!(find_coordinates(&matrix, GRID_WIDTH + 1, 1, ScanPolicy::TopLeft), (0, 10));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        /// A grid filled by one full-width panel per row except for a single hole.
        fn grid_with_hole(a: usize, b: usize, w: usize, h: usize, height: usize) -> GridMatrix {
            let mut rows = vec![[1u32; GRID_WIDTH]; height];
            for row in rows.iter_mut().skip(b).take(h) {
                for cell in row.iter_mut().skip(a).take(w) {
                    *cell = 0;
                }
            }
            GridMatrix::from_rows(rows)
        }

        proptest! {
            #[test]
            fn opposite_corners_find_the_same_hole(
                w in 1usize..=12,
                h in 1usize..=6,
                a in 0usize..=36,
                b in 0usize..10,
                extra in 0usize..5,
            ) {
                let height = b + h + extra;
                let matrix = grid_with_hole(a, b, w, h, height);

                let from_top_left = find_coordinates(&matrix, w, h, ScanPolicy::TopLeft);
                let from_bottom_right = find_coordinates(&matrix, w, h, ScanPolicy::BottomRight);

                prop_assert_eq!(from_top_left, (a, b));
                prop_assert_eq!(from_bottom_right, (a, b));
            }

            #[test]
            fn fast_reject_always_appends(
                filled in 1usize..=6,
                w in 1usize..=48,
                h in 1usize..=8,
            ) {
                let matrix = GridMatrix::from_rows(vec![[1u32; GRID_WIDTH]; filled]);
                for policy in ScanPolicy::ALL {
                    prop_assert_eq!(find_coordinates(&matrix, w, h, policy), (0, filled));
                }
            }
        }
    }
}
