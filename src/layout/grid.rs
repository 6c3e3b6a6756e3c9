//! Grid computation for drawn-card placement.
//!
//! All functions here are pure: the same inputs always produce the same
//! slots. Coordinates are percentages of the container.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::core::{LayoutError, LayoutResult};

/// A 2D point in container percentage space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One target position of a grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSlot {
    pub left: f64,
    pub top: f64,
    /// Radial orientation for circle grids.
    pub rotate: Option<f64>,
}

impl GridSlot {
    #[must_use]
    pub const fn at(left: f64, top: f64) -> Self {
        Self { left, top, rotate: None }
    }
}

/// An occupied matrix cell as found by the scan.
#[derive(Clone, Copy, Debug)]
struct MatrixCell {
    order: u32,
    row: usize,
    slot: GridSlot,
}

/// Scan a matrix pattern into occupied cells, in scan order.
///
/// The placement index of a cell is its digit, unless that index is already
/// taken. A colliding cell gets the running cell counter (1 + number of
/// occupied cells scanned before it), bumped past any index still taken.
/// This is the historical assignment; patterns that rely on repeated digits
/// get an order that is easy to misread, so new layouts should use distinct
/// digits.
fn scan_matrix<S: AsRef<str>>(
    rows: &[S],
    cell_width: f64,
    cell_height: f64,
    origin: Point,
    half_zero: bool,
) -> LayoutResult<Vec<MatrixCell>> {
    let first = rows.first().ok_or(LayoutError::EmptyPattern)?;
    let columns = first.as_ref().chars().count();

    let mut taken: FxHashSet<u32> = FxHashSet::default();
    let mut cells = Vec::new();
    let mut counter: u32 = 1;

    for (row, pattern) in rows.iter().enumerate() {
        let digits = pattern
            .as_ref()
            .chars()
            .enumerate()
            .map(|(col, ch)| {
                ch.to_digit(10)
                    .ok_or(LayoutError::NonDigit { row, col, found: ch })
            })
            .collect::<LayoutResult<Vec<u32>>>()?;

        if digits.len() > columns {
            return Err(LayoutError::RowTooLong { row, len: digits.len(), expected: columns });
        }

        // Missing trailing cells are empty and never emit a slot.
        let mut cursor = 0.0;
        for &digit in &digits {
            if digit > 0 {
                let mut order = if taken.contains(&digit) { counter } else { digit };
                while taken.contains(&order) {
                    order += 1;
                }
                taken.insert(order);
                counter += 1;

                let slot = GridSlot::at(
                    cursor * cell_width + origin.x,
                    row as f64 * cell_height + origin.y,
                );
                cells.push(MatrixCell { order, row, slot });
                cursor += 1.0;
            } else if half_zero {
                cursor += 0.5;
            } else {
                cursor += 1.0;
            }
        }
    }

    Ok(cells)
}

/// Slots of a matrix pattern, sorted by placement index.
///
/// ```
/// use tarot_deck::layout::{compute_matrix_grid, Point};
///
/// let grid = compute_matrix_grid(&["010", "234"], 10.0, 20.0, Point::new(5.0, 5.0), false).unwrap();
/// assert_eq!(grid.len(), 4);
/// assert_eq!((grid[0].left, grid[0].top), (15.0, 5.0));
/// ```
pub fn compute_matrix_grid<S: AsRef<str>>(
    rows: &[S],
    cell_width: f64,
    cell_height: f64,
    origin: Point,
    half_zero: bool,
) -> LayoutResult<Vec<GridSlot>> {
    let mut cells = scan_matrix(rows, cell_width, cell_height, origin, half_zero)?;
    cells.sort_by_key(|cell| cell.order);
    Ok(cells.into_iter().map(|cell| cell.slot).collect())
}

/// Slots of a matrix pattern grouped per row, in scan order.
///
/// Rows without occupied cells yield empty vectors.
pub fn compute_matrix_rows<S: AsRef<str>>(
    rows: &[S],
    cell_width: f64,
    cell_height: f64,
    origin: Point,
    half_zero: bool,
) -> LayoutResult<Vec<Vec<GridSlot>>> {
    let cells = scan_matrix(rows, cell_width, cell_height, origin, half_zero)?;
    let mut grouped = vec![Vec::new(); rows.len()];
    for cell in cells {
        grouped[cell.row].push(cell.slot);
    }
    Ok(grouped)
}

/// Width of a matrix row in cells, counting half cells for zeros when
/// `half_zero` is set.
#[must_use]
pub fn matrix_row_span(row: &str, half_zero: bool) -> f64 {
    if !half_zero {
        return row.chars().count() as f64;
    }
    row.chars()
        .map(|ch| if ch.to_digit(10).unwrap_or(0) > 0 { 1.0 } else { 0.5 })
        .sum()
}

/// Point on a circle, truncated to whole units.
#[must_use]
pub fn circle_point(center: Point, radius: f64, angle_deg: f64) -> Point {
    let angle = angle_deg.to_radians();
    Point::new(
        (center.x + radius * angle.cos()).trunc(),
        (center.y + radius * angle.sin()).trunc(),
    )
}

const ANGLE_EPSILON: f64 = 1e-9;

/// `count` slots evenly spaced on a circle.
///
/// Sector `i` sits at `i * 360/count + start_deg`. Slots whose sector angle
/// (without `start_deg`) lies strictly between 90 and 270 degrees are pushed
/// down by a third of the card height; exactly 90 or 270 get half of that.
/// The card width does not move the slot: slots anchor at the card's left
/// edge.
#[must_use]
pub fn compute_circle_grid(
    count: usize,
    radius: f64,
    center: Point,
    start_deg: f64,
    _card_width: f64,
    card_height: f64,
) -> Vec<GridSlot> {
    if count == 0 {
        return Vec::new();
    }

    let sector = 360.0 / count as f64;
    let correction = card_height / 3.0;

    (0..count)
        .map(|i| {
            let sector_angle = i as f64 * sector;
            let point = circle_point(center, radius, sector_angle + start_deg);

            let on_axis = (sector_angle - 90.0).abs() < ANGLE_EPSILON
                || (sector_angle - 270.0).abs() < ANGLE_EPSILON;
            let top = if on_axis {
                point.y + correction / 2.0
            } else if sector_angle > 90.0 && sector_angle < 270.0 {
                point.y + correction
            } else {
                point.y
            };

            GridSlot {
                left: point.x,
                top,
                rotate: Some(sector_angle),
            }
        })
        .collect()
}

/// Gap between `count` items of `item_width` spread over `total_width`,
/// leaving one trailing gap.
///
/// When the items do not fit, the returned value is `item_width` shrunk by
/// the overflow, so items overlap instead of failing.
#[must_use]
pub fn even_spacing(total_width: f64, item_width: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let n = count as f64;
    let gap = (total_width - n * item_width - item_width) / n;
    if gap < 0.0 {
        item_width + gap
    } else {
        gap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_matrix_default_cross_pattern() {
        let grid = compute_matrix_grid(&["010", "234", "050"], 10.0, 20.0, Point::new(0.0, 0.0), false)
            .unwrap();

        assert_eq!(grid.len(), 5);
        assert_eq!(grid[0], GridSlot::at(10.0, 0.0));
        assert_eq!(grid[1], GridSlot::at(0.0, 20.0));
        assert_eq!(grid[2], GridSlot::at(10.0, 20.0));
        assert_eq!(grid[3], GridSlot::at(20.0, 20.0));
        assert_eq!(grid[4], GridSlot::at(10.0, 40.0));
    }

    #[test]
    fn test_matrix_placement_order_follows_digits() {
        let grid = compute_matrix_grid(&["321"], 10.0, 10.0, Point::default(), false).unwrap();
        let lefts: Vec<f64> = grid.iter().map(|s| s.left).collect();
        assert_eq!(lefts, vec![20.0, 10.0, 0.0]);
    }

    #[test]
    fn test_matrix_repeated_digits_use_scan_counter() {
        // Second '1' collides and takes counter value 2, third takes 3.
        let grid = compute_matrix_grid(&["111"], 10.0, 10.0, Point::default(), false).unwrap();
        let lefts: Vec<f64> = grid.iter().map(|s| s.left).collect();
        assert_eq!(lefts, vec![0.0, 10.0, 20.0]);

        // '2' then '1' then '2': the last cell collides and takes counter 3.
        let grid = compute_matrix_grid(&["212"], 10.0, 10.0, Point::default(), false).unwrap();
        let lefts: Vec<f64> = grid.iter().map(|s| s.left).collect();
        assert_eq!(lefts, vec![10.0, 0.0, 20.0]);
    }

    #[test]
    fn test_matrix_collision_never_drops_a_cell() {
        // The counter for the second '2' is 2, already taken; it moves to 3.
        let grid = compute_matrix_grid(&["22", "1"], 10.0, 10.0, Point::default(), false).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0], GridSlot::at(0.0, 10.0));
        assert_eq!(grid[1], GridSlot::at(0.0, 0.0));
        assert_eq!(grid[2], GridSlot::at(10.0, 0.0));
    }

    #[test]
    fn test_matrix_half_zero_advances_half_cell() {
        let full = compute_matrix_grid(&["101"], 10.0, 10.0, Point::default(), false).unwrap();
        let half = compute_matrix_grid(&["101"], 10.0, 10.0, Point::default(), true).unwrap();

        assert_eq!(full[1].left, 20.0);
        assert_eq!(half[1].left, 15.0);
    }

    #[test]
    fn test_matrix_short_rows_are_padded() {
        let grid = compute_matrix_grid(&["123", "4"], 10.0, 10.0, Point::default(), false).unwrap();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[3], GridSlot::at(0.0, 10.0));
    }

    #[test]
    fn test_matrix_rejects_bad_patterns() {
        let empty: [&str; 0] = [];
        assert_eq!(
            compute_matrix_grid(&empty, 1.0, 1.0, Point::default(), false),
            Err(LayoutError::EmptyPattern)
        );
        assert_eq!(
            compute_matrix_grid(&["1a1"], 1.0, 1.0, Point::default(), false),
            Err(LayoutError::NonDigit { row: 0, col: 1, found: 'a' })
        );
        assert_eq!(
            compute_matrix_grid(&["11", "111"], 1.0, 1.0, Point::default(), false),
            Err(LayoutError::RowTooLong { row: 1, len: 3, expected: 2 })
        );
    }

    #[test]
    fn test_matrix_rows_agree_with_sorted_form() {
        let rows = ["010", "234", "050"];
        let sorted = compute_matrix_grid(&rows, 7.0, 9.0, Point::new(1.0, 2.0), false).unwrap();
        let grouped = compute_matrix_rows(&rows, 7.0, 9.0, Point::new(1.0, 2.0), false).unwrap();

        let flattened: Vec<GridSlot> = grouped.into_iter().flatten().collect();
        assert_eq!(flattened, sorted);
    }

    #[test]
    fn test_matrix_row_span() {
        assert_eq!(matrix_row_span("0120", false), 4.0);
        assert_eq!(matrix_row_span("0120", true), 3.0);
    }

    #[test]
    fn test_circle_rotation_is_cumulative_sector() {
        let grid = compute_circle_grid(8, 100.0, Point::default(), 0.0, 10.0, 30.0);
        assert_eq!(grid.len(), 8);
        assert_eq!(grid[0].rotate, Some(0.0));
        assert_eq!(grid[4].rotate, Some(180.0));
    }

    #[test]
    fn test_circle_vertical_correction() {
        let h = 30.0;
        let grid = compute_circle_grid(8, 100.0, Point::default(), 0.0, 10.0, h);

        // 45 degrees: no correction.
        let p45 = circle_point(Point::default(), 100.0, 45.0);
        assert!(approx(grid[1].top, p45.y));

        // 90 degrees: half correction.
        let p90 = circle_point(Point::default(), 100.0, 90.0);
        assert!(approx(grid[2].top, p90.y + h / 6.0));

        // 135 degrees: full correction.
        let p135 = circle_point(Point::default(), 100.0, 135.0);
        assert!(approx(grid[3].top, p135.y + h / 3.0));

        // 270 degrees: half correction again.
        let p270 = circle_point(Point::default(), 100.0, 270.0);
        assert!(approx(grid[6].top, p270.y + h / 6.0));
    }

    #[test]
    fn test_circle_correction_ignores_start_angle() {
        let grid = compute_circle_grid(4, 50.0, Point::new(50.0, 50.0), 45.0, 10.0, 30.0);
        // Sector 0 sits at 45 degrees but its sector angle is 0.
        let p = circle_point(Point::new(50.0, 50.0), 50.0, 45.0);
        assert!(approx(grid[0].top, p.y));
        assert_eq!(grid[0].left, p.x);
    }

    #[test]
    fn test_circle_empty() {
        assert!(compute_circle_grid(0, 100.0, Point::default(), 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_even_spacing() {
        assert!(approx(even_spacing(100.0, 10.0, 4), 12.5));
        assert!(approx(even_spacing(100.0, 30.0, 4), 17.5));
        assert_eq!(even_spacing(100.0, 30.0, 0), 0.0);
    }
}
