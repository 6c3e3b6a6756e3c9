//! Layout math: grids, spacing and the small numeric helpers formations use.
//!
//! ## Key Features
//!
//! - **Matrix grids**: digit patterns like `["010", "234", "050"]` become
//!   slots in placement order
//! - **Circle grids**: evenly spaced slots with radial rotation
//! - **Unique draws**: integers that never repeat until the tracker resets
//! - **Light source**: drop shadows cast away from the container center
//!
//! Everything here is pure except where an RNG or tracker is passed in.

pub mod grid;
pub mod math;

pub use grid::{
    circle_point, compute_circle_grid, compute_matrix_grid, compute_matrix_rows, even_spacing,
    matrix_row_span, GridSlot, Point,
};
pub use math::{
    parabola_y, position_x, random_unique_int, shortest_angle_to, shuffle, Delta,
    LightSourceTracker, ShadowOffset, UniqueDrawTracker,
};
