//! Dimensionality classification.
//!
//! Classification is total and purely shape driven, so it can run on input
//! that has not been validated yet. The check order matters: a single-row
//! matrix is displayed as a vector, matching the legacy `[Table2D]` grammar.

use crate::table::{Axes, Dimension, Grid, StructuredInput, Table};

/// Classifies structured input as 1D, 2D or 3D.
pub fn classify(input: &StructuredInput) -> Dimension {
    classify_shape(&input.axes, &input.data)
}

/// Classifies a table. Equivalent to [`Table::dimension`].
pub fn classify_table(table: &Table) -> Dimension {
    table.dimension()
}

/// Classifies raw axes and data.
///
/// - three levels of nesting: 3D
/// - otherwise exactly one row, or no (or an empty) `y` axis: 1D
/// - otherwise 2D
pub fn classify_shape<T>(axes: &Axes, data: &Grid<T>) -> Dimension {
    match data {
        Grid::Stack(_) => Dimension::Three,
        Grid::Vector(_) => Dimension::One,
        Grid::Matrix(rows) if rows.len() == 1 || axes.non_empty_y().is_none() => Dimension::One,
        Grid::Matrix(_) => Dimension::Two,
    }
}
