//! The nested-sequence shape shared by table data, diffs and anomaly masks.

use serde::Serialize;
use std::fmt;

/// Position of one cell inside a [`Grid`].
///
/// Vector grids report every cell in row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CellIndex {
    /// Layer for stacked (3D) grids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<usize>,
    pub row: usize,
    pub col: usize,
}

impl CellIndex {
    pub fn new(layer: Option<usize>, row: usize, col: usize) -> Self {
        Self { layer, row, col }
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.layer {
            Some(layer) => write!(f, "({layer}, {}, {})", self.row, self.col),
            None => write!(f, "({}, {})", self.row, self.col),
        }
    }
}

/// A vector, matrix or stack of matrices.
///
/// Serializes untagged so it matches the `number[] | number[][] |
/// number[][][]` wire shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Grid<T> {
    Vector(Vec<T>),
    Matrix(Vec<Vec<T>>),
    Stack(Vec<Vec<Vec<T>>>),
}

impl<T> Grid<T> {
    /// Returns the nesting depth (1, 2 or 3).
    pub fn depth(&self) -> usize {
        match self {
            Grid::Vector(_) => 1,
            Grid::Matrix(_) => 2,
            Grid::Stack(_) => 3,
        }
    }

    /// Returns the number of leaf cells.
    pub fn cell_count(&self) -> usize {
        match self {
            Grid::Vector(values) => values.len(),
            Grid::Matrix(rows) => rows.iter().map(Vec::len).sum(),
            Grid::Stack(layers) => layers
                .iter()
                .flat_map(|rows| rows.iter().map(Vec::len))
                .sum(),
        }
    }

    /// Returns the cell at `index`, if it exists in this grid's shape.
    pub fn get(&self, index: CellIndex) -> Option<&T> {
        match (self, index.layer) {
            (Grid::Vector(values), None) if index.row == 0 => values.get(index.col),
            (Grid::Matrix(rows), None) => rows.get(index.row)?.get(index.col),
            (Grid::Stack(layers), Some(layer)) => {
                layers.get(layer)?.get(index.row)?.get(index.col)
            }
            _ => None,
        }
    }

    /// Iterates over all cells in layer, row, column order.
    pub fn iter_indexed(&self) -> Box<dyn Iterator<Item = (CellIndex, &T)> + '_> {
        match self {
            Grid::Vector(values) => Box::new(
                values
                    .iter()
                    .enumerate()
                    .map(|(col, v)| (CellIndex::new(None, 0, col), v)),
            ),
            Grid::Matrix(rows) => Box::new(rows.iter().enumerate().flat_map(|(row, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .map(move |(col, v)| (CellIndex::new(None, row, col), v))
            })),
            Grid::Stack(layers) => {
                Box::new(layers.iter().enumerate().flat_map(|(layer, rows)| {
                    rows.iter().enumerate().flat_map(move |(row, cells)| {
                        cells
                            .iter()
                            .enumerate()
                            .map(move |(col, v)| (CellIndex::new(Some(layer), row, col), v))
                    })
                }))
            }
        }
    }
}
