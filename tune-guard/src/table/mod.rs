//! Canonical calibration table model.
//!
//! A [`Table`] is always valid: its data agrees with its axes. It is built once
//! from a [`StructuredInput`] (directly or via the legacy text parser) and is
//! then dispatched on by variant instead of by re-inspecting nesting depth.
//!
//! ## Shape rules
//!
//! | data            | axes                          | variant  |
//! |-----------------|-------------------------------|----------|
//! | `[v; |x|]`      | `x`                           | `Vector` |
//! | `[[v; |x|]]`    | `x`, no `y`                   | `Vector` |
//! | `[[v; |y|]]`    | `x` of length 1, `y`          | `Vector` |
//! | `|x|` rows      | `x`, `y` (each row `|y|`)     | `Matrix` |
//! | layers          | `x`, `y`, optional `z`        | `Stack`  |

mod axis;
mod grid;
mod input;

pub use axis::{Axes, Axis};
pub use grid::{CellIndex, Grid};
pub use input::{StructuredInput, TableInput};

pub(crate) use axis::labels_match;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::slice;

use crate::classify::classify_shape;
use crate::error::{Result, TuneError};

/// Dimensionality of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    One,
    Two,
    Three,
}

impl Dimension {
    /// Returns the dimension as a number (1, 2 or 3).
    pub fn as_u8(self) -> u8 {
        match self {
            Dimension::One => 1,
            Dimension::Two => 2,
            Dimension::Three => 3,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}D", self.as_u8())
    }
}

impl Serialize for Dimension {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

/// How a one-dimensional table's data arrived on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorLayout {
    /// `[v0, v1, ...]`
    Flat,
    /// `[[v0, v1, ...]]`, the legacy `[Table2D]` convention
    SingleRow,
}

/// A one-dimensional table displayed as a single row.
#[derive(Debug, Clone)]
pub struct Table1D {
    axes: Axes,
    values: Vec<f64>,
    layout: VectorLayout,
}

impl Table1D {
    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn layout(&self) -> VectorLayout {
        self.layout
    }

    /// Returns the axis labelling the values: `y` for a single `x` row that
    /// carries a column axis, `x` otherwise.
    pub fn labels(&self) -> Option<&Axis> {
        self.axes.non_empty_y().or(self.axes.x.as_ref())
    }
}

/// A two-dimensional table: `|x|` rows of `|y|` cells.
#[derive(Debug, Clone)]
pub struct Table2D {
    axes: Axes,
    rows: Vec<Vec<f64>>,
}

impl Table2D {
    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }
}

/// A stack of two-dimensional layers, one per `z` label when `z` is present.
#[derive(Debug, Clone)]
pub struct Table3D {
    axes: Axes,
    layers: Vec<Vec<Vec<f64>>>,
}

impl Table3D {
    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    pub fn layers(&self) -> &[Vec<Vec<f64>>] {
        &self.layers
    }

    /// Returns the label of layer `index`: its `z` value when present,
    /// otherwise the index itself.
    pub fn layer_label(&self, index: usize) -> String {
        layer_label(&self.axes, index)
    }
}

/// Cell equality with the same `NaN` rule as axis labels, so a table with
/// unusable cells still equals itself.
fn cells_match(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| labels_match(x, y))
}

fn planes_match(a: &[Vec<f64>], b: &[Vec<f64>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| cells_match(x, y))
}

impl PartialEq for Table1D {
    fn eq(&self, other: &Self) -> bool {
        self.layout == other.layout
            && self.axes == other.axes
            && cells_match(&self.values, &other.values)
    }
}

impl PartialEq for Table2D {
    fn eq(&self, other: &Self) -> bool {
        self.axes == other.axes && planes_match(&self.rows, &other.rows)
    }
}

impl PartialEq for Table3D {
    fn eq(&self, other: &Self) -> bool {
        self.axes == other.axes
            && self.layers.len() == other.layers.len()
            && self
                .layers
                .iter()
                .zip(&other.layers)
                .all(|(a, b)| planes_match(a, b))
    }
}

pub(crate) fn layer_label(axes: &Axes, index: usize) -> String {
    match axes.z.as_ref().and_then(|z| z.get(index)) {
        Some(label) => label.to_string(),
        None => index.to_string(),
    }
}

/// The canonical in-memory calibration table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "StructuredInput")]
pub enum Table {
    Vector(Table1D),
    Matrix(Table2D),
    Stack(Table3D),
}

impl Table {
    /// Builds a validated table from axes and data.
    pub fn from_parts(axes: Axes, data: Grid<f64>) -> Result<Self> {
        Self::try_from(StructuredInput::new(axes, data))
    }

    /// Builds a one-dimensional table from an `x` axis and its values.
    pub fn vector(x: impl Into<Axis>, values: Vec<f64>) -> Result<Self> {
        Self::from_parts(Axes::new().with_x(x), Grid::Vector(values))
    }

    /// Builds a table from row-major matrix data.
    ///
    /// A single row classifies as a one-dimensional table.
    pub fn matrix(x: impl Into<Axis>, y: impl Into<Axis>, rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_parts(Axes::new().with_x(x).with_y(y), Grid::Matrix(rows))
    }

    /// Builds a stacked table; `z` labels the layers when given.
    pub fn stack(
        x: impl Into<Axis>,
        y: impl Into<Axis>,
        z: Option<Axis>,
        layers: Vec<Vec<Vec<f64>>>,
    ) -> Result<Self> {
        let mut axes = Axes::new().with_x(x).with_y(y);
        axes.z = z;
        Self::from_parts(axes, Grid::Stack(layers))
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Table::Vector(_) => Dimension::One,
            Table::Matrix(_) => Dimension::Two,
            Table::Stack(_) => Dimension::Three,
        }
    }

    pub fn axes(&self) -> &Axes {
        match self {
            Table::Vector(t) => &t.axes,
            Table::Matrix(t) => &t.axes,
            Table::Stack(t) => &t.axes,
        }
    }

    /// Returns the table as 2D planes: one plane holding a single row for
    /// vectors, the matrix itself, or every layer of a stack.
    pub fn planes(&self) -> Vec<&[Vec<f64>]> {
        match self {
            Table::Vector(t) => vec![slice::from_ref(&t.values)],
            Table::Matrix(t) => vec![t.rows.as_slice()],
            Table::Stack(t) => t.layers.iter().map(Vec::as_slice).collect(),
        }
    }

    /// Returns the number of cells.
    pub fn cell_count(&self) -> usize {
        self.planes()
            .iter()
            .flat_map(|plane| plane.iter().map(Vec::len))
            .sum()
    }

    /// Returns a copy of the data in its wire shape.
    pub fn data(&self) -> Grid<f64> {
        let planes = self
            .planes()
            .into_iter()
            .map(|plane| plane.to_vec())
            .collect();
        self.reshape(planes)
    }

    /// Converts the table back into its structured wire form.
    pub fn to_structured(&self) -> StructuredInput {
        StructuredInput::new(self.axes().clone(), self.data())
    }

    /// Rebuilds per-plane results into a grid with this table's data shape.
    pub(crate) fn reshape<T>(&self, planes: Vec<Vec<Vec<T>>>) -> Grid<T> {
        match self {
            Table::Vector(t) => {
                let row = planes
                    .into_iter()
                    .next()
                    .and_then(|plane| plane.into_iter().next())
                    .unwrap_or_default();
                match t.layout {
                    VectorLayout::Flat => Grid::Vector(row),
                    VectorLayout::SingleRow => Grid::Matrix(vec![row]),
                }
            }
            Table::Matrix(_) => Grid::Matrix(planes.into_iter().next().unwrap_or_default()),
            Table::Stack(_) => Grid::Stack(planes),
        }
    }
}

impl From<Table> for StructuredInput {
    fn from(table: Table) -> Self {
        table.to_structured()
    }
}

fn require_x(axes: &Axes) -> Result<&Axis> {
    axes.x
        .as_ref()
        .ok_or_else(|| TuneError::shape("table has no x axis"))
}

fn reject_z(axes: &Axes, data_kind: &str) -> Result<()> {
    if axes.z.is_some() {
        return Err(TuneError::shape(format!(
            "z axis supplied for {data_kind} data"
        )));
    }
    Ok(())
}

fn check_plane(rows: &[Vec<f64>], x: &Axis, y: &Axis, context: &str) -> Result<()> {
    if rows.len() != x.len() {
        return Err(TuneError::shape(format!(
            "{context}has {} rows, x axis has {} labels",
            rows.len(),
            x.len()
        )));
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != y.len() {
            return Err(TuneError::shape(format!(
                "{context}row {i} has {} cells, y axis has {} labels",
                row.len(),
                y.len()
            )));
        }
    }
    Ok(())
}

impl TryFrom<StructuredInput> for Table {
    type Error = TuneError;

    fn try_from(input: StructuredInput) -> Result<Self> {
        let dimension = classify_shape(&input.axes, &input.data);
        let StructuredInput { axes, data } = input;

        match data {
            Grid::Vector(values) => {
                let x = require_x(&axes)?;
                if axes.y.is_some() {
                    return Err(TuneError::shape("y axis supplied for vector data"));
                }
                reject_z(&axes, "vector")?;
                if values.len() != x.len() {
                    return Err(TuneError::shape(format!(
                        "vector has {} values, x axis has {} labels",
                        values.len(),
                        x.len()
                    )));
                }
                Ok(Table::Vector(Table1D {
                    axes,
                    values,
                    layout: VectorLayout::Flat,
                }))
            }
            Grid::Matrix(mut rows) => {
                let x = require_x(&axes)?;
                reject_z(&axes, "matrix")?;
                match (dimension, axes.non_empty_y()) {
                    (Dimension::One, Some(y)) => {
                        check_plane(&rows, x, y, "single-row table ")?;
                    }
                    (Dimension::One, None) => {
                        if rows.len() != 1 {
                            return Err(TuneError::shape(format!(
                                "{} rows supplied without a y axis",
                                rows.len()
                            )));
                        }
                        if rows[0].len() != x.len() {
                            return Err(TuneError::shape(format!(
                                "row has {} cells, x axis has {} labels",
                                rows[0].len(),
                                x.len()
                            )));
                        }
                    }
                    (_, Some(y)) => {
                        check_plane(&rows, x, y, "")?;
                        return Ok(Table::Matrix(Table2D { axes, rows }));
                    }
                    (_, None) => return Err(TuneError::shape("matrix data has no y axis")),
                }
                let values = rows.pop().unwrap_or_default();
                Ok(Table::Vector(Table1D {
                    axes,
                    values,
                    layout: VectorLayout::SingleRow,
                }))
            }
            Grid::Stack(layers) => {
                let x = require_x(&axes)?;
                let y = axes
                    .y
                    .as_ref()
                    .ok_or_else(|| TuneError::shape("stacked table has no y axis"))?;
                if let Some(z) = &axes.z {
                    if layers.len() != z.len() {
                        return Err(TuneError::shape(format!(
                            "stack has {} layers, z axis has {} labels",
                            layers.len(),
                            z.len()
                        )));
                    }
                }
                for (i, layer) in layers.iter().enumerate() {
                    check_plane(layer, x, y, &format!("layer {i} "))?;
                }
                Ok(Table::Stack(Table3D { axes, layers }))
            }
        }
    }
}
