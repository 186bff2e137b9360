//! Wire forms accepted from the session API.
//!
//! A table object on the wire is `{ "axes": {...}, "data": ... }`. When `data`
//! is a string it holds a legacy text block and the sibling `axes` are caller
//! overrides; otherwise `data` is a nested numeric array. JSON `null` cells are
//! read as `NaN` (the serializer writes `NaN` back as `null`).

use serde::{Deserialize, Deserializer, Serialize};

use super::{Axes, Grid};
use crate::error::{Result, TuneError};

/// A number that may arrive as JSON `null`.
pub(crate) struct WireNumber(f64);

impl From<WireNumber> for f64 {
    fn from(n: WireNumber) -> Self {
        n.0
    }
}

impl<'de> Deserialize<'de> for WireNumber {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Self(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN)))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireData {
    Text(String),
    Vector(Vec<WireNumber>),
    Matrix(Vec<Vec<WireNumber>>),
    Stack(Vec<Vec<Vec<WireNumber>>>),
}

fn numbers(row: Vec<WireNumber>) -> Vec<f64> {
    row.into_iter().map(f64::from).collect()
}

#[derive(Deserialize)]
struct WireTable {
    #[serde(default)]
    axes: Axes,
    data: WireData,
}

/// Structured table input: axes plus nested numeric data, not yet validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireTable")]
pub struct StructuredInput {
    pub axes: Axes,
    pub data: Grid<f64>,
}

impl StructuredInput {
    pub fn new(axes: Axes, data: Grid<f64>) -> Self {
        Self { axes, data }
    }
}

impl TryFrom<WireTable> for StructuredInput {
    type Error = TuneError;

    fn try_from(wire: WireTable) -> Result<Self> {
        match TableInput::from(wire) {
            TableInput::Structured(input) => Ok(input),
            TableInput::Text { .. } => Err(TuneError::Serialization(
                "expected structured table data, found a legacy text block".to_string(),
            )),
        }
    }
}

/// Either encoding of a calibration table, resolved once by the normalizer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WireTable")]
pub enum TableInput {
    /// A legacy `[Table2D]`/`[Table3D]` text block with optional axis
    /// overrides that take precedence over axes parsed from the text.
    Text { block: String, axes: Axes },
    /// Axes and nested data already in canonical shape.
    Structured(StructuredInput),
}

impl TableInput {
    /// Creates a text input without axis overrides.
    pub fn text(block: impl Into<String>) -> Self {
        Self::Text {
            block: block.into(),
            axes: Axes::default(),
        }
    }

    /// Creates a text input whose parsed axes are replaced by `axes`.
    pub fn text_with_axes(block: impl Into<String>, axes: Axes) -> Self {
        Self::Text {
            block: block.into(),
            axes,
        }
    }

    /// Creates a structured input.
    pub fn structured(axes: Axes, data: Grid<f64>) -> Self {
        Self::Structured(StructuredInput::new(axes, data))
    }

    /// Parses a wire table object from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<WireTable> for TableInput {
    fn from(wire: WireTable) -> Self {
        let data = match wire.data {
            WireData::Text(block) => {
                return Self::Text {
                    block,
                    axes: wire.axes,
                }
            }
            WireData::Vector(values) => Grid::Vector(numbers(values)),
            WireData::Matrix(rows) => Grid::Matrix(rows.into_iter().map(numbers).collect()),
            WireData::Stack(layers) => Grid::Stack(
                layers
                    .into_iter()
                    .map(|rows| rows.into_iter().map(numbers).collect())
                    .collect(),
            ),
        };
        Self::Structured(StructuredInput::new(wire.axes, data))
    }
}

impl From<StructuredInput> for TableInput {
    fn from(input: StructuredInput) -> Self {
        Self::Structured(input)
    }
}
