//! Axis labels and the axis mapping carried by every table.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::input::WireNumber;
use crate::error::{Result, TuneError};

/// Returns true when two axis labels are structurally equal.
///
/// Labels parsed from malformed tokens are `NaN`; two `NaN` labels in the same
/// position count as equal so that a table always matches its own axes.
pub(crate) fn labels_match(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// An ordered sequence of numeric coordinate labels (RPM, load, gear, ...).
///
/// The order defines row/column/layer order and is never re-sorted.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Axis(Vec<f64>);

impl Axis {
    /// Creates an axis from labels in the given order.
    pub fn new(labels: Vec<f64>) -> Self {
        Self(labels)
    }

    /// Returns the labels in order.
    pub fn labels(&self) -> &[f64] {
        &self.0
    }

    /// Returns the label at the given position.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Returns the number of labels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the axis has no labels.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the first position where the two axes disagree, if any.
    ///
    /// A length difference is reported at the length of the shorter axis.
    pub fn first_difference(&self, other: &Axis) -> Option<usize> {
        let shared = self.len().min(other.len());
        (0..shared)
            .find(|&i| !labels_match(self.0[i], other.0[i]))
            .or_else(|| (self.len() != other.len()).then_some(shared))
    }
}

impl PartialEq for Axis {
    fn eq(&self, other: &Self) -> bool {
        self.first_difference(other).is_none()
    }
}

impl From<Vec<f64>> for Axis {
    fn from(labels: Vec<f64>) -> Self {
        Self(labels)
    }
}

impl<const N: usize> From<[f64; N]> for Axis {
    fn from(labels: [f64; N]) -> Self {
        Self(labels.to_vec())
    }
}

impl<'de> Deserialize<'de> for Axis {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let labels = Vec::<WireNumber>::deserialize(deserializer)?;
        Ok(Self(labels.into_iter().map(f64::from).collect()))
    }
}

/// The axis mapping of a table: `x` for rows, `y` for columns, `z` for layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Axis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Axis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<Axis>,
}

impl Axes {
    /// Creates an empty axis mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `x` axis.
    pub fn with_x(mut self, x: impl Into<Axis>) -> Self {
        self.x = Some(x.into());
        self
    }

    /// Sets the `y` axis.
    pub fn with_y(mut self, y: impl Into<Axis>) -> Self {
        self.y = Some(y.into());
        self
    }

    /// Sets the `z` axis.
    pub fn with_z(mut self, z: impl Into<Axis>) -> Self {
        self.z = Some(z.into());
        self
    }

    /// Returns true if no axis is set.
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }

    /// Returns a copy where every axis present in `overrides` replaces ours.
    pub fn overlay(&self, overrides: &Axes) -> Axes {
        Axes {
            x: overrides.x.clone().or_else(|| self.x.clone()),
            y: overrides.y.clone().or_else(|| self.y.clone()),
            z: overrides.z.clone().or_else(|| self.z.clone()),
        }
    }

    /// Returns the `y` axis only if it has labels.
    pub(crate) fn non_empty_y(&self) -> Option<&Axis> {
        self.y.as_ref().filter(|y| !y.is_empty())
    }

    /// Fails with `AxisMismatch` unless both mappings are structurally equal.
    pub fn ensure_matches(&self, other: &Axes) -> Result<()> {
        for (name, ours, theirs) in [
            ("x", &self.x, &other.x),
            ("y", &self.y, &other.y),
            ("z", &self.z, &other.z),
        ] {
            match (ours, theirs) {
                (None, None) => {}
                (Some(a), Some(b)) => {
                    if let Some(pos) = a.first_difference(b) {
                        return Err(TuneError::axis_mismatch(
                            name,
                            format!(
                                "axes differ at position {pos} (lengths {} and {})",
                                a.len(),
                                b.len()
                            ),
                        ));
                    }
                }
                (Some(_), None) | (None, Some(_)) => {
                    return Err(TuneError::axis_mismatch(
                        name,
                        "axis is present on only one table",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, label) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{label}")?;
        }
        write!(f, "]")
    }
}
