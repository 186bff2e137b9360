//! Cell-aligned comparison of an original and a modified table.
//!
//! A [`TableDiff`] is derived data: it is recomputed from its two source
//! tables on demand and never mutated. Cells with `NaN` on either side are
//! incomparable: they are never reported as changed and their delta is `NaN`.

use serde::Serialize;
use tracing::instrument;

use crate::error::{Result, TuneError};
use crate::logging::LogConfig;
use crate::table::{Axes, CellIndex, Dimension, Grid, Table};

/// Display classification of a cell, derived from its delta alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Increased,
    Decreased,
    Unchanged,
}

/// Comparison of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellDiff {
    pub old: f64,
    pub new: f64,
    pub delta: f64,
    pub changed: bool,
}

impl CellDiff {
    /// Compares two cell values.
    pub fn compare(old: f64, new: f64) -> Self {
        if old.is_nan() || new.is_nan() {
            return Self {
                old,
                new,
                delta: f64::NAN,
                changed: false,
            };
        }
        Self {
            old,
            new,
            delta: new - old,
            changed: old != new,
        }
    }

    /// Returns false when either side is `NaN`.
    pub fn is_comparable(&self) -> bool {
        !self.old.is_nan() && !self.new.is_nan()
    }

    /// `Increased` if `delta > 0`, `Decreased` if `delta < 0`, else `Unchanged`.
    pub fn direction(&self) -> ChangeDirection {
        if self.delta > 0.0 {
            ChangeDirection::Increased
        } else if self.delta < 0.0 {
            ChangeDirection::Decreased
        } else {
            ChangeDirection::Unchanged
        }
    }

    /// Returns the change relative to the old value, in percent.
    ///
    /// `None` when the old value is zero or the cell is incomparable.
    pub fn change_percent(&self) -> Option<f64> {
        if !self.is_comparable() || self.old == 0.0 {
            return None;
        }
        Some(self.delta / self.old.abs() * 100.0)
    }
}

/// Aggregate statistics of a diff.
///
/// The `abs` aggregates are computed over changed cells only and are `None`
/// when no cell changed, so "nothing changed" is never confused with a
/// measured zero change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub total_cells: usize,
    pub changed_cell_count: usize,
    pub increased_count: usize,
    pub decreased_count: usize,
    pub incomparable_count: usize,
    pub avg_abs_change: Option<f64>,
    pub max_abs_change: Option<f64>,
    pub max_abs_change_percent: Option<f64>,
    /// `(min, max)` of the old values of changed cells
    pub old_range: Option<(f64, f64)>,
    /// `(min, max)` of the new values of changed cells
    pub new_range: Option<(f64, f64)>,
}

fn widen(range: Option<(f64, f64)>, value: f64) -> Option<(f64, f64)> {
    Some(match range {
        Some((lo, hi)) => (lo.min(value), hi.max(value)),
        None => (value, value),
    })
}

impl DiffSummary {
    fn from_cells<'a>(cells: impl Iterator<Item = &'a CellDiff>) -> Self {
        let mut summary = Self {
            total_cells: 0,
            changed_cell_count: 0,
            increased_count: 0,
            decreased_count: 0,
            incomparable_count: 0,
            avg_abs_change: None,
            max_abs_change: None,
            max_abs_change_percent: None,
            old_range: None,
            new_range: None,
        };
        let mut abs_total = 0.0;

        for cell in cells {
            summary.total_cells += 1;
            if !cell.is_comparable() {
                summary.incomparable_count += 1;
                continue;
            }
            if !cell.changed {
                continue;
            }

            summary.changed_cell_count += 1;
            match cell.direction() {
                ChangeDirection::Increased => summary.increased_count += 1,
                ChangeDirection::Decreased => summary.decreased_count += 1,
                ChangeDirection::Unchanged => {}
            }

            let abs = cell.delta.abs();
            abs_total += abs;
            summary.max_abs_change = Some(summary.max_abs_change.map_or(abs, |m| m.max(abs)));
            if let Some(pct) = cell.change_percent() {
                let pct = pct.abs();
                summary.max_abs_change_percent =
                    Some(summary.max_abs_change_percent.map_or(pct, |m| m.max(pct)));
            }
            summary.old_range = widen(summary.old_range, cell.old);
            summary.new_range = widen(summary.new_range, cell.new);
        }

        if summary.changed_cell_count > 0 {
            summary.avg_abs_change = Some(abs_total / summary.changed_cell_count as f64);
        }
        summary
    }

    /// Returns true if no comparable cell changed.
    pub fn is_unchanged(&self) -> bool {
        self.changed_cell_count == 0
    }
}

/// Per-cell comparison plus aggregates for two tables sharing axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDiff {
    axes: Axes,
    dimension: Dimension,
    cells: Grid<CellDiff>,
    summary: DiffSummary,
}

impl TableDiff {
    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Per-cell results in the original table's data shape.
    pub fn cells(&self) -> &Grid<CellDiff> {
        &self.cells
    }

    pub fn summary(&self) -> &DiffSummary {
        &self.summary
    }

    /// Returns the changed cells in layer, row, column order.
    pub fn changes(&self) -> Vec<(CellIndex, &CellDiff)> {
        self.cells
            .iter_indexed()
            .filter(|(_, cell)| cell.changed)
            .collect()
    }
}

/// Computes diffs between tables.
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    log: LogConfig,
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_config(log: LogConfig) -> Self {
        Self { log }
    }

    /// Compares `original` with `modified`.
    ///
    /// Fails with `AxisMismatch` if the axes differ in any label, if the
    /// dimensionality differs, or if stacked tables have different layer
    /// counts. Cells are never compared positionally across misaligned axes.
    #[instrument(skip_all, fields(dimension = %original.dimension()))]
    pub fn diff(&self, original: &Table, modified: &Table) -> Result<TableDiff> {
        original.axes().ensure_matches(modified.axes())?;

        if original.dimension() != modified.dimension() {
            return Err(TuneError::axis_mismatch(
                "dimension",
                format!(
                    "cannot compare a {} table with a {} table",
                    original.dimension(),
                    modified.dimension()
                ),
            ));
        }

        let old_planes = original.planes();
        let new_planes = modified.planes();
        if old_planes.len() != new_planes.len() {
            return Err(TuneError::axis_mismatch(
                "layers",
                format!(
                    "original has {} layers, modified has {}",
                    old_planes.len(),
                    new_planes.len()
                ),
            ));
        }

        let mut planes = Vec::with_capacity(old_planes.len());
        for (layer, (old, new)) in old_planes.iter().zip(&new_planes).enumerate() {
            planes.push(self.diff_plane(layer, old, new)?);
        }

        let cells = original.reshape(planes);
        let summary = DiffSummary::from_cells(cells.iter_indexed().map(|(_, c)| c));

        crate::log_debug!(
            self.log,
            total = summary.total_cells,
            changed = summary.changed_cell_count,
            incomparable = summary.incomparable_count,
            "Computed table diff"
        );

        Ok(TableDiff {
            axes: original.axes().clone(),
            dimension: original.dimension(),
            cells,
            summary,
        })
    }

    fn diff_plane(
        &self,
        layer: usize,
        old: &[Vec<f64>],
        new: &[Vec<f64>],
    ) -> Result<Vec<Vec<CellDiff>>> {
        if old.len() != new.len() {
            return Err(TuneError::axis_mismatch(
                "x",
                format!("layer {layer} has {} and {} rows", old.len(), new.len()),
            ));
        }

        let mut rows = Vec::with_capacity(old.len());
        for (r, (old_row, new_row)) in old.iter().zip(new).enumerate() {
            if old_row.len() != new_row.len() {
                return Err(TuneError::axis_mismatch(
                    "y",
                    format!(
                        "layer {layer} row {r} has {} and {} cells",
                        old_row.len(),
                        new_row.len()
                    ),
                ));
            }
            let row: Vec<CellDiff> = old_row
                .iter()
                .zip(new_row)
                .map(|(&o, &n)| CellDiff::compare(o, n))
                .collect();
            for (c, cell) in row.iter().enumerate().filter(|(_, cell)| cell.changed) {
                crate::log_cell!(
                    self.log,
                    layer,
                    row = r,
                    col = c,
                    old = cell.old,
                    new = cell.new,
                    "Cell changed"
                );
            }
            rows.push(row);
        }
        Ok(rows)
    }
}

/// Compares two tables with the default engine.
pub fn diff(original: &Table, modified: &Table) -> Result<TableDiff> {
    DiffEngine::new().diff(original, modified)
}
