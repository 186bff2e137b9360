//! Local-gradient anomaly detection within a single table.
//!
//! Each cell is compared with one neighbor in its own plane: the cell to its
//! left, or for the first column the cell above. A cell is flagged when the
//! relative jump from that neighbor exceeds the threshold. This runs on one
//! table alone and is independent of any diff.

use serde::Serialize;
use tracing::instrument;

use crate::error::{Result, TuneError};
use crate::logging::LogConfig;
use crate::table::{CellIndex, Grid, Table};

/// Default relative-change threshold (10%).
pub const DEFAULT_THRESHOLD: f64 = 0.10;

/// Per-cell flags in the same shape as the table they were computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AnomalyMask {
    cells: Grid<bool>,
}

impl AnomalyMask {
    pub fn cells(&self) -> &Grid<bool> {
        &self.cells
    }

    /// Returns whether the cell at `index` is flagged. Out-of-shape indices
    /// are never flagged.
    pub fn is_flagged(&self, index: CellIndex) -> bool {
        self.cells.get(index).copied().unwrap_or(false)
    }

    pub fn flagged_count(&self) -> usize {
        self.cells.iter_indexed().filter(|(_, f)| **f).count()
    }

    /// Returns the flagged cells in layer, row, column order.
    pub fn flagged(&self) -> Vec<CellIndex> {
        self.cells
            .iter_indexed()
            .filter(|(_, f)| **f)
            .map(|(index, _)| index)
            .collect()
    }
}

/// Flags cells that jump sharply relative to their neighbor.
#[derive(Debug, Clone)]
pub struct AnomalyHighlighter {
    threshold: f64,
    log: LogConfig,
}

impl Default for AnomalyHighlighter {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            log: LogConfig::default(),
        }
    }
}

impl AnomalyHighlighter {
    /// Creates a highlighter with the given relative threshold.
    ///
    /// # Errors
    /// Returns a configuration error if `threshold` is not finite or is negative.
    pub fn new(threshold: f64) -> Result<Self> {
        validate_threshold(threshold)?;
        Ok(Self {
            threshold,
            ..Self::default()
        })
    }

    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Computes the anomaly mask of `table`.
    ///
    /// Vectors are treated as a single row and stacks are checked layer by
    /// layer; neighbors never cross a layer boundary.
    #[instrument(skip_all, fields(dimension = %table.dimension(), threshold = self.threshold))]
    pub fn highlight(&self, table: &Table) -> AnomalyMask {
        let planes = table
            .planes()
            .into_iter()
            .enumerate()
            .map(|(layer, plane)| self.highlight_plane(layer, plane))
            .collect();
        let mask = AnomalyMask {
            cells: table.reshape(planes),
        };
        crate::log_debug!(
            self.log,
            cells = table.cell_count(),
            flagged = mask.flagged_count(),
            "Computed anomaly mask"
        );
        mask
    }

    fn highlight_plane(&self, layer: usize, rows: &[Vec<f64>]) -> Vec<Vec<bool>> {
        rows.iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(c, &value)| {
                        let neighbor = if c > 0 {
                            Some(row[c - 1])
                        } else if r > 0 {
                            rows[r - 1].first().copied()
                        } else {
                            None
                        };
                        let flagged = neighbor.is_some_and(|n| self.is_jump(value, n));
                        if flagged {
                            crate::log_cell!(
                                self.log,
                                layer,
                                row = r,
                                col = c,
                                value,
                                "Cell flagged as anomalous"
                            );
                        }
                        flagged
                    })
                    .collect()
            })
            .collect()
    }

    fn is_jump(&self, value: f64, neighbor: f64) -> bool {
        if neighbor == 0.0 || neighbor.is_nan() {
            return false;
        }
        // NaN values compare false here and stay unflagged
        (value - neighbor).abs() / neighbor.abs() > self.threshold
    }
}

fn validate_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(TuneError::configuration(format!(
            "anomaly threshold must be finite and non-negative, got: {threshold}"
        )));
    }
    Ok(())
}

/// Computes the anomaly mask of `table` with the given threshold.
pub fn highlight(table: &Table, threshold: f64) -> Result<AnomalyMask> {
    Ok(AnomalyHighlighter::new(threshold)?.highlight(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Axis;

    #[test]
    fn test_spike_in_row() {
        let table = Table::vector([1.0, 2.0, 3.0, 4.0], vec![10.0, 10.5, 20.0, 20.3]).unwrap();
        let mask = highlight(&table, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(mask.cells(), &Grid::Vector(vec![false, false, true, false]));
        assert_eq!(mask.flagged(), vec![CellIndex::new(None, 0, 2)]);
    }

    #[test]
    fn test_first_column_uses_cell_above() {
        let table = Table::matrix(
            [1.0, 2.0, 3.0],
            [1.0, 2.0],
            vec![vec![10.0, 10.0], vec![10.5, 10.5], vec![30.0, 30.0]],
        )
        .unwrap();
        let mask = AnomalyHighlighter::default().highlight(&table);
        assert_eq!(
            mask.cells(),
            &Grid::Matrix(vec![
                vec![false, false],
                vec![false, false],
                vec![true, false],
            ])
        );
    }

    #[test]
    fn test_zero_and_nan_neighbors_never_flag() {
        let table = Table::vector([1.0, 2.0, 3.0, 4.0], vec![0.0, 50.0, f64::NAN, 100.0]).unwrap();
        let mask = AnomalyHighlighter::default().highlight(&table);
        // 50 follows 0, 100 follows NaN, NaN itself cannot exceed a threshold
        assert_eq!(mask.flagged_count(), 0);
    }

    #[test]
    fn test_layers_are_independent() {
        let table = Table::stack(
            [1.0],
            [1.0, 2.0],
            Some(Axis::from([0.0, 1.0])),
            vec![vec![vec![10.0, 10.0]], vec![vec![100.0, 100.0]]],
        )
        .unwrap();
        let mask = AnomalyHighlighter::default().highlight(&table);
        assert_eq!(mask.flagged_count(), 0);
        assert!(!mask.is_flagged(CellIndex::new(Some(1), 0, 0)));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let table = Table::vector([1.0, 2.0], vec![10.0, 11.0]).unwrap();
        assert_eq!(highlight(&table, 0.10).unwrap().flagged_count(), 0);
        assert_eq!(highlight(&table, 0.05).unwrap().flagged_count(), 1);
        assert_eq!(highlight(&table, 0.0).unwrap().flagged_count(), 1);
    }

    #[test]
    fn test_invalid_thresholds() {
        for threshold in [f64::NAN, f64::INFINITY, -0.1] {
            let err = AnomalyHighlighter::new(threshold).unwrap_err();
            assert!(matches!(err, TuneError::Configuration(_)));
        }
    }

    #[test]
    fn test_mask_keeps_single_row_layout() {
        let table = Table::from_parts(
            crate::table::Axes::new().with_x([1.0, 2.0]),
            Grid::Matrix(vec![vec![1.0, 5.0]]),
        )
        .unwrap();
        let mask = AnomalyHighlighter::default().highlight(&table);
        assert_eq!(mask.cells(), &Grid::Matrix(vec![vec![false, true]]));
        assert_eq!(serde_json::to_string(&mask).unwrap(), "[[false,true]]");
    }
}
