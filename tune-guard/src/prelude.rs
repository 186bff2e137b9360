//! Prelude for commonly used types and functions in tune-guard.

pub use crate::anomaly::{highlight, AnomalyHighlighter, AnomalyMask};
pub use crate::category::{ChangePriority, TableCategory};
pub use crate::classify::classify;
pub use crate::config::GuardConfig;
pub use crate::diff::{diff, CellDiff, ChangeDirection, DiffEngine, DiffSummary, TableDiff};
pub use crate::error::{Result, TuneError};
pub use crate::export::{
    to_delimited_text, to_rows, ChangeListExporter, ExportCell, ExportOptions, ExportRow,
    TableExporter,
};
pub use crate::logging::LogConfig;
pub use crate::normalize::{normalize, normalize_json, TableNormalizer};
pub use crate::table::{
    Axes, Axis, CellIndex, Dimension, Grid, StructuredInput, Table, TableInput,
};
