//! # Tune Guard - Calibration Table Comparison for Rust
//!
//! Tune Guard is the table core of an engine-calibration review tool. It turns
//! calibration tables delivered either as structured JSON or as legacy
//! plain-text blocks into one validated [`Table`](table::Table) model, and then
//! compares, inspects and exports them.
//!
//! ## Quick Start
//!
//! ```rust
//! use tune_guard::prelude::*;
//!
//! # fn main() -> tune_guard::error::Result<()> {
//! let original = normalize(TableInput::text(
//!     "[Table3D]\n0.5 1.0\n800 10 11\n1600 12 13",
//! ))?;
//! let modified = normalize_json(
//!     r#"{"axes": {"x": [800, 1600], "y": [0.5, 1.0]}, "data": [[10, 11], [12, 15]]}"#,
//! )?;
//!
//! // Cell-aligned comparison; differing axes are an error, never a silent misalignment
//! let diff = diff(&original, &modified)?;
//! assert_eq!(diff.summary().changed_cell_count, 1);
//! assert_eq!(diff.summary().max_abs_change, Some(2.0));
//!
//! // Local-gradient check within a single table
//! let mask = AnomalyHighlighter::default().highlight(&modified);
//! assert_eq!(mask.flagged_count(), 2);
//!
//! // Flat export for spreadsheets
//! let csv = to_delimited_text(&to_rows(&modified));
//! assert_eq!(csv, "10,11\n12,15");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`table`**: axes, grids, the wire input union and the canonical `Table`
//! - **`legacy`**: parser for `[Table2D]` / `[Table3D]` text blocks
//! - **`normalize`**: the single boundary where any input becomes a `Table`
//! - **`classify`**: shape-driven 1D / 2D / 3D classification
//! - **`diff`**: per-cell deltas and aggregate statistics
//! - **`anomaly`**: neighbor-jump highlighting
//! - **`export`**: flat rows and delimited text for tables and diffs
//! - **`category`**: table category and change priority from table names
//! - **`config`**: serde-backed settings for highlighting and export
//! - **`logging`**: `tracing` configuration helpers
//!
//! All operations are synchronous and pure over immutable inputs; independent
//! calls can run in parallel without coordination.

pub mod anomaly;
pub mod category;
pub mod classify;
pub mod config;
pub mod diff;
pub mod error;
pub mod export;
pub mod legacy;
pub mod logging;
pub mod normalize;
pub mod prelude;
pub mod table;
