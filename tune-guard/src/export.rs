//! Flat row export of tables and diffs.
//!
//! Exports are for humans and spreadsheets. They are not a round-trip format:
//! axis labels are only written when asked for, and nothing reads them back.
//!
//! Stacked tables are flattened layer by layer:
//!
//! ```text
//! Layer 0
//! 1,2
//!
//! Layer 1
//! 3,4
//!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};

use crate::category::{ChangePriority, TableCategory};
use crate::diff::TableDiff;
use crate::error::{Result, TuneError};
use crate::table::{layer_label, Axes, CellIndex, Dimension, Table};

/// One exported cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportCell {
    Text(String),
    Number(f64),
}

/// One exported row. An empty row is a layer separator.
pub type ExportRow = Vec<ExportCell>;

impl ExportCell {
    fn empty() -> Self {
        ExportCell::Text(String::new())
    }

    fn optional(value: Option<f64>) -> Self {
        value.map_or_else(Self::empty, ExportCell::Number)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ExportCell::Number(n) => Some(*n),
            ExportCell::Text(_) => None,
        }
    }
}

impl From<f64> for ExportCell {
    fn from(value: f64) -> Self {
        ExportCell::Number(value)
    }
}

impl From<&str> for ExportCell {
    fn from(value: &str) -> Self {
        ExportCell::Text(value.to_string())
    }
}

impl From<String> for ExportCell {
    fn from(value: String) -> Self {
        ExportCell::Text(value)
    }
}

impl fmt::Display for ExportCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportCell::Text(text) => f.write_str(text),
            ExportCell::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Configuration for exporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Write a header row of column labels and a leading column of row labels
    pub include_axis_labels: bool,
    /// Follow the last layer of a stack with a blank row like every other layer
    pub trailing_layer_separator: bool,
    /// Cell delimiter for delimited text
    pub delimiter: char,
    /// Fixed number of decimals for numbers; `None` writes them verbatim
    pub precision: Option<usize>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_axis_labels: false,
            trailing_layer_separator: true,
            delimiter: ',',
            precision: None,
        }
    }
}

impl ExportOptions {
    /// Labelled export for opening in a spreadsheet.
    pub fn spreadsheet() -> Self {
        Self {
            include_axis_labels: true,
            ..Self::default()
        }
    }

    /// Tab-separated export without a trailing separator, for pasting.
    pub fn clipboard() -> Self {
        Self {
            include_axis_labels: false,
            trailing_layer_separator: false,
            delimiter: '\t',
            precision: None,
        }
    }

    pub fn with_axis_labels(mut self, include: bool) -> Self {
        self.include_axis_labels = include;
        self
    }

    pub fn with_trailing_layer_separator(mut self, trailing: bool) -> Self {
        self.trailing_layer_separator = trailing;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_precision(mut self, decimals: usize) -> Self {
        self.precision = Some(decimals);
        self
    }

    /// Rejects delimiters that would make rendered rows ambiguous: quote and
    /// line break characters, and anything that can appear inside a rendered
    /// number (digits, letters of `NaN`/`inf`/exponents, sign and decimal point).
    pub fn validate(&self) -> Result<()> {
        let d = self.delimiter;
        if d.is_ascii_alphanumeric() || matches!(d, '"' | '\n' | '\r' | '.' | '-' | '+') {
            return Err(TuneError::configuration(format!(
                "export delimiter {d:?} cannot be used"
            )));
        }
        Ok(())
    }

    /// Renders rows as delimited text.
    ///
    /// Rows are joined with `\n` and no newline is added after the last row,
    /// so a trailing empty row shows up as a trailing newline.
    pub fn render(&self, rows: &[ExportRow]) -> String {
        let mut output = String::new();
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    output.push(self.delimiter);
                }
                self.write_cell(&mut output, cell);
            }
        }
        output
    }

    fn write_cell(&self, output: &mut String, cell: &ExportCell) {
        let rendered;
        let text = match (cell, self.precision) {
            (ExportCell::Number(n), Some(decimals)) if n.is_finite() => {
                rendered = format!("{n:.decimals$}");
                rendered.as_str()
            }
            (ExportCell::Number(n), _) => {
                rendered = n.to_string();
                rendered.as_str()
            }
            (ExportCell::Text(text), _) => text.as_str(),
        };
        // Numbers are quoted too when the delimiter collides with them
        if self.needs_quotes(text) {
            output.push('"');
            output.push_str(&text.replace('"', "\"\""));
            output.push('"');
        } else {
            output.push_str(text);
        }
    }

    fn needs_quotes(&self, text: &str) -> bool {
        text.contains(self.delimiter) || text.contains(['"', '\n', '\r'])
    }
}

/// Flattens tables into export rows.
#[derive(Debug, Clone, Default)]
pub struct TableExporter {
    options: ExportOptions,
}

impl TableExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Converts a table into rows.
    ///
    /// Vector and matrix rows are emitted as they are stored. Each layer of a
    /// stack gets a `Layer <label>` marker row before its rows and a blank row
    /// after them.
    #[instrument(skip_all, fields(dimension = %table.dimension()))]
    pub fn to_rows(&self, table: &Table) -> Vec<ExportRow> {
        let rows = match table {
            Table::Vector(t) => self.vector_rows(t.axes(), t.values()),
            Table::Matrix(t) => self.plane_rows(t.axes(), t.rows()),
            Table::Stack(t) => {
                let count = t.layers().len();
                let mut rows = Vec::new();
                for (i, layer) in t.layers().iter().enumerate() {
                    rows.push(vec![ExportCell::Text(format!("Layer {}", t.layer_label(i)))]);
                    rows.extend(self.plane_rows(t.axes(), layer));
                    if i + 1 < count || self.options.trailing_layer_separator {
                        rows.push(Vec::new());
                    }
                }
                rows
            }
        };
        debug!(rows = rows.len(), "Exported table rows");
        rows
    }

    /// Converts a table directly into delimited text.
    pub fn to_delimited_text(&self, table: &Table) -> String {
        self.options.render(&self.to_rows(table))
    }

    fn vector_rows(&self, axes: &Axes, values: &[f64]) -> Vec<ExportRow> {
        let data = numbers(values);
        if !self.options.include_axis_labels {
            return vec![data];
        }
        match (axes.non_empty_y(), axes.x.as_ref()) {
            // A single x row labelled by y: lay it out like a one-row matrix
            (Some(y), Some(x)) => {
                let mut header = vec![ExportCell::empty()];
                header.extend(numbers(y.labels()));
                let mut row = vec![ExportCell::optional(x.get(0))];
                row.extend(data);
                vec![header, row]
            }
            (_, Some(x)) => vec![numbers(x.labels()), data],
            (_, None) => vec![data],
        }
    }

    fn plane_rows(&self, axes: &Axes, rows: &[Vec<f64>]) -> Vec<ExportRow> {
        if !self.options.include_axis_labels {
            return rows.iter().map(|row| numbers(row)).collect();
        }
        let mut out = Vec::with_capacity(rows.len() + 1);
        let mut header = vec![ExportCell::empty()];
        if let Some(y) = &axes.y {
            header.extend(numbers(y.labels()));
        }
        out.push(header);
        for (i, row) in rows.iter().enumerate() {
            let label = axes.x.as_ref().and_then(|x| x.get(i));
            let mut cells = vec![ExportCell::optional(label)];
            cells.extend(numbers(row));
            out.push(cells);
        }
        out
    }
}

fn numbers(values: &[f64]) -> ExportRow {
    values.iter().copied().map(ExportCell::Number).collect()
}

/// Column names of a change list export.
pub const CHANGE_LIST_COLUMNS: [&str; 9] = [
    "layer",
    "row",
    "col",
    "x",
    "y",
    "old",
    "new",
    "delta",
    "change_percent",
];

/// Exports a diff as one row per cell change.
#[derive(Debug, Clone, Default)]
pub struct ChangeListExporter {
    options: ExportOptions,
    table_name: Option<String>,
    include_unchanged: bool,
}

impl ChangeListExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Prefixes every row with the table name, its category and priority.
    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    /// Lists every cell instead of only the changed ones.
    pub fn include_unchanged(mut self, include: bool) -> Self {
        self.include_unchanged = include;
        self
    }

    /// Returns the header row.
    pub fn header(&self) -> ExportRow {
        let prefix: &[&str] = if self.table_name.is_some() {
            &["table", "category", "priority"]
        } else {
            &[]
        };
        prefix
            .iter()
            .chain(CHANGE_LIST_COLUMNS.iter())
            .map(|name| ExportCell::from(*name))
            .collect()
    }

    /// Converts a diff into a header row followed by one row per cell.
    #[instrument(skip_all, fields(changed = diff.summary().changed_cell_count))]
    pub fn to_rows(&self, diff: &TableDiff) -> Vec<ExportRow> {
        let prefix = self.table_name.as_ref().map(|name| {
            vec![
                ExportCell::from(name.as_str()),
                ExportCell::from(TableCategory::from_name(name).as_str()),
                ExportCell::from(ChangePriority::from_table_name(name).as_str()),
            ]
        });

        let mut rows = vec![self.header()];
        for (index, cell) in diff.cells().iter_indexed() {
            if !cell.changed && !self.include_unchanged {
                continue;
            }
            let (x, y) = cell_labels(diff.axes(), diff.dimension(), index);
            let mut row = prefix.clone().unwrap_or_default();
            row.extend([
                index
                    .layer
                    .map_or_else(ExportCell::empty, |l| layer_label(diff.axes(), l).into()),
                ExportCell::Number(index.row as f64),
                ExportCell::Number(index.col as f64),
                ExportCell::optional(x),
                ExportCell::optional(y),
                ExportCell::Number(cell.old),
                ExportCell::Number(cell.new),
                ExportCell::Number(cell.delta),
                ExportCell::optional(cell.change_percent()),
            ]);
            rows.push(row);
        }
        debug!(rows = rows.len() - 1, "Exported change list");
        rows
    }

    /// Converts a diff directly into delimited text.
    pub fn to_delimited_text(&self, diff: &TableDiff) -> String {
        self.options.render(&self.to_rows(diff))
    }
}

/// Returns the `x` and `y` labels of a cell.
fn cell_labels(axes: &Axes, dimension: Dimension, index: CellIndex) -> (Option<f64>, Option<f64>) {
    let x = axes.x.as_ref();
    match (dimension, axes.non_empty_y()) {
        (Dimension::One, None) => (x.and_then(|x| x.get(index.col)), None),
        (Dimension::One, Some(y)) => (x.and_then(|x| x.get(0)), y.get(index.col)),
        (_, y) => (
            x.and_then(|x| x.get(index.row)),
            y.and_then(|y| y.get(index.col)),
        ),
    }
}

/// Converts a table into rows with default options.
pub fn to_rows(table: &Table) -> Vec<ExportRow> {
    TableExporter::new().to_rows(table)
}

/// Joins rows into comma-separated text with default options.
pub fn to_delimited_text(rows: &[ExportRow]) -> String {
    ExportOptions::default().render(rows)
}
