//! Parser for the legacy plain-text table block.
//!
//! ```text
//! [Table2D]
//! <x0> <x1> ... <xN>          axis line
//! <v0> <v1> ... <vN>          single data row
//!
//! [Table3D]
//! <y0> <y1> ... <yM>          axis line
//! <x0> <v00> ... <v0M>        one line per x value
//! ```
//!
//! Two tolerances are part of the format and are kept on purpose:
//! - a `[Table3D]` line whose token count is not `|y| + 1` is skipped;
//! - a token that is not a number becomes `NaN` instead of failing the block.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{instrument, warn};

use crate::error::{Result, TuneError};
use crate::logging::LogConfig;
use crate::table::{Axes, Grid, StructuredInput, Table};

/// Header line of a vector-like block.
pub const TABLE_2D_HEADER: &str = "[Table2D]";
/// Header line of a matrix block.
pub const TABLE_3D_HEADER: &str = "[Table3D]";

static TOKEN_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    // Runs of spaces and tabs; constant pattern
    #[allow(clippy::expect_used)]
    Regex::new(r"[ \t]+").expect("Hard-coded regex pattern should be valid")
});

/// Splits a line into numbers; unparsable tokens become `NaN`.
fn tokenize(line: &str) -> Vec<f64> {
    TOKEN_SEPARATOR
        .split(line.trim())
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f64>().unwrap_or(f64::NAN))
        .collect()
}

/// Parser for legacy blocks.
#[derive(Debug, Clone, Default)]
pub struct LegacyParser {
    log: LogConfig,
}

impl LegacyParser {
    /// Creates a parser with default logging.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with the given logging configuration.
    pub fn with_log_config(log: LogConfig) -> Self {
        Self { log }
    }

    /// Parses a block into a validated table.
    pub fn parse(&self, text: &str) -> Result<Table> {
        Table::try_from(self.parse_block(text)?)
    }

    /// Parses a block into axes and data without validating the shape.
    ///
    /// The normalizer uses this so caller-supplied axes can be merged before
    /// the shape invariant is checked.
    #[instrument(skip_all, fields(bytes = text.len()))]
    pub fn parse_block(&self, text: &str) -> Result<StructuredInput> {
        let mut lines = text
            .trim()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty());

        let header = lines.next().unwrap_or_default();
        match header {
            TABLE_2D_HEADER => self.parse_vector_block(lines),
            TABLE_3D_HEADER => self.parse_matrix_block(lines),
            other => {
                let header = self.log.field(other);
                warn!(header = %header, "Unrecognized legacy table header");
                Err(TuneError::unrecognized_format(header))
            }
        }
    }

    fn parse_vector_block<'a>(
        &self,
        mut lines: impl Iterator<Item = &'a str>,
    ) -> Result<StructuredInput> {
        let x = lines
            .next()
            .map(tokenize)
            .ok_or_else(|| TuneError::shape("[Table2D] block has no axis line"))?;
        let row = lines
            .next()
            .map(tokenize)
            .ok_or_else(|| TuneError::shape("[Table2D] block has no data row"))?;

        let ignored = lines.count();
        if ignored > 0 {
            crate::log_debug!(
                self.log,
                ignored,
                "Ignoring lines after the [Table2D] data row"
            );
        }

        Ok(StructuredInput::new(
            Axes::new().with_x(x),
            Grid::Matrix(vec![row]),
        ))
    }

    fn parse_matrix_block<'a>(
        &self,
        mut lines: impl Iterator<Item = &'a str>,
    ) -> Result<StructuredInput> {
        let y = lines
            .next()
            .map(tokenize)
            .ok_or_else(|| TuneError::shape("[Table3D] block has no axis line"))?;
        let width = y.len() + 1;

        let mut x = Vec::new();
        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for (line_no, line) in lines.enumerate() {
            let tokens = tokenize(line);
            if tokens.len() != width {
                skipped += 1;
                crate::log_cell!(
                    self.log,
                    line = line_no,
                    tokens = tokens.len(),
                    expected = width,
                    "Skipping malformed [Table3D] row"
                );
                continue;
            }
            x.push(tokens[0]);
            rows.push(tokens[1..].to_vec());
        }

        crate::log_debug!(
            self.log,
            rows = rows.len(),
            columns = y.len(),
            skipped,
            "Parsed [Table3D] block"
        );

        Ok(StructuredInput::new(
            Axes::new().with_x(x).with_y(y),
            Grid::Matrix(rows),
        ))
    }
}

/// Parses a legacy block with the default parser.
///
/// # Examples
///
/// ```rust
/// use tune_guard::legacy::parse;
/// use tune_guard::table::Dimension;
///
/// let table = parse("[Table2D]\n1000 2000 3000\n10.5 11.0 11.5").unwrap();
/// assert_eq!(table.dimension(), Dimension::One);
/// ```
pub fn parse(text: &str) -> Result<Table> {
    LegacyParser::new().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Axis, Dimension};

    #[test]
    fn test_parse_table2d() {
        let input = parse_block("[Table2D]\n1000 2000 3000\n10.5 11.0 11.5\n");
        assert_eq!(input.axes.x, Some(Axis::from([1000.0, 2000.0, 3000.0])));
        assert!(input.axes.y.is_none());
        assert_eq!(input.data, Grid::Matrix(vec![vec![10.5, 11.0, 11.5]]));

        let table = parse("[Table2D]\n1000 2000 3000\n10.5 11.0 11.5").unwrap();
        assert_eq!(table.dimension(), Dimension::One);
    }

    #[test]
    fn test_lines_after_table2d_row_are_ignored() {
        let input = parse_block("[Table2D]\n1 2\n3 4\n5 6\n7 8");
        assert_eq!(input.axes.x, Some(Axis::from([1.0, 2.0])));
        assert_eq!(input.data, Grid::Matrix(vec![vec![3.0, 4.0]]));
    }

    #[test]
    fn test_parse_table3d() {
        let text = "[Table3D]\n0.5 1.0 1.5\n800 10 11 12\n1600 13 14 15\n";
        let table = parse(text).unwrap();
        assert_eq!(table.dimension(), Dimension::Two);
        assert_eq!(table.axes().x, Some(Axis::from([800.0, 1600.0])));
        assert_eq!(table.axes().y, Some(Axis::from([0.5, 1.0, 1.5])));
        assert_eq!(
            table.data(),
            Grid::Matrix(vec![vec![10.0, 11.0, 12.0], vec![13.0, 14.0, 15.0]])
        );
    }

    #[test]
    fn test_tabs_and_crlf() {
        let text = "[Table3D]\r\n1\t2\r\n100 \t 5\t6\r\n";
        let table = parse(text).unwrap();
        assert_eq!(table.data(), Grid::Matrix(vec![vec![5.0, 6.0]]));
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let text = "[Table3D]\n1 2\n100 5 6\n200 7\n300 8 9 10\n400 11 12\n";
        let table = parse(text).unwrap();
        assert_eq!(table.axes().x, Some(Axis::from([100.0, 400.0])));
        assert_eq!(
            table.data(),
            Grid::Matrix(vec![vec![5.0, 6.0], vec![11.0, 12.0]])
        );
    }

    #[test]
    fn test_non_numeric_tokens_become_nan() {
        let input = parse_block("[Table3D]\n1 2\n100 abc 6\n");
        match input.data {
            Grid::Matrix(rows) => {
                assert!(rows[0][0].is_nan());
                assert_eq!(rows[0][1], 6.0);
            }
            other => panic!("expected matrix, got {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_header() {
        let err = parse("[Table4D]\n1 2\n3 4").unwrap_err();
        assert_eq!(err, TuneError::unrecognized_format("[Table4D]"));

        let err = parse("   \n\n  ").unwrap_err();
        assert_eq!(err, TuneError::unrecognized_format(""));
    }

    #[test]
    fn test_header_must_match_exactly() {
        assert!(parse("[table2d]\n1\n2").is_err());
        assert!(parse("[Table2D] extra\n1\n2").is_err());
    }

    #[test]
    fn test_missing_lines() {
        let err = parse("[Table2D]\n1 2 3").unwrap_err();
        assert!(matches!(err, TuneError::ShapeInvariantViolation { .. }));

        let err = parse("[Table3D]").unwrap_err();
        assert!(matches!(err, TuneError::ShapeInvariantViolation { .. }));
    }

    #[test]
    fn test_table2d_length_mismatch_is_rejected() {
        let err = parse("[Table2D]\n1 2 3\n4 5").unwrap_err();
        assert!(matches!(err, TuneError::ShapeInvariantViolation { .. }));
    }

    #[test]
    fn test_long_header_is_truncated() {
        let parser = LegacyParser::with_log_config(LogConfig::production());
        let header = "x".repeat(500);
        match parser.parse(&header).unwrap_err() {
            TuneError::UnrecognizedFormat { header } => {
                assert!(header.ends_with("...(truncated)"));
                assert!(header.len() < 200);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    fn parse_block(text: &str) -> StructuredInput {
        LegacyParser::new().parse_block(text).unwrap()
    }
}
