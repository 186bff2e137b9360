//! Table normalization: the single boundary where either input encoding
//! becomes a canonical [`Table`].

use tracing::{debug, instrument};

use crate::error::Result;
use crate::legacy::LegacyParser;
use crate::logging::LogConfig;
use crate::table::{Table, TableInput};

/// Resolves [`TableInput`] values into validated tables.
#[derive(Debug, Clone, Default)]
pub struct TableNormalizer {
    parser: LegacyParser,
}

impl TableNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a normalizer whose legacy parser logs with `log`.
    pub fn with_log_config(log: LogConfig) -> Self {
        Self {
            parser: LegacyParser::with_log_config(log),
        }
    }

    /// Normalizes one input.
    ///
    /// Structured input is only validated. Text input is parsed, then any
    /// caller-supplied axes replace the parsed ones before validation, so
    /// display labels can be overridden while the parsed numbers are kept.
    #[instrument(skip_all)]
    pub fn normalize(&self, input: TableInput) -> Result<Table> {
        let structured = match input {
            TableInput::Structured(structured) => structured,
            TableInput::Text { block, axes } => {
                let mut parsed = self.parser.parse_block(&block)?;
                if !axes.is_empty() {
                    debug!("Applying caller-supplied axes over parsed axes");
                    parsed.axes = parsed.axes.overlay(&axes);
                }
                parsed
            }
        };

        let table = Table::try_from(structured)?;
        debug!(
            dimension = %table.dimension(),
            cells = table.cell_count(),
            "Normalized table"
        );
        Ok(table)
    }

    /// Normalizes a wire table object given as JSON.
    pub fn normalize_json(&self, json: &str) -> Result<Table> {
        self.normalize(TableInput::from_json(json)?)
    }
}

/// Normalizes one input with the default normalizer.
pub fn normalize(input: impl Into<TableInput>) -> Result<Table> {
    TableNormalizer::new().normalize(input.into())
}

/// Normalizes a wire table object given as JSON with the default normalizer.
pub fn normalize_json(json: &str) -> Result<Table> {
    TableNormalizer::new().normalize_json(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TuneError;
    use crate::table::{Axes, Axis, Dimension, Grid};

    #[test]
    fn test_structured_input_is_validated() {
        let input = TableInput::structured(
            Axes::new().with_x([1.0, 2.0]).with_y([3.0, 4.0]),
            Grid::Matrix(vec![vec![1.0, 2.0], vec![3.0, 4.0]]),
        );
        let table = normalize(input).unwrap();
        assert_eq!(table.dimension(), Dimension::Two);

        let bad = TableInput::structured(
            Axes::new().with_x([1.0, 2.0, 3.0]).with_y([3.0, 4.0]),
            Grid::Matrix(vec![vec![1.0, 2.0], vec![3.0, 4.0]]),
        );
        assert!(matches!(
            normalize(bad),
            Err(TuneError::ShapeInvariantViolation { .. })
        ));
    }

    #[test]
    fn test_text_input_with_axis_override() {
        let input = TableInput::text_with_axes(
            "[Table3D]\n1 2\n100 5 6\n200 7 8",
            Axes::new().with_y([25.0, 50.0]),
        );
        let table = normalize(input).unwrap();
        assert_eq!(table.axes().y, Some(Axis::from([25.0, 50.0])));
        assert_eq!(table.axes().x, Some(Axis::from([100.0, 200.0])));
        assert_eq!(table.data(), Grid::Matrix(vec![vec![5.0, 6.0], vec![7.0, 8.0]]));
    }

    #[test]
    fn test_override_that_breaks_shape_is_rejected() {
        let input = TableInput::text_with_axes(
            "[Table2D]\n1 2 3\n4 5 6",
            Axes::new().with_x([1.0, 2.0]),
        );
        assert!(matches!(
            normalize(input),
            Err(TuneError::ShapeInvariantViolation { .. })
        ));
    }

    #[test]
    fn test_unrecognized_text_propagates() {
        let err = normalize(TableInput::text("<table/>")).unwrap_err();
        assert!(matches!(err, TuneError::UnrecognizedFormat { .. }));
    }

    #[test]
    fn test_normalize_json_both_encodings() {
        let from_text = normalize_json(r#"{"data": "[Table2D]\n1000 2000\n1.5 2.5"}"#).unwrap();
        let from_structured =
            normalize_json(r#"{"axes": {"x": [1000, 2000]}, "data": [[1.5, 2.5]]}"#).unwrap();
        assert_eq!(from_text, from_structured);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let table = normalize(TableInput::text("[Table3D]\n1 2\n100 5 6\n200 7 8")).unwrap();
        let again = normalize(table.to_structured()).unwrap();
        assert_eq!(table, again);
    }

    #[test]
    fn test_normalize_is_idempotent_with_nan_cells() {
        let table = normalize_json(r#"{"axes": {"x": [1, 2]}, "data": [1.5, null]}"#).unwrap();
        let again = normalize(table.to_structured()).unwrap();
        assert_eq!(table, again);

        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(normalize_json(&json).unwrap(), table);

        let parsed = normalize(TableInput::text("[Table3D]\n1 2\n100 5 oops\n200 7 8")).unwrap();
        assert!(parsed.planes()[0][0][1].is_nan());
        assert_eq!(normalize(parsed.to_structured()).unwrap(), parsed);
    }
}
