//! Compares a legacy text table with an edited structured copy and prints the
//! diff summary, flagged cells and a change list.
//!
//! Run with `RUST_LOG=tune_guard=debug` to see the library's tracing events.

use tune_guard::logging::setup::{init_logging, LoggingConfig};
use tune_guard::prelude::*;

const BASE_FUEL: &str = "\
[Table3D]
0.2 0.4 0.6 0.8
1000 11.2 11.8 12.4 13.0
2000 11.6 12.2 12.9 13.6
3000 12.0 12.7 13.4 14.2
";

const EDITED_FUEL: &str = r#"{
    "axes": {"x": [1000, 2000, 3000], "y": [0.2, 0.4, 0.6, 0.8]},
    "data": [
        [11.2, 11.8, 12.4, 13.0],
        [11.6, 12.6, 12.9, 13.6],
        [12.0, 12.7, 16.5, 14.2]
    ]
}"#;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::development())?;

    let config = GuardConfig::default();
    let original = normalize(TableInput::text(BASE_FUEL))?;
    let modified = normalize_json(EDITED_FUEL)?;

    // Log every changed and flagged cell as well as the summaries
    let cell_logging = LogConfig::default().with_cell_details(true);

    let diff = DiffEngine::with_log_config(cell_logging.clone()).diff(&original, &modified)?;
    println!("{}", serde_json::to_string_pretty(diff.summary())?);

    let mask = config
        .highlighter()?
        .with_log_config(cell_logging)
        .highlight(&modified);
    for index in mask.flagged() {
        println!("suspicious jump at {index}");
    }

    let changes = config
        .change_list_exporter()
        .with_table_name("Base Fuel")
        .to_delimited_text(&diff);
    println!("{changes}");

    Ok(())
}
