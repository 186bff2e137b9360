//! Keyword classification of calibration tables by name.
//!
//! Matching is a case-insensitive substring search over the table name. The
//! first rule that matches wins, so rule order is part of the behavior.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Functional area a table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableCategory {
    Fuel,
    Timing,
    Boost,
    Idle,
    Learning,
    Other,
}

const CATEGORY_RULES: &[(TableCategory, &[&str])] = &[
    (TableCategory::Fuel, &["fuel", "injector", "pulse"]),
    (TableCategory::Timing, &["timing", "ignition"]),
    (TableCategory::Boost, &["boost", "wastegate"]),
    (TableCategory::Idle, &["idle", "iac"]),
    (TableCategory::Learning, &["learning", "correction"]),
];

impl TableCategory {
    /// Classifies a table by its name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tune_guard::category::TableCategory;
    ///
    /// assert_eq!(TableCategory::from_name("Primary Open Loop Fueling"), TableCategory::Fuel);
    /// assert_eq!(TableCategory::from_name("Wastegate Duty"), TableCategory::Boost);
    /// assert_eq!(TableCategory::from_name("Rev Limit"), TableCategory::Other);
    /// ```
    pub fn from_name(name: &str) -> Self {
        let name = name.to_lowercase();
        CATEGORY_RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| name.contains(kw)))
            .map_or(TableCategory::Other, |(category, _)| *category)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TableCategory::Fuel => "fuel",
            TableCategory::Timing => "timing",
            TableCategory::Boost => "boost",
            TableCategory::Idle => "idle",
            TableCategory::Learning => "learning",
            TableCategory::Other => "other",
        }
    }
}

impl fmt::Display for TableCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review priority of a change to a table.
///
/// Ordered so that `Critical` is the greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangePriority {
    Low,
    Medium,
    High,
    Critical,
}

const PRIORITY_RULES: &[(ChangePriority, &[&str])] = &[
    (ChangePriority::Critical, &["fuel", "primary", "base fuel"]),
    (ChangePriority::High, &["timing", "ignition", "boost"]),
    (ChangePriority::Medium, &["learning", "correction"]),
    (ChangePriority::Low, &["idle", "fan", "misc"]),
];

impl ChangePriority {
    /// Derives the priority of a change from the table name. Names matching
    /// no rule are `Medium`.
    pub fn from_table_name(name: &str) -> Self {
        let name = name.to_lowercase();
        PRIORITY_RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| name.contains(kw)))
            .map_or(ChangePriority::Medium, |(priority, _)| *priority)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChangePriority::Low => "low",
            ChangePriority::Medium => "medium",
            ChangePriority::High => "high",
            ChangePriority::Critical => "critical",
        }
    }
}

impl fmt::Display for ChangePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
