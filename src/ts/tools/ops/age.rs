use std::path::Path;

use crate::ts::tools::error::{Result, ToolError};
use crate::ts::tools::model::{Table, cell};

/// Ages strictly below `threshold` are raised by `increment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRule {
    pub threshold: i64,
    pub increment: i64,
}

impl AgeRule {
    pub fn new(threshold: i64, increment: i64) -> Result<Self> {
        if threshold < 0 || increment <= 0 {
            return Err(ToolError::InvalidParameters(format!(
                "threshold must be >= 0 and increment > 0 (got threshold {threshold}, increment {increment})"
            )));
        }
        Ok(Self {
            threshold,
            increment,
        })
    }

    /// The adjusted age, or `None` when the value is left as it is.
    pub fn apply(&self, raw: &str) -> Option<i64> {
        let age = parse_age(raw)?;
        (age < self.threshold).then(|| age.saturating_add(self.increment))
    }
}

/// Parses an integer age, falling back to a float truncated toward zero.
pub fn parse_age(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(age) = raw.parse::<i64>() {
        return Some(age);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value.trunc() as i64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgeAdjusted {
    pub table: Table,
    pub rows_processed: usize,
    pub rows_modified: usize,
}

pub fn adjust_ages(table: Table, source: &Path, column: &str, rule: AgeRule) -> Result<AgeAdjusted> {
    let position = table.header_index().require(column, source)?;
    let rows_processed = table.row_count();

    let mut rows_modified = 0;
    let Table { header, mut rows } = table;
    for row in &mut rows {
        if let Some(age) = rule.apply(cell(row, position)) {
            row[position] = age.to_string();
            rows_modified += 1;
        }
    }

    Ok(AgeAdjusted {
        table: Table::new(header, rows),
        rows_processed,
        rows_modified,
    })
}
