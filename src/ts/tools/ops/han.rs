use std::path::Path;

use regex::Regex;

use crate::ts::tools::error::Result;
use crate::ts::tools::model::{Table, cell};

/// Matches any code point of the Han script.
const HAN_PATTERN: &str = r"\p{Han}";

/// Detects Chinese (Han) characters in cell text.
#[derive(Debug, Clone)]
pub struct HanDetector {
    pattern: Regex,
}

impl HanDetector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(HAN_PATTERN)?,
        })
    }

    pub fn contains_han(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HanRowsRemoved {
    pub table: Table,
    pub rows_processed: usize,
    pub rows_removed: usize,
}

impl HanRowsRemoved {
    pub fn rows_kept(&self) -> usize {
        self.rows_processed - self.rows_removed
    }
}

/// Drops every data row holding a Han character in one of `checked_columns`.
///
/// With no checked columns every cell of the row is inspected. The header is
/// never inspected and always kept.
pub fn remove_han_rows(
    table: Table,
    source: &Path,
    checked_columns: &[String],
    detector: &HanDetector,
) -> Result<HanRowsRemoved> {
    let index = table.header_index();
    let positions = checked_columns
        .iter()
        .map(|column| index.require(column, source))
        .collect::<Result<Vec<_>>>()?;
    let rows_processed = table.row_count();

    let Table { header, rows } = table;
    let rows: Vec<_> = rows
        .into_iter()
        .filter(|row| {
            let has_han = if positions.is_empty() {
                row.iter().any(|value| detector.contains_han(value))
            } else {
                positions
                    .iter()
                    .any(|&idx| detector.contains_han(cell(row, idx)))
            };
            !has_han
        })
        .collect();
    let rows_removed = rows_processed - rows.len();

    Ok(HanRowsRemoved {
        table: Table::new(header, rows),
        rows_processed,
        rows_removed,
    })
}
