use std::collections::HashMap;
use std::path::Path;

use crate::ts::tools::error::{Result, ToolError};
use crate::ts::tools::model::{Table, cell, set_cell};

/// Replacement values taken from the subordinate table, keyed by the trimmed
/// match-column value. Later rows with the same key replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinLookup {
    entries: HashMap<String, HashMap<String, String>>,
}

impl JoinLookup {
    /// Builds the lookup from the subordinate table. Rows with an empty key are
    /// ignored, and update columns missing from its header are not carried.
    pub fn build(
        table: &Table,
        source: &Path,
        match_column: &str,
        update_columns: &[String],
    ) -> Result<Self> {
        let index = table.header_index();
        let key_position = index.require(match_column, source)?;
        let value_positions: Vec<(&String, usize)> = update_columns
            .iter()
            .filter_map(|column| index.position(column).map(|idx| (column, idx)))
            .collect();

        let mut entries = HashMap::new();
        for row in &table.rows {
            let key = cell(row, key_position).trim();
            if key.is_empty() {
                continue;
            }
            let values = value_positions
                .iter()
                .map(|(column, idx)| ((*column).clone(), cell(row, *idx).trim().to_string()))
                .collect();
            entries.insert(key.to_string(), values);
        }

        if entries.is_empty() {
            return Err(ToolError::NoValidData {
                column: match_column.trim().to_string(),
                file: source.to_path_buf(),
            });
        }
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&HashMap<String, String>> {
        self.entries.get(key.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Updated {
    pub table: Table,
    pub rows_processed: usize,
    pub rows_updated: usize,
}

/// Overwrites the update columns of every main-table row whose match value
/// appears in `lookup`. Other cells are left untouched.
pub fn update_table(
    table: Table,
    source: &Path,
    match_column: &str,
    update_columns: &[String],
    lookup: &JoinLookup,
) -> Result<Updated> {
    let index = table.header_index();
    let match_position = index.require(match_column, source)?;
    let update_positions = update_columns
        .iter()
        .map(|column| index.require(column, source).map(|idx| (column, idx)))
        .collect::<Result<Vec<_>>>()?;

    let rows_processed = table.row_count();
    let mut rows_updated = 0;
    let Table { header, mut rows } = table;
    for row in &mut rows {
        let Some(values) = lookup.get(cell(row, match_position)) else {
            continue;
        };
        for (column, position) in &update_positions {
            if let Some(value) = values.get(*column) {
                set_cell(row, *position, value.clone());
            }
        }
        rows_updated += 1;
    }

    Ok(Updated {
        table: Table::new(header, rows),
        rows_processed,
        rows_updated,
    })
}
