use std::path::Path;

use crate::ts::tools::error::Result;
use crate::ts::tools::io::membership::MembershipSet;
use crate::ts::tools::model::{FilterMode, Table, cell};

#[derive(Debug, Clone, PartialEq)]
pub struct Filtered {
    pub table: Table,
    pub rows_processed: usize,
    pub rows_kept: usize,
}

/// Keeps the data rows whose trimmed `column` value is (include) or is not
/// (exclude) listed in `members`. The header is always kept; a row too short
/// for the column is judged on the empty string.
pub fn filter_table(
    table: Table,
    source: &Path,
    column: &str,
    members: &MembershipSet,
    mode: FilterMode,
) -> Result<Filtered> {
    let position = table.header_index().require(column, source)?;
    let rows_processed = table.row_count();

    let Table { header, rows } = table;
    let rows: Vec<_> = rows
        .into_iter()
        .filter(|row| mode.keeps(members.contains(cell(row, position))))
        .collect();
    let rows_kept = rows.len();

    Ok(Filtered {
        table: Table::new(header, rows),
        rows_processed,
        rows_kept,
    })
}
