use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::ts::tools::error::{Result, ToolError};
use crate::ts::tools::model::{HeaderIndex, Row, Table, cell};

const PROGRESS_INTERVAL: usize = 10_000;

/// A table read from one merge source, kept alongside its path for error
/// reporting and log output.
#[derive(Debug, Clone)]
pub struct MergeSource {
    pub path: PathBuf,
    pub table: Table,
}

/// Combined table plus the counters reported back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub table: Table,
    pub rows_processed: usize,
    pub rows_after_dedupe: usize,
}

/// Appends the data rows of every source, in order, under the header of the
/// first non-empty source.
///
/// Later sources are aligned onto that header by column name: canonical
/// columns the source lacks are left empty and extra columns are dropped.
/// With `dedupe_column`, only the first row for each trimmed key survives; a
/// column missing from the header gives every row the empty key.
pub fn merge_tables(sources: &[MergeSource], dedupe_column: Option<&str>) -> Result<Merged> {
    let Some(canonical) = sources.iter().find(|source| !source.table.is_empty()) else {
        return Err(ToolError::NoData);
    };
    let header = canonical.table.header.clone();

    let dedupe_key = dedupe_column.map(|column| {
        let position = HeaderIndex::build(&header).position(column);
        if position.is_none() {
            warn!(
                column,
                file = %canonical.path.display(),
                "dedupe column not in header; every row shares the empty key"
            );
        }
        position
    });

    let mut rows: Vec<Row> = Vec::new();
    let mut rows_processed = 0;
    for source in sources.iter().filter(|source| !source.table.is_empty()) {
        let layout = ColumnLayout::align(&header, &source.table.header);
        if !layout.is_identity() {
            warn!(
                file = %source.path.display(),
                expected = header.len(),
                actual = source.table.header.len(),
                "header differs from the first source; aligning columns by name"
            );
        }
        for row in &source.table.rows {
            rows.push(layout.project(row));
            rows_processed += 1;
            if rows_processed % PROGRESS_INTERVAL == 0 {
                debug!(appended = rows_processed, "merging rows");
            }
        }
        debug!(
            file = %source.path.display(),
            rows = source.table.row_count(),
            "appended source rows"
        );
    }

    if rows.is_empty() {
        return Err(ToolError::NoData);
    }

    if let Some(position) = dedupe_key {
        rows = dedupe_rows(rows, position);
    }
    let rows_after_dedupe = rows.len();

    Ok(Merged {
        table: Table::new(header, rows),
        rows_processed,
        rows_after_dedupe,
    })
}

/// Keeps the first row for each distinct trimmed value at `position`. Rows
/// too short to hold the column share the empty key, and so do all rows when
/// there is no position at all.
pub fn dedupe_rows(rows: Vec<Row>, position: Option<usize>) -> Vec<Row> {
    let mut seen: HashSet<String> = HashSet::new();
    rows.into_iter()
        .filter(|row| {
            let key = position.map_or("", |idx| cell(row, idx));
            seen.insert(key.trim().to_string())
        })
        .collect()
}

/// For each canonical column, the position of the same-named column in a
/// source header.
struct ColumnLayout {
    positions: Vec<Option<usize>>,
}

impl ColumnLayout {
    fn align(canonical: &[String], source: &[String]) -> Self {
        if canonical == source {
            return Self {
                positions: (0..canonical.len()).map(Some).collect(),
            };
        }
        let index = HeaderIndex::build(source);
        Self {
            positions: canonical
                .iter()
                .map(|column| index.position(column))
                .collect(),
        }
    }

    fn is_identity(&self) -> bool {
        self.positions
            .iter()
            .enumerate()
            .all(|(idx, position)| *position == Some(idx))
    }

    fn project(&self, row: &[String]) -> Row {
        self.positions
            .iter()
            .map(|position| match position {
                Some(idx) => cell(row, *idx).to_string(),
                None => String::new(),
            })
            .collect()
    }
}
