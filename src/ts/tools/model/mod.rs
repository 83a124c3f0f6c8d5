use std::collections::HashMap;
use std::path::Path;

use crate::ts::tools::error::{Result, ToolError};

pub mod config;
pub mod report;

pub use config::{
    ActivityConfig, AgeProcessConfig, ChineseRemoveConfig, FilterConfig, FilterMode, MergeConfig,
    OperationRequest, PhoneSplitConfig, TxtFilterConfig, TxtInterleaveConfig, UpdateConfig,
};
pub use report::{
    ActivityCounters, ActivityResult, AgeCounters, AgeProcessResult, ChineseRemoveCounters,
    ChineseRemoveResult, FilterCounters, FilterResult, InterleaveResult, MergeCounters,
    MergeResult, OperationResult, PhoneSplitResult, Report, TxtFilterCounters, TxtFilterResult,
    UpdateCounters, UpdateResult,
};

/// One line of a table. Positions line up with the header columns, but a row
/// may be shorter (or longer) than its header.
pub type Row = Vec<String>;

/// Header plus data rows, as read from the first sheet of a source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Row,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(header: Row, rows: Vec<Row>) -> Self {
        Self { header, rows }
    }

    /// Splits raw records into header and data rows. The first record is the
    /// header; no records yields an empty table.
    pub fn from_records(records: Vec<Row>) -> Self {
        let mut records = records.into_iter();
        match records.next() {
            Some(header) => Self {
                header,
                rows: records.collect(),
            },
            None => Self::default(),
        }
    }

    /// `true` when the source held no records at all.
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }

    /// Number of data rows, header excluded.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn header_index(&self) -> HeaderIndex {
        HeaderIndex::build(&self.header)
    }
}

/// Maps trimmed column names to their zero-based position within a row.
///
/// When a header repeats a name, the first position wins.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn build(header: &[String]) -> Self {
        let mut positions = HashMap::with_capacity(header.len());
        for (idx, name) in header.iter().enumerate() {
            positions.entry(name.trim().to_string()).or_insert(idx);
        }
        Self { positions }
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column.trim()).copied()
    }

    /// Like [`HeaderIndex::position`], but reports the missing column against
    /// the file the header came from.
    pub fn require(&self, column: &str, file: &Path) -> Result<usize> {
        self.position(column)
            .ok_or_else(|| ToolError::column_not_found(column, file))
    }
}

/// Returns the cell at `idx`, or `""` when the row is too short.
pub fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Writes `value` at `idx`, extending the row with empty cells as needed.
pub fn set_cell(row: &mut Row, idx: usize, value: String) {
    if row.len() <= idx {
        row.resize(idx + 1, String::new());
    }
    row[idx] = value;
}
