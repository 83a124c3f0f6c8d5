use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What every orchestrator entry point hands back, successful or not.
pub trait Report {
    /// A result carrying only the failure message, with zeroed counts.
    fn failure(message: String) -> Self;
    fn succeeded(&self) -> bool;
}

/// Summary handed back to the caller after every operation, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult<C> {
    pub success: bool,
    pub message: String,
    pub output_path: String,
    pub rows_processed: usize,
    #[serde(flatten)]
    pub counters: C,
}

impl<C: Default> Report for OperationResult<C> {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            output_path: String::new(),
            rows_processed: 0,
            counters: C::default(),
        }
    }

    fn succeeded(&self) -> bool {
        self.success
    }
}

impl<C> OperationResult<C> {
    pub fn completed(
        message: impl Into<String>,
        output_path: impl Into<String>,
        rows_processed: usize,
        counters: C,
    ) -> Self {
        Self {
            success: true,
            message: message.into(),
            output_path: output_path.into(),
            rows_processed,
            counters,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeCounters {
    pub rows_after_dedupe: usize,
}

/// `rows_filtered` is the number of data rows kept in the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCounters {
    pub rows_filtered: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCounters {
    pub rows_updated: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeCounters {
    pub rows_modified: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChineseRemoveCounters {
    pub rows_removed: usize,
    pub rows_kept: usize,
}

/// `rows_filtered` is the number of lines dropped from the main file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxtFilterCounters {
    pub rows_filtered: usize,
}

/// Activity synthesis touches every row, so it carries no extra counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCounters {}

pub type MergeResult = OperationResult<MergeCounters>;
pub type FilterResult = OperationResult<FilterCounters>;
pub type UpdateResult = OperationResult<UpdateCounters>;
pub type AgeProcessResult = OperationResult<AgeCounters>;
pub type ActivityResult = OperationResult<ActivityCounters>;
pub type ChineseRemoveResult = OperationResult<ChineseRemoveCounters>;
pub type TxtFilterResult = OperationResult<TxtFilterCounters>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterleaveResult {
    pub success: bool,
    pub message: String,
    pub output_path: String,
    pub main_lines: usize,
    pub sub_lines: usize,
    pub total_lines: usize,
}

impl Report for InterleaveResult {
    fn failure(message: String) -> Self {
        Self {
            message,
            ..Self::default()
        }
    }

    fn succeeded(&self) -> bool {
        self.success
    }
}

/// Outcome of splitting a number list into one file per digit count.
/// `split_results` maps each digit count to the numbers written for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneSplitResult {
    pub success: bool,
    pub message: String,
    pub output_dir: String,
    pub total_numbers: usize,
    pub split_results: BTreeMap<usize, usize>,
}

impl Report for PhoneSplitResult {
    fn failure(message: String) -> Self {
        Self {
            message,
            ..Self::default()
        }
    }

    fn succeeded(&self) -> bool {
        self.success
    }
}
