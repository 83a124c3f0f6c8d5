//! Per-operation configuration objects.
//!
//! Field names follow the camelCase JSON shape used by callers. Every field is
//! required when deserialising; blank strings and out-of-range numbers are
//! caught by `validate`.

use serde::{Deserialize, Serialize};

use crate::ts::tools::error::{Result, ToolError};
use crate::ts::tools::ops::age::AgeRule;

fn require(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ToolError::MissingField(field));
    }
    Ok(())
}

/// Options for merging several sources into one workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeConfig {
    pub remove_duplicates: bool,
    pub deduplicate_column: String,
    pub output_path: String,
}

impl MergeConfig {
    pub fn validate(&self) -> Result<()> {
        require(&self.output_path, "outputPath")?;
        if self.remove_duplicates {
            require(&self.deduplicate_column, "deduplicateColumn")?;
        }
        Ok(())
    }

    /// Column to deduplicate on, when deduplication was requested.
    pub fn dedupe_column(&self) -> Option<&str> {
        self.remove_duplicates
            .then_some(self.deduplicate_column.as_str())
    }
}

/// Whether rows listed in the membership file are kept or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    Include,
    Exclude,
}

impl FilterMode {
    pub fn keeps(self, is_member: bool) -> bool {
        match self {
            FilterMode::Include => is_member,
            FilterMode::Exclude => !is_member,
        }
    }
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterMode::Include => write!(f, "include"),
            FilterMode::Exclude => write!(f, "exclude"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    pub excel_file: String,
    pub txt_file: String,
    pub column_name: String,
    pub filter_type: FilterMode,
    pub output_path: String,
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        require(&self.excel_file, "excelFile")?;
        require(&self.txt_file, "txtFile")?;
        require(&self.column_name, "columnName")?;
        require(&self.output_path, "outputPath")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfig {
    pub main_file: String,
    pub sub_file: String,
    pub match_column: String,
    pub update_columns: Vec<String>,
    pub output_path: String,
}

impl UpdateConfig {
    pub fn validate(&self) -> Result<()> {
        require(&self.main_file, "mainFile")?;
        require(&self.sub_file, "subFile")?;
        require(&self.match_column, "matchColumn")?;
        require(&self.output_path, "outputPath")?;
        if self.update_columns.is_empty() {
            return Err(ToolError::MissingField("updateColumns"));
        }
        for column in &self.update_columns {
            require(column, "updateColumns")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeProcessConfig {
    pub excel_file: String,
    pub age_column: String,
    pub threshold: i64,
    pub increment: i64,
    pub output_path: String,
}

impl AgeProcessConfig {
    pub fn validate(&self) -> Result<()> {
        require(&self.excel_file, "excelFile")?;
        require(&self.age_column, "ageColumn")?;
        require(&self.output_path, "outputPath")?;
        self.rule().map(|_| ())
    }

    pub fn rule(&self) -> Result<AgeRule> {
        AgeRule::new(self.threshold, self.increment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityConfig {
    pub excel_file: String,
    pub max_days: i64,
    pub output_path: String,
}

impl ActivityConfig {
    pub fn validate(&self) -> Result<()> {
        require(&self.excel_file, "excelFile")?;
        require(&self.output_path, "outputPath")?;
        if self.max_days < 0 {
            return Err(ToolError::InvalidParameters(format!(
                "maxDays must be >= 0 (got {})",
                self.max_days
            )));
        }
        Ok(())
    }
}

/// Drops rows containing Chinese characters. An empty `checked_columns`
/// inspects every column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChineseRemoveConfig {
    pub excel_file: String,
    pub output_path: String,
    pub checked_columns: Vec<String>,
}

impl ChineseRemoveConfig {
    pub fn validate(&self) -> Result<()> {
        require(&self.excel_file, "excelFile")?;
        require(&self.output_path, "outputPath")?;
        for column in &self.checked_columns {
            require(column, "checkedColumns")?;
        }
        Ok(())
    }
}

/// Include/exclude filter of one text list against another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxtFilterConfig {
    pub main_file: String,
    pub sub_file: String,
    pub filter_type: FilterMode,
    pub output_path: String,
}

impl TxtFilterConfig {
    pub fn validate(&self) -> Result<()> {
        require(&self.main_file, "mainFile")?;
        require(&self.sub_file, "subFile")?;
        require(&self.output_path, "outputPath")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxtInterleaveConfig {
    pub main_file: String,
    pub sub_file: String,
    pub output_path: String,
}

impl TxtInterleaveConfig {
    pub fn validate(&self) -> Result<()> {
        require(&self.main_file, "mainFile")?;
        require(&self.sub_file, "subFile")?;
        require(&self.output_path, "outputPath")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneSplitConfig {
    pub input_file: String,
    pub output_dir: String,
}

impl PhoneSplitConfig {
    pub fn validate(&self) -> Result<()> {
        require(&self.input_file, "inputFile")?;
        require(&self.output_dir, "outputDir")
    }
}

/// A complete operation invocation, as accepted from a JSON request file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum OperationRequest {
    Merge {
        files: Vec<String>,
        config: MergeConfig,
    },
    Filter {
        config: FilterConfig,
    },
    Update {
        config: UpdateConfig,
    },
    AgeProcess {
        config: AgeProcessConfig,
    },
    Activity {
        config: ActivityConfig,
    },
    RemoveChineseRows {
        config: ChineseRemoveConfig,
    },
    TxtFilter {
        config: TxtFilterConfig,
    },
    TxtInterleave {
        config: TxtInterleaveConfig,
    },
    PhoneSplit {
        config: PhoneSplitConfig,
    },
}
