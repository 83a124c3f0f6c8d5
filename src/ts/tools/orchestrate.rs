use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use rand::Rng;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::ts::tools::error::{Result, ToolError};
use crate::ts::tools::io::membership::read_membership;
use crate::ts::tools::io::resolve::PathResolver;
use crate::ts::tools::io::table_read::read_table;
use crate::ts::tools::io::table_write::{write_table, write_table_with_numeric};
use crate::ts::tools::io::text::{ensure_dir, read_lines, write_lines};
use crate::ts::tools::model::{
    ActivityConfig, ActivityCounters, ActivityResult, AgeCounters, AgeProcessConfig,
    AgeProcessResult, ChineseRemoveConfig, ChineseRemoveCounters, ChineseRemoveResult,
    FilterConfig, FilterCounters, FilterResult, InterleaveResult, MergeConfig, MergeCounters,
    MergeResult, OperationRequest, OperationResult, PhoneSplitConfig, PhoneSplitResult, Report,
    Table, TxtFilterConfig, TxtFilterCounters, TxtFilterResult, TxtInterleaveConfig,
    UpdateConfig, UpdateCounters, UpdateResult,
};
use crate::ts::tools::ops::activity::synthesize_activity;
use crate::ts::tools::ops::age::adjust_ages;
use crate::ts::tools::ops::filter::filter_table;
use crate::ts::tools::ops::han::{HanDetector, remove_han_rows};
use crate::ts::tools::ops::merge::{MergeSource, merge_tables};
use crate::ts::tools::ops::text::{filter_lines, interleave_lines, split_by_digit_count};
use crate::ts::tools::ops::update::{JoinLookup, update_table};

/// Drives every operation through resolve → read → transform → write and
/// folds the outcome into a result object. Errors never escape: they become
/// a result with `success == false` and a message naming the file or column.
pub struct Orchestrator {
    resolver: PathResolver,
}

impl Orchestrator {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Merges `files` in order into one workbook, optionally deduplicating.
    #[instrument(
        level = "info",
        skip_all,
        fields(files = files.len(), output = %config.output_path)
    )]
    pub fn merge_files(&self, files: &[String], config: &MergeConfig) -> MergeResult {
        finish("merge", self.try_merge(files, config))
    }

    /// Keeps or drops rows according to a membership list.
    #[instrument(
        level = "info",
        skip_all,
        fields(input = %config.excel_file, mode = %config.filter_type, output = %config.output_path)
    )]
    pub fn filter_file(&self, config: &FilterConfig) -> FilterResult {
        finish("filter", self.try_filter(config))
    }

    /// Copies update columns from a subordinate file into matching main rows.
    #[instrument(
        level = "info",
        skip_all,
        fields(main = %config.main_file, sub = %config.sub_file, output = %config.output_path)
    )]
    pub fn update_file(&self, config: &UpdateConfig) -> UpdateResult {
        finish("update", self.try_update(config))
    }

    /// Raises ages below the threshold by a fixed increment.
    #[instrument(
        level = "info",
        skip_all,
        fields(input = %config.excel_file, output = %config.output_path)
    )]
    pub fn process_age(&self, config: &AgeProcessConfig) -> AgeProcessResult {
        finish("age adjustment", self.try_process_age(config))
    }

    /// Appends simulated activity columns, measured back from the local clock.
    pub fn generate_activity<R: Rng>(&self, config: &ActivityConfig, rng: &mut R) -> ActivityResult {
        self.generate_activity_at(config, Local::now().naive_local(), rng)
    }

    #[instrument(
        level = "info",
        skip_all,
        fields(input = %config.excel_file, output = %config.output_path, now = %now)
    )]
    pub fn generate_activity_at<R: Rng>(
        &self,
        config: &ActivityConfig,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> ActivityResult {
        finish("activity generation", self.try_generate_activity(config, now, rng))
    }

    /// Drops rows containing Chinese characters in the checked columns.
    #[instrument(
        level = "info",
        skip_all,
        fields(input = %config.excel_file, output = %config.output_path)
    )]
    pub fn remove_chinese_rows(&self, config: &ChineseRemoveConfig) -> ChineseRemoveResult {
        finish("chinese row removal", self.try_remove_chinese_rows(config))
    }

    /// Keeps or drops lines of a text file according to a second text file.
    #[instrument(
        level = "info",
        skip_all,
        fields(main = %config.main_file, sub = %config.sub_file, mode = %config.filter_type)
    )]
    pub fn filter_txt(&self, config: &TxtFilterConfig) -> TxtFilterResult {
        finish("text filter", self.try_filter_txt(config))
    }

    /// Spreads the lines of a subordinate text file evenly through a main one.
    #[instrument(
        level = "info",
        skip_all,
        fields(main = %config.main_file, sub = %config.sub_file, output = %config.output_path)
    )]
    pub fn interleave_txt(&self, config: &TxtInterleaveConfig) -> InterleaveResult {
        finish("text interleave", self.try_interleave_txt(config))
    }

    /// Splits a phone number list into one text file per digit count.
    #[instrument(
        level = "info",
        skip_all,
        fields(input = %config.input_file, output_dir = %config.output_dir)
    )]
    pub fn split_phone_numbers(&self, config: &PhoneSplitConfig) -> PhoneSplitResult {
        finish("phone split", self.try_split_phone_numbers(config))
    }

    /// Header names of a source table, in column order.
    #[instrument(level = "debug", skip(self))]
    pub fn table_headers(&self, reference: &str) -> Result<Vec<String>> {
        let path = self.resolver.require(reference)?;
        Ok(self.read_source(&path)?.header)
    }

    /// Dispatches a request decoded from structured data.
    pub fn run<R: Rng>(&self, request: &OperationRequest, rng: &mut R) -> OperationOutcome {
        match request {
            OperationRequest::Merge { files, config } => {
                OperationOutcome::Merge(self.merge_files(files, config))
            }
            OperationRequest::Filter { config } => OperationOutcome::Filter(self.filter_file(config)),
            OperationRequest::Update { config } => OperationOutcome::Update(self.update_file(config)),
            OperationRequest::AgeProcess { config } => {
                OperationOutcome::AgeProcess(self.process_age(config))
            }
            OperationRequest::Activity { config } => {
                OperationOutcome::Activity(self.generate_activity(config, rng))
            }
            OperationRequest::RemoveChineseRows { config } => {
                OperationOutcome::RemoveChineseRows(self.remove_chinese_rows(config))
            }
            OperationRequest::TxtFilter { config } => {
                OperationOutcome::TxtFilter(self.filter_txt(config))
            }
            OperationRequest::TxtInterleave { config } => {
                OperationOutcome::TxtInterleave(self.interleave_txt(config))
            }
            OperationRequest::PhoneSplit { config } => {
                OperationOutcome::PhoneSplit(self.split_phone_numbers(config))
            }
        }
    }

    fn try_merge(&self, files: &[String], config: &MergeConfig) -> Result<MergeResult> {
        if files.is_empty() {
            return Err(ToolError::NoFilesSelected);
        }
        config.validate()?;

        let mut sources = Vec::with_capacity(files.len());
        for reference in files {
            let path = self.resolver.require(reference)?;
            let table = read_table(&path)?;
            info!(file = %path.display(), rows = table.row_count(), "read merge source");
            sources.push(MergeSource { path, table });
        }

        let merged = merge_tables(&sources, config.dedupe_column())?;
        info!(
            rows_processed = merged.rows_processed,
            rows_after_dedupe = merged.rows_after_dedupe,
            "merged sources"
        );
        write_table(Path::new(&config.output_path), &merged.table)?;

        Ok(OperationResult::completed(
            "merge completed",
            &config.output_path,
            merged.rows_processed,
            MergeCounters {
                rows_after_dedupe: merged.rows_after_dedupe,
            },
        ))
    }

    fn try_filter(&self, config: &FilterConfig) -> Result<FilterResult> {
        config.validate()?;
        let source = self.resolver.require(&config.excel_file)?;
        let membership_path = self.resolver.require(&config.txt_file)?;

        let members = read_membership(&membership_path)?;
        info!(values = members.len(), "read membership list");
        let table = self.read_source(&source)?;

        let filtered = filter_table(
            table,
            &source,
            &config.column_name,
            &members,
            config.filter_type,
        )?;
        write_table(Path::new(&config.output_path), &filtered.table)?;

        Ok(OperationResult::completed(
            "filter completed",
            &config.output_path,
            filtered.rows_processed,
            FilterCounters {
                rows_filtered: filtered.rows_kept,
            },
        ))
    }

    fn try_update(&self, config: &UpdateConfig) -> Result<UpdateResult> {
        config.validate()?;
        let main_path = self.resolver.require(&config.main_file)?;
        let sub_path = self.resolver.require(&config.sub_file)?;

        let sub_table = self.read_source(&sub_path)?;
        let lookup = JoinLookup::build(
            &sub_table,
            &sub_path,
            &config.match_column,
            &config.update_columns,
        )?;
        info!(keys = lookup.len(), "built lookup from subordinate file");

        let main_table = self.read_source(&main_path)?;
        let updated = update_table(
            main_table,
            &main_path,
            &config.match_column,
            &config.update_columns,
            &lookup,
        )?;
        write_table(Path::new(&config.output_path), &updated.table)?;

        Ok(OperationResult::completed(
            "update completed",
            &config.output_path,
            updated.rows_processed,
            UpdateCounters {
                rows_updated: updated.rows_updated,
            },
        ))
    }

    fn try_process_age(&self, config: &AgeProcessConfig) -> Result<AgeProcessResult> {
        config.validate()?;
        let rule = config.rule()?;
        let source = self.resolver.require(&config.excel_file)?;
        let table = self.read_source(&source)?;

        let adjusted = adjust_ages(table, &source, &config.age_column, rule)?;
        write_table(Path::new(&config.output_path), &adjusted.table)?;

        Ok(OperationResult::completed(
            "age adjustment completed",
            &config.output_path,
            adjusted.rows_processed,
            AgeCounters {
                rows_modified: adjusted.rows_modified,
            },
        ))
    }

    fn try_generate_activity<R: Rng>(
        &self,
        config: &ActivityConfig,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Result<ActivityResult> {
        config.validate()?;
        let source = self.resolver.require(&config.excel_file)?;
        let table = self.read_source(&source)?;

        let synthesized = synthesize_activity(table, config.max_days, now, rng)?;
        let numeric_columns = BTreeSet::from([synthesized.days_column]);
        write_table_with_numeric(
            Path::new(&config.output_path),
            &synthesized.table,
            &numeric_columns,
        )?;

        Ok(OperationResult::completed(
            "activity generation completed",
            &config.output_path,
            synthesized.rows_processed,
            ActivityCounters {},
        ))
    }

    fn try_remove_chinese_rows(&self, config: &ChineseRemoveConfig) -> Result<ChineseRemoveResult> {
        config.validate()?;
        let detector = HanDetector::new()?;
        let source = self.resolver.require(&config.excel_file)?;
        let table = self.read_source(&source)?;

        let removed = remove_han_rows(table, &source, &config.checked_columns, &detector)?;
        info!(
            rows_removed = removed.rows_removed,
            checked = config.checked_columns.len(),
            "removed rows containing chinese characters"
        );
        write_table(Path::new(&config.output_path), &removed.table)?;

        Ok(OperationResult::completed(
            "chinese row removal completed",
            &config.output_path,
            removed.rows_processed,
            ChineseRemoveCounters {
                rows_removed: removed.rows_removed,
                rows_kept: removed.rows_kept(),
            },
        ))
    }

    fn try_filter_txt(&self, config: &TxtFilterConfig) -> Result<TxtFilterResult> {
        config.validate()?;
        let main_path = self.resolver.require(&config.main_file)?;
        let sub_path = self.resolver.require(&config.sub_file)?;

        let members = read_membership(&sub_path)?;
        let lines = read_text_source(&main_path)?;
        let filtered = filter_lines(lines, &members, config.filter_type);
        write_lines(Path::new(&config.output_path), &filtered.lines)?;

        Ok(OperationResult::completed(
            "text filter completed",
            &config.output_path,
            filtered.lines_processed,
            TxtFilterCounters {
                rows_filtered: filtered.lines_removed,
            },
        ))
    }

    fn try_interleave_txt(&self, config: &TxtInterleaveConfig) -> Result<InterleaveResult> {
        config.validate()?;
        let main_path = self.resolver.require(&config.main_file)?;
        let sub_path = self.resolver.require(&config.sub_file)?;

        let main = read_text_source(&main_path)?;
        let sub = read_text_source(&sub_path)?;
        let (main_lines, sub_lines) = (main.len(), sub.len());
        let merged = interleave_lines(main, sub);
        write_lines(Path::new(&config.output_path), &merged)?;

        Ok(InterleaveResult {
            success: true,
            message: "text interleave completed".to_string(),
            output_path: config.output_path.clone(),
            main_lines,
            sub_lines,
            total_lines: merged.len(),
        })
    }

    fn try_split_phone_numbers(&self, config: &PhoneSplitConfig) -> Result<PhoneSplitResult> {
        config.validate()?;
        let source = self.resolver.require(&config.input_file)?;
        let numbers = read_text_source(&source)?;
        let total_numbers = numbers.len();

        let output_dir = Path::new(&config.output_dir);
        ensure_dir(output_dir)?;
        let stem = source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "numbers".to_string());

        let mut split_results = BTreeMap::new();
        for (digits, group) in split_by_digit_count(numbers) {
            let target = output_dir.join(format!("{stem}_{digits}.txt"));
            write_lines(&target, &group)?;
            info!(digits, numbers = group.len(), file = %target.display(), "wrote split file");
            split_results.insert(digits, group.len());
        }

        Ok(PhoneSplitResult {
            success: true,
            message: "phone split completed".to_string(),
            output_dir: config.output_dir.clone(),
            total_numbers,
            split_results,
        })
    }

    /// Reads a single-source table, rejecting sources without any record.
    fn read_source(&self, path: &Path) -> Result<Table> {
        let table = read_table(path)?;
        if table.is_empty() {
            return Err(ToolError::EmptySheet(path.to_path_buf()));
        }
        info!(file = %path.display(), rows = table.row_count(), "read source");
        Ok(table)
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(PathResolver::standard())
    }
}

/// Reads the non-blank lines of a text source, rejecting files without any.
fn read_text_source(path: &Path) -> Result<Vec<String>> {
    let lines = read_lines(path)?;
    if lines.is_empty() {
        return Err(ToolError::EmptyTextFile(path.to_path_buf()));
    }
    info!(file = %path.display(), lines = lines.len(), "read text source");
    Ok(lines)
}

fn finish<R: Report>(operation: &str, outcome: Result<R>) -> R {
    match outcome {
        Ok(result) => {
            info!(operation, "operation completed");
            result
        }
        Err(error) => {
            warn!(operation, %error, "operation failed");
            R::failure(error.to_string())
        }
    }
}

/// Result of a dispatched [`OperationRequest`], serialised without a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OperationOutcome {
    Merge(MergeResult),
    Filter(FilterResult),
    Update(UpdateResult),
    AgeProcess(AgeProcessResult),
    Activity(ActivityResult),
    RemoveChineseRows(ChineseRemoveResult),
    TxtFilter(TxtFilterResult),
    TxtInterleave(InterleaveResult),
    PhoneSplit(PhoneSplitResult),
}

impl OperationOutcome {
    pub fn success(&self) -> bool {
        match self {
            OperationOutcome::Merge(result) => result.succeeded(),
            OperationOutcome::Filter(result) => result.succeeded(),
            OperationOutcome::Update(result) => result.succeeded(),
            OperationOutcome::AgeProcess(result) => result.succeeded(),
            OperationOutcome::Activity(result) => result.succeeded(),
            OperationOutcome::RemoveChineseRows(result) => result.succeeded(),
            OperationOutcome::TxtFilter(result) => result.succeeded(),
            OperationOutcome::TxtInterleave(result) => result.succeeded(),
            OperationOutcome::PhoneSplit(result) => result.succeeded(),
        }
    }
}
