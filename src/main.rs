use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;
use ts_sheet_tools::io::resolve::list_spreadsheets;
use ts_sheet_tools::model::{
    ActivityConfig, AgeProcessConfig, ChineseRemoveConfig, FilterConfig, FilterMode, MergeConfig,
    OperationRequest, PhoneSplitConfig, TxtFilterConfig, TxtInterleaveConfig, UpdateConfig,
};
use ts_sheet_tools::orchestrate::{OperationOutcome, Orchestrator};
use ts_sheet_tools::{Result, ToolError};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.verbose) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}

/// Runs the selected command and reports whether it succeeded.
fn run(cli: Cli) -> Result<bool> {
    let orchestrator = Orchestrator::default();
    let mut rng = seeded_rng(cli.seed);

    let outcome = match cli.command {
        Command::Merge(args) => {
            let config = MergeConfig {
                remove_duplicates: args.dedupe_column.is_some(),
                deduplicate_column: args.dedupe_column.unwrap_or_default(),
                output_path: args.output,
            };
            OperationOutcome::Merge(orchestrator.merge_files(&args.files, &config))
        }
        Command::Filter(args) => {
            let config = FilterConfig {
                excel_file: args.input,
                txt_file: args.members,
                column_name: args.column,
                filter_type: args.mode.into(),
                output_path: args.output,
            };
            OperationOutcome::Filter(orchestrator.filter_file(&config))
        }
        Command::Update(args) => {
            let config = UpdateConfig {
                main_file: args.main,
                sub_file: args.sub,
                match_column: args.match_column,
                update_columns: args.update_columns,
                output_path: args.output,
            };
            OperationOutcome::Update(orchestrator.update_file(&config))
        }
        Command::Age(args) => {
            let config = AgeProcessConfig {
                excel_file: args.input,
                age_column: args.column,
                threshold: args.threshold,
                increment: args.increment,
                output_path: args.output,
            };
            OperationOutcome::AgeProcess(orchestrator.process_age(&config))
        }
        Command::Activity(args) => {
            let config = ActivityConfig {
                excel_file: args.input,
                max_days: args.max_days,
                output_path: args.output,
            };
            OperationOutcome::Activity(orchestrator.generate_activity(&config, &mut rng))
        }
        Command::RemoveChinese(args) => {
            let config = ChineseRemoveConfig {
                excel_file: args.input,
                output_path: args.output,
                checked_columns: args.columns,
            };
            OperationOutcome::RemoveChineseRows(orchestrator.remove_chinese_rows(&config))
        }
        Command::TxtFilter(args) => {
            let config = TxtFilterConfig {
                main_file: args.main,
                sub_file: args.sub,
                filter_type: args.mode.into(),
                output_path: args.output,
            };
            OperationOutcome::TxtFilter(orchestrator.filter_txt(&config))
        }
        Command::Interleave(args) => {
            let config = TxtInterleaveConfig {
                main_file: args.main,
                sub_file: args.sub,
                output_path: args.output,
            };
            OperationOutcome::TxtInterleave(orchestrator.interleave_txt(&config))
        }
        Command::SplitPhones(args) => {
            let config = PhoneSplitConfig {
                input_file: args.input,
                output_dir: args.output_dir,
            };
            OperationOutcome::PhoneSplit(orchestrator.split_phone_numbers(&config))
        }
        Command::Headers { file } => {
            let headers = orchestrator.table_headers(&file)?;
            println!("{}", serde_json::to_string_pretty(&headers)?);
            return Ok(true);
        }
        Command::Run { request } => {
            let data = std::fs::read_to_string(&request)?;
            let request: OperationRequest = serde_json::from_str(&data)?;
            orchestrator.run(&request, &mut rng)
        }
        Command::List { folder } => {
            for path in list_spreadsheets(&folder)? {
                println!("{}", path.display());
            }
            return Ok(true);
        }
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(outcome.success())
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Merge, filter, and augment CSV and Excel tables."
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, global = true)]
    verbose: bool,

    /// Seed for the random source used by `activity`.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge several files into one workbook.
    Merge(MergeArgs),
    /// Keep or drop rows listed in a text file.
    Filter(FilterArgs),
    /// Copy columns from a subordinate file into matching rows.
    Update(UpdateArgs),
    /// Raise ages below a threshold.
    Age(AgeArgs),
    /// Append simulated activity columns.
    Activity(ActivityArgs),
    /// Drop rows containing Chinese characters.
    RemoveChinese(RemoveChineseArgs),
    /// Keep or drop lines of a text file listed in another text file.
    TxtFilter(TxtFilterArgs),
    /// Spread the lines of one text file evenly through another.
    Interleave(InterleaveArgs),
    /// Split a phone number list into one file per digit count.
    SplitPhones(SplitPhonesArgs),
    /// Print the header names of a table as JSON.
    Headers { file: String },
    /// Execute an operation described by a JSON request file.
    Run {
        /// Path to a JSON request such as `{"operation": "merge", "files": [...], "config": {...}}`.
        request: PathBuf,
    },
    /// List the spreadsheets directly inside a folder.
    List { folder: PathBuf },
}

#[derive(clap::Args)]
struct MergeArgs {
    /// Source files, merged in the order given.
    #[arg(required = true)]
    files: Vec<String>,

    /// Keep only the first row for each value of this column.
    #[arg(long)]
    dedupe_column: Option<String>,

    /// Output workbook path.
    #[arg(long)]
    output: String,
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Source table.
    #[arg(long)]
    input: String,

    /// Text file with one value per line.
    #[arg(long)]
    members: String,

    /// Column compared against the membership list.
    #[arg(long)]
    column: String,

    #[arg(long, value_enum, default_value_t = FilterModeKind::Include)]
    mode: FilterModeKind,

    /// Output workbook path.
    #[arg(long)]
    output: String,
}

#[derive(clap::Args)]
struct UpdateArgs {
    /// Table whose rows are updated.
    #[arg(long)]
    main: String,

    /// Table providing the replacement values.
    #[arg(long)]
    sub: String,

    /// Column joining the two tables.
    #[arg(long)]
    match_column: String,

    /// Columns to overwrite; repeat or separate with commas.
    #[arg(long = "update-column", value_delimiter = ',', required = true)]
    update_columns: Vec<String>,

    /// Output workbook path.
    #[arg(long)]
    output: String,
}

#[derive(clap::Args)]
struct AgeArgs {
    #[arg(long)]
    input: String,

    /// Column holding the age.
    #[arg(long)]
    column: String,

    /// Ages strictly below this value are raised.
    #[arg(long, allow_negative_numbers = true)]
    threshold: i64,

    /// Amount added to each matching age.
    #[arg(long, allow_negative_numbers = true)]
    increment: i64,

    /// Output workbook path.
    #[arg(long)]
    output: String,
}

#[derive(clap::Args)]
struct ActivityArgs {
    #[arg(long)]
    input: String,

    /// Upper bound (inclusive) for the simulated days since last activity.
    #[arg(long, allow_negative_numbers = true)]
    max_days: i64,

    /// Output workbook path.
    #[arg(long)]
    output: String,
}

#[derive(clap::Args)]
struct RemoveChineseArgs {
    #[arg(long)]
    input: String,

    /// Columns to inspect; every column when omitted.
    #[arg(long = "column", value_delimiter = ',')]
    columns: Vec<String>,

    /// Output workbook path.
    #[arg(long)]
    output: String,
}

#[derive(clap::Args)]
struct TxtFilterArgs {
    /// Text file whose lines are filtered.
    #[arg(long)]
    main: String,

    /// Text file with one value per line.
    #[arg(long)]
    sub: String,

    #[arg(long, value_enum, default_value_t = FilterModeKind::Include)]
    mode: FilterModeKind,

    /// Output text file path.
    #[arg(long)]
    output: String,
}

#[derive(clap::Args)]
struct InterleaveArgs {
    #[arg(long)]
    main: String,

    /// Lines spread through the main file.
    #[arg(long)]
    sub: String,

    /// Output text file path.
    #[arg(long)]
    output: String,
}

#[derive(clap::Args)]
struct SplitPhonesArgs {
    /// Text file with one phone number per line.
    #[arg(long)]
    input: String,

    /// Directory receiving one file per digit count.
    #[arg(long)]
    output_dir: String,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FilterModeKind {
    Include,
    Exclude,
}

impl From<FilterModeKind> for FilterMode {
    fn from(kind: FilterModeKind) -> Self {
        match kind {
            FilterModeKind::Include => FilterMode::Include,
            FilterModeKind::Exclude => FilterMode::Exclude,
        }
    }
}
