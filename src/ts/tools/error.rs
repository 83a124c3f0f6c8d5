use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur while a
/// table is located, read, transformed, or written back out.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures outside the table reader and writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a JSON request or result cannot be (de)serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a source reference could not be found in any search location.
    #[error("file not found: {0} (searched: Downloads, current directory, Desktop)")]
    FileNotFound(String),

    /// Raised for sources whose extension is not `.csv`, `.xlsx` or `.xls`.
    #[error("unsupported file format: {} (only .xlsx, .xls and .csv are supported)", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Raised when a file exists but cannot be opened or parsed.
    #[error("failed to open {}: {reason}", .path.display())]
    FileOpen { path: PathBuf, reason: String },

    /// Raised when a workbook has no sheets, or a source holds no records.
    #[error("no sheet data in {}", .0.display())]
    EmptySheet(PathBuf),

    /// Raised when a configured column is not part of a header.
    #[error("column '{column}' not found in {}", .file.display())]
    ColumnNotFound { column: String, file: PathBuf },

    /// Raised when a required configuration field is blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Raised when numeric parameters are out of range.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Raised when the destination workbook cannot be written.
    #[error("failed to write {}: {reason}", .path.display())]
    Write { path: PathBuf, reason: String },

    /// Raised when a merge is requested without any source files.
    #[error("no files selected")]
    NoFilesSelected,

    /// Raised when every merge source is empty.
    #[error("no data read from any source file")]
    NoData,

    /// Raised when the subordinate table of a join yields no keyed rows.
    #[error("no usable rows keyed by '{column}' in {}", .file.display())]
    NoValidData { column: String, file: PathBuf },

    /// Raised when the membership list contains no values.
    #[error("membership file is empty: {}", .0.display())]
    EmptyMembershipFile(PathBuf),

    /// Raised when a text source has no non-blank line.
    #[error("text file is empty: {}", .0.display())]
    EmptyTextFile(PathBuf),

    /// Raised when a built-in character pattern fails to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ToolError {
    pub(crate) fn file_open(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ToolError::FileOpen {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ToolError::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn column_not_found(column: &str, file: impl Into<PathBuf>) -> Self {
        ToolError::ColumnNotFound {
            column: column.trim().to_string(),
            file: file.into(),
        }
    }
}
