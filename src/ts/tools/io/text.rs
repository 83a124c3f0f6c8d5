use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, instrument};

use crate::ts::tools::error::{Result, ToolError};

const UTF8_BOM: char = '\u{feff}';

/// Reads a newline-delimited text file into trimmed, non-blank lines.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, and a
/// leading byte-order mark is dropped.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|err| ToolError::file_open(path, err))?;
    let mut lines = Vec::new();
    for raw in BufReader::new(file).split(b'\n') {
        let raw = raw.map_err(|err| ToolError::file_open(path, err))?;
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_start_matches(UTF8_BOM).trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    debug!(lines = lines.len(), "read text lines");
    Ok(lines)
}

/// Writes one line per entry, each terminated by `\n`, overwriting `path`.
pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let file = File::create(path).map_err(|err| ToolError::write(path, err))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{line}").map_err(|err| ToolError::write(path, err))?;
    }
    writer.flush().map_err(|err| ToolError::write(path, err))
}

/// Creates `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|err| ToolError::write(dir, err))
}
