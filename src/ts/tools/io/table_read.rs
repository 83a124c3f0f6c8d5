use std::path::Path;

use calamine::{DataType, Reader, open_workbook_auto};
use chrono::{NaiveDate, TimeDelta};
use tracing::{debug, instrument};

use crate::ts::tools::error::{Result, ToolError};
use crate::ts::tools::model::{Row, Table};

const UTF8_BOM: char = '\u{feff}';

/// Source formats recognised by [`read_table`], detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(SourceFormat::Csv),
            "xlsx" | "xls" => Some(SourceFormat::Spreadsheet),
            _ => None,
        }
    }
}

/// Reads the first sheet of a `.xlsx`/`.xls` workbook, or every record of a
/// `.csv` file, into a [`Table`] whose first record is the header.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_table(path: &Path) -> Result<Table> {
    let format =
        SourceFormat::detect(path).ok_or_else(|| ToolError::UnsupportedFormat(path.to_path_buf()))?;
    let records = match format {
        SourceFormat::Csv => read_csv_records(path)?,
        SourceFormat::Spreadsheet => read_sheet_records(path)?,
    };
    debug!(?format, record_count = records.len(), "read source records");
    Ok(Table::from_records(records))
}

fn read_csv_records(path: &Path) -> Result<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(|err| ToolError::file_open(path, err))?;

    let mut records = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|err| ToolError::file_open(path, err))?;
        let row = record
            .iter()
            .map(|field| clean_csv_field(&String::from_utf8_lossy(field)))
            .collect();
        records.push(row);
    }
    Ok(records)
}

fn clean_csv_field(field: &str) -> String {
    field.trim_start_matches(UTF8_BOM).trim().to_string()
}

fn read_sheet_records(path: &Path) -> Result<Vec<Row>> {
    let mut workbook = open_workbook_auto(path).map_err(|err| ToolError::file_open(path, err))?;
    if workbook.sheet_names().is_empty() {
        return Err(ToolError::EmptySheet(path.to_path_buf()));
    }

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ToolError::EmptySheet(path.to_path_buf()))?
        .map_err(|err| ToolError::file_open(path, err))?;

    // Ranges start at the first used cell; pad so positions match sheet columns.
    let leading_columns = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let records = range
        .rows()
        .map(|cells| {
            let mut row = vec![String::new(); leading_columns];
            row.extend(cells.iter().map(cell_to_string));
            row
        })
        .collect();
    Ok(records)
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Bool(value) => value.to_string(),
        DataType::DateTime(serial) => serial_to_string(*serial),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Renders an Excel date serial (days since 1899-12-30) as a timestamp, or as
/// a bare date when it has no time component.
fn serial_to_string(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return serial.to_string();
    };
    let seconds = (serial * 86_400.0).round();
    if !seconds.is_finite() {
        return serial.to_string();
    }
    let Some(stamp) = TimeDelta::try_seconds(seconds as i64)
        .and_then(|offset| epoch.checked_add_signed(offset))
    else {
        return serial.to_string();
    };
    if serial.fract() == 0.0 {
        stamp.format("%Y-%m-%d").to_string()
    } else {
        stamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
