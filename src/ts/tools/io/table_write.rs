use std::collections::BTreeSet;
use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use tracing::{debug, instrument};

use crate::ts::tools::error::{Result, ToolError};
use crate::ts::tools::model::Table;

const SHEET_NAME: &str = "Sheet1";
const PROGRESS_INTERVAL: usize = 10_000;

/// Writes the table as a single-sheet workbook with every cell as text.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    write_table_with_numeric(path, table, &BTreeSet::new())
}

/// Writes the table as a single-sheet workbook, overwriting any existing file.
///
/// Cells in `numeric_columns` that parse as numbers become numeric cells;
/// everything else is written as text. The workbook is assembled in memory
/// and only saved once every row is in place.
///
/// Empty strings produce no cell. The sheet therefore spans the widest record:
/// rows longer than the header read back under empty header names, and a
/// column that is empty in every record, header included, is not carried.
#[instrument(
    level = "debug",
    skip_all,
    fields(output = %path.display(), rows = table.row_count())
)]
pub fn write_table_with_numeric(
    path: &Path,
    table: &Table,
    numeric_columns: &BTreeSet<usize>,
) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    fill_worksheet(worksheet, table, numeric_columns).map_err(|err| ToolError::write(path, err))?;
    workbook.save(path).map_err(|err| ToolError::write(path, err))?;
    debug!("workbook saved");
    Ok(())
}

fn fill_worksheet(
    worksheet: &mut Worksheet,
    table: &Table,
    numeric_columns: &BTreeSet<usize>,
) -> std::result::Result<(), XlsxError> {
    worksheet.set_name(SHEET_NAME)?;

    let widest_row = table.rows.iter().map(Vec::len).max().unwrap_or(0);
    if widest_row > table.header.len() {
        debug!(
            header = table.header.len(),
            widest_row, "rows extend past the header; sheet is widened"
        );
    }

    for (col_idx, header) in table.header.iter().enumerate() {
        worksheet.write_string(0, column_number(col_idx)?, header)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = row_number(row_idx + 1)?;
        for (col_idx, cell) in row.iter().enumerate() {
            let col_num = column_number(col_idx)?;
            if cell.is_empty() {
                continue;
            }
            match numeric_value(cell, numeric_columns.contains(&col_idx)) {
                Some(number) => worksheet.write_number(row_num, col_num, number)?,
                None => worksheet.write_string(row_num, col_num, cell)?,
            };
        }
        if row_idx > 0 && row_idx % PROGRESS_INTERVAL == 0 {
            debug!(written = row_idx, total = table.row_count(), "writing rows");
        }
    }
    Ok(())
}

fn numeric_value(cell: &str, is_numeric_column: bool) -> Option<f64> {
    if !is_numeric_column {
        return None;
    }
    cell.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

fn row_number(idx: usize) -> std::result::Result<u32, XlsxError> {
    u32::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}

fn column_number(idx: usize) -> std::result::Result<u16, XlsxError> {
    u16::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}
