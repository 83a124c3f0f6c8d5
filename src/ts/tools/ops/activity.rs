use chrono::{NaiveDateTime, TimeDelta};
use rand::Rng;

use crate::ts::tools::error::{Result, ToolError};
use crate::ts::tools::model::{Row, Table};

pub const ACTIVITY_TIME_COLUMN: &str = "activity timestamp";
pub const ACTIVITY_DAYS_COLUMN: &str = "days-since-active";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MILLIS_PER_DAY: i64 = 86_400_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySynthesized {
    pub table: Table,
    pub rows_processed: usize,
    /// Position of the day-count column, which is written as numbers.
    pub days_column: usize,
}

/// Appends a random "last active" timestamp and its day count to every row.
///
/// For each row a day count `d` is drawn from `0..=max_days`, then an instant
/// in `(now - (d + 1) days, now - d days]`. Rows are first normalised to the
/// header width so the new cells line up with the new header columns.
pub fn synthesize_activity<R: Rng>(
    table: Table,
    max_days: i64,
    now: NaiveDateTime,
    rng: &mut R,
) -> Result<ActivitySynthesized> {
    if max_days < 0 {
        return Err(ToolError::InvalidParameters(format!(
            "maxDays must be >= 0 (got {max_days})"
        )));
    }
    // Reject day counts whose window would fall outside the calendar.
    activity_instant(now, max_days, MILLIS_PER_DAY - 1)?;

    let rows_processed = table.row_count();
    let Table { mut header, rows } = table;
    let width = header.len();
    header.push(ACTIVITY_TIME_COLUMN.to_string());
    header.push(ACTIVITY_DAYS_COLUMN.to_string());

    let mut synthesized: Vec<Row> = Vec::with_capacity(rows.len());
    for mut row in rows {
        let days = if max_days == 0 {
            0
        } else {
            rng.gen_range(0..=max_days)
        };
        let offset_millis = rng.gen_range(0..MILLIS_PER_DAY);
        let instant = activity_instant(now, days, offset_millis)?;

        row.resize(width, String::new());
        row.push(instant.format(TIMESTAMP_FORMAT).to_string());
        row.push(days.to_string());
        synthesized.push(row);
    }

    Ok(ActivitySynthesized {
        table: Table::new(header, synthesized),
        rows_processed,
        days_column: width + 1,
    })
}

fn activity_instant(now: NaiveDateTime, days: i64, offset_millis: i64) -> Result<NaiveDateTime> {
    TimeDelta::try_days(days)
        .zip(TimeDelta::try_milliseconds(offset_millis))
        .and_then(|(back, offset)| now.checked_sub_signed(back)?.checked_sub_signed(offset))
        .ok_or_else(|| {
            ToolError::InvalidParameters(format!("maxDays {days} exceeds the supported date range"))
        })
}
