use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ts_sheet_tools::ToolError;
use ts_sheet_tools::io::membership::MembershipSet;
use ts_sheet_tools::model::{FilterMode, Row, Table};
use ts_sheet_tools::ops::activity::{
    ACTIVITY_DAYS_COLUMN, ACTIVITY_TIME_COLUMN, TIMESTAMP_FORMAT, synthesize_activity,
};
use ts_sheet_tools::ops::age::{AgeRule, adjust_ages, parse_age};
use ts_sheet_tools::ops::filter::filter_table;
use ts_sheet_tools::ops::han::{HanDetector, remove_han_rows};
use ts_sheet_tools::ops::merge::{MergeSource, merge_tables};
use ts_sheet_tools::ops::text::{
    digit_count, filter_lines, interleave_lines, split_by_digit_count,
};
use ts_sheet_tools::ops::update::{JoinLookup, update_table};

fn row(cells: &[&str]) -> Row {
    cells.iter().map(|cell| cell.to_string()).collect()
}

fn source(name: &str, header: &[&str], rows: &[&[&str]]) -> MergeSource {
    MergeSource {
        path: PathBuf::from(name),
        table: Table::new(row(header), rows.iter().map(|cells| row(cells)).collect()),
    }
}

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, 19)
        .and_then(|date| date.and_hms_opt(20, 47, 59))
        .expect("valid timestamp")
}

#[test]
fn merge_counts_rows_and_dedupes_on_first_occurrence() {
    let sources = vec![
        source("a.csv", &["id", "name"], &[&["1", "Alice"], &["2", "Bob"]]),
        source("b.csv", &["id", "name"], &[&["1", "Alicia"], &["3", "Carol"]]),
    ];

    let merged = merge_tables(&sources, Some("id")).expect("merged");

    assert_eq!(merged.rows_processed, 4);
    assert_eq!(merged.rows_after_dedupe, 3);
    assert_eq!(merged.table.header, row(&["id", "name"]));
    assert_eq!(
        merged.table.rows,
        vec![
            row(&["1", "Alice"]),
            row(&["2", "Bob"]),
            row(&["3", "Carol"])
        ]
    );
}

#[test]
fn merge_without_dedupe_keeps_source_order() {
    let sources = vec![
        source("a.csv", &["id"], &[&["2"], &["1"]]),
        source("b.csv", &["id"], &[&["2"]]),
    ];

    let merged = merge_tables(&sources, None).expect("merged");

    assert_eq!(merged.rows_processed, 3);
    assert_eq!(merged.rows_after_dedupe, 3);
    assert_eq!(merged.table.rows, vec![row(&["2"]), row(&["1"]), row(&["2"])]);
}

#[test]
fn merge_dedupe_compares_trimmed_keys_and_short_rows_share_empty_key() {
    let sources = vec![source(
        "a.csv",
        &["name", "id"],
        &[&["A", " 7 "], &["B", "7"], &["C"], &["D", ""]],
    )];

    let merged = merge_tables(&sources, Some(" id ")).expect("merged");

    assert_eq!(merged.rows_after_dedupe, 2);
    assert_eq!(merged.table.rows, vec![row(&["A", " 7 "]), row(&["C", ""])]);
}

#[test]
fn merge_aligns_later_sources_by_column_name() {
    let sources = vec![
        source("empty.csv", &[], &[]),
        source("a.csv", &["id", "name", "city"], &[&["1", "Alice", "Paris"]]),
        source("b.csv", &["name", "id", "phone"], &[&["Bob", "2", "555"]]),
        source("c.csv", &["id", "name", "city"], &[&["3"]]),
    ];

    let merged = merge_tables(&sources, None).expect("merged");

    assert_eq!(merged.table.header, row(&["id", "name", "city"]));
    assert_eq!(
        merged.table.rows,
        vec![
            row(&["1", "Alice", "Paris"]),
            row(&["2", "Bob", ""]),
            row(&["3", "", ""])
        ]
    );
    assert_eq!(merged.rows_processed, 3);
}

#[test]
fn merge_of_empty_sources_reports_no_data() {
    let sources = vec![
        source("empty.csv", &[], &[]),
        source("header_only.csv", &["id"], &[]),
    ];

    let error = merge_tables(&sources, None).expect_err("nothing to merge");
    assert!(matches!(error, ToolError::NoData));
}

#[test]
fn merge_dedupe_on_absent_column_keeps_only_the_first_row() {
    let sources = vec![
        source("a.csv", &["id", "name"], &[&["1", "Alice"], &["2", "Bob"]]),
        source("b.csv", &["id", "name"], &[&["3", "Carol"]]),
    ];

    let merged = merge_tables(&sources, Some("phone")).expect("merged");

    assert_eq!(merged.rows_processed, 3);
    assert_eq!(merged.rows_after_dedupe, 1);
    assert_eq!(merged.table.rows, vec![row(&["1", "Alice"])]);
}

fn filter_fixture() -> Table {
    Table::new(
        row(&["code", "label"]),
        vec![
            row(&["A", "first"]),
            row(&[" B ", "second"]),
            row(&["C", "third"]),
            row(&["D", "fourth"]),
            row(&[]),
        ],
    )
}

#[test]
fn filter_exclude_drops_listed_values() {
    let members: MembershipSet = ["A", "B"].into_iter().collect();

    let filtered = filter_table(
        filter_fixture(),
        Path::new("codes.xlsx"),
        "code",
        &members,
        FilterMode::Exclude,
    )
    .expect("filtered");

    assert_eq!(filtered.rows_processed, 5);
    assert_eq!(filtered.rows_kept, 3);
    assert_eq!(filtered.table.header, row(&["code", "label"]));
    assert_eq!(
        filtered.table.rows,
        vec![row(&["C", "third"]), row(&["D", "fourth"]), row(&[])]
    );
}

#[test]
fn filter_include_and_exclude_partition_the_rows() {
    let members: MembershipSet = ["A", "B", ""].into_iter().collect();
    let path = Path::new("codes.xlsx");

    let included = filter_table(filter_fixture(), path, "code", &members, FilterMode::Include)
        .expect("included");
    let excluded = filter_table(filter_fixture(), path, "code", &members, FilterMode::Exclude)
        .expect("excluded");

    assert_eq!(included.rows_kept + excluded.rows_kept, 5);
    for original in &filter_fixture().rows {
        let in_included = included.table.rows.contains(original);
        let in_excluded = excluded.table.rows.contains(original);
        assert!(in_included != in_excluded, "row {original:?} must land in exactly one output");
    }
}

#[test]
fn filter_on_unknown_column_is_rejected() {
    let members: MembershipSet = ["A"].into_iter().collect();

    let error = filter_table(
        filter_fixture(),
        Path::new("codes.xlsx"),
        "missing",
        &members,
        FilterMode::Include,
    )
    .expect_err("unknown column");
    assert!(error.to_string().contains("missing"));
    assert!(error.to_string().contains("codes.xlsx"));
}

#[test]
fn update_overwrites_matching_rows_with_last_subordinate_value() {
    let sub = Table::new(
        row(&["phone", "status", "note"]),
        vec![
            row(&["100", "old", "x"]),
            row(&["200", " active ", "y"]),
            row(&["100", "new", "z"]),
            row(&["", "ignored", "w"]),
        ],
    );
    let update_columns = vec!["status".to_string(), "note".to_string()];
    let lookup = JoinLookup::build(&sub, Path::new("sub.xlsx"), "phone", &update_columns)
        .expect("lookup built");
    assert_eq!(lookup.len(), 2);

    let main = Table::new(
        row(&["name", "phone", "status", "note"]),
        vec![
            row(&["Alice", " 100 ", "pending", "-"]),
            row(&["Bob", "300", "pending", "-"]),
            row(&["Carol", "200"]),
        ],
    );
    let updated = update_table(
        main,
        Path::new("main.xlsx"),
        "phone",
        &update_columns,
        &lookup,
    )
    .expect("updated");

    assert_eq!(updated.rows_processed, 3);
    assert_eq!(updated.rows_updated, 2);
    assert_eq!(
        updated.table.rows,
        vec![
            row(&["Alice", " 100 ", "new", "z"]),
            row(&["Bob", "300", "pending", "-"]),
            row(&["Carol", "200", "active", "y"]),
        ]
    );
}

#[test]
fn update_leaves_columns_missing_from_subordinate_untouched() {
    let sub = Table::new(row(&["id", "status"]), vec![row(&["1", "done"])]);
    let update_columns = vec!["status".to_string(), "owner".to_string()];
    let lookup = JoinLookup::build(&sub, Path::new("sub.csv"), "id", &update_columns)
        .expect("lookup built");

    let main = Table::new(
        row(&["id", "status", "owner"]),
        vec![row(&["1", "open", "Dana"])],
    );
    let updated = update_table(main, Path::new("main.csv"), "id", &update_columns, &lookup)
        .expect("updated");

    assert_eq!(updated.table.rows, vec![row(&["1", "done", "Dana"])]);
}

#[test]
fn update_requires_every_column_in_main_header() {
    let sub = Table::new(row(&["id", "status"]), vec![row(&["1", "done"])]);
    let update_columns = vec!["status".to_string()];
    let lookup = JoinLookup::build(&sub, Path::new("sub.csv"), "id", &update_columns)
        .expect("lookup built");

    let main = Table::new(row(&["id", "state"]), vec![row(&["1", "open"])]);
    let error = update_table(main, Path::new("main.csv"), "id", &update_columns, &lookup)
        .expect_err("status missing from main");
    assert!(matches!(error, ToolError::ColumnNotFound { ref column, .. } if column == "status"));
}

#[test]
fn subordinate_without_keyed_rows_is_rejected() {
    let sub = Table::new(row(&["id", "status"]), vec![row(&["", "done"]), row(&[])]);

    let error = JoinLookup::build(&sub, Path::new("sub.csv"), "id", &["status".to_string()])
        .expect_err("no keys");
    assert!(matches!(error, ToolError::NoValidData { .. }));
}

#[test]
fn parse_age_accepts_integers_and_truncated_floats() {
    assert_eq!(parse_age("17"), Some(17));
    assert_eq!(parse_age(" 17 "), Some(17));
    assert_eq!(parse_age("17.9"), Some(17));
    assert_eq!(parse_age("-3.5"), Some(-3));
    assert_eq!(parse_age("unknown"), None);
    assert_eq!(parse_age(""), None);
    assert_eq!(parse_age("NaN"), None);
}

#[test]
fn ages_below_threshold_are_incremented() {
    let table = Table::new(
        row(&["name", "age"]),
        vec![
            row(&["a", "17"]),
            row(&["b", "18"]),
            row(&["c", "16.7"]),
            row(&["d", "n/a"]),
            row(&["e"]),
            row(&["f", "40"]),
        ],
    );
    let rule = AgeRule::new(18, 5).expect("valid rule");

    let adjusted = adjust_ages(table, Path::new("ages.xlsx"), "age", rule).expect("adjusted");

    assert_eq!(adjusted.rows_processed, 6);
    assert_eq!(adjusted.rows_modified, 2);
    assert_eq!(
        adjusted.table.rows,
        vec![
            row(&["a", "22"]),
            row(&["b", "18"]),
            row(&["c", "21"]),
            row(&["d", "n/a"]),
            row(&["e"]),
            row(&["f", "40"]),
        ]
    );
}

#[test]
fn age_rule_rejects_invalid_parameters() {
    assert!(matches!(AgeRule::new(-1, 1), Err(ToolError::InvalidParameters(_))));
    assert!(matches!(AgeRule::new(18, 0), Err(ToolError::InvalidParameters(_))));
    assert!(AgeRule::new(0, 1).is_ok());
}

#[test]
fn activity_columns_fall_inside_the_drawn_day_window() {
    let table = Table::new(
        row(&["id", "name"]),
        (0..50)
            .map(|idx| row(&[idx.to_string().as_str(), "x", "overflow"]))
            .collect(),
    );
    let now = fixed_now();
    let mut rng = StdRng::seed_from_u64(7);

    let synthesized = synthesize_activity(table, 30, now, &mut rng).expect("synthesized");

    assert_eq!(synthesized.rows_processed, 50);
    assert_eq!(synthesized.days_column, 3);
    assert_eq!(
        synthesized.table.header,
        row(&["id", "name", ACTIVITY_TIME_COLUMN, ACTIVITY_DAYS_COLUMN])
    );
    for synthesized_row in &synthesized.table.rows {
        assert_eq!(synthesized_row.len(), 4);
        let days: i64 = synthesized_row[3].parse().expect("day count");
        assert!((0..=30).contains(&days));
        let stamp = NaiveDateTime::parse_from_str(&synthesized_row[2], TIMESTAMP_FORMAT)
            .expect("timestamp");
        let upper = now - TimeDelta::days(days);
        let lower = now - TimeDelta::days(days + 1);
        assert!(stamp <= upper && stamp >= lower, "{stamp} outside window for {days} days");
    }
}

#[test]
fn activity_with_zero_max_days_stays_within_the_last_day() {
    let table = Table::new(row(&["id"]), vec![row(&["1"]), row(&["2"])]);
    let now = fixed_now();
    let mut rng = StdRng::seed_from_u64(1);

    let synthesized = synthesize_activity(table, 0, now, &mut rng).expect("synthesized");

    for synthesized_row in &synthesized.table.rows {
        assert_eq!(synthesized_row[2], "0");
        let stamp = NaiveDateTime::parse_from_str(&synthesized_row[1], TIMESTAMP_FORMAT)
            .expect("timestamp");
        assert!(stamp <= now && stamp >= now - TimeDelta::days(1));
    }
}

#[test]
fn activity_is_reproducible_with_the_same_seed() {
    let table = Table::new(row(&["id"]), (0..10).map(|idx| row(&[idx.to_string().as_str()])).collect());

    let first = synthesize_activity(table.clone(), 9, fixed_now(), &mut StdRng::seed_from_u64(42))
        .expect("first run");
    let second = synthesize_activity(table, 9, fixed_now(), &mut StdRng::seed_from_u64(42))
        .expect("second run");

    assert_eq!(first, second);
}

#[test]
fn activity_rejects_out_of_range_days() {
    let table = Table::new(row(&["id"]), vec![row(&["1"])]);
    let mut rng = StdRng::seed_from_u64(3);

    assert!(matches!(
        synthesize_activity(table.clone(), -1, fixed_now(), &mut rng),
        Err(ToolError::InvalidParameters(_))
    ));
    assert!(matches!(
        synthesize_activity(table, i64::MAX, fixed_now(), &mut rng),
        Err(ToolError::InvalidParameters(_))
    ));
}

fn lines(values: &[&str]) -> Vec<String> {
    row(values)
}

#[test]
fn han_detection_covers_common_and_extended_ideographs() {
    let detector = HanDetector::new().expect("pattern compiles");

    assert!(detector.contains_han("上海"));
    assert!(detector.contains_han("Room 3 号"));
    assert!(detector.contains_han("\u{20000}"));
    assert!(!detector.contains_han("Zürich"));
    assert!(!detector.contains_han("こんにちは"));
    assert!(!detector.contains_han(""));
}

#[test]
fn han_rows_are_removed_without_touching_the_header() {
    let detector = HanDetector::new().expect("pattern compiles");
    let table = Table::new(
        row(&["名字", "city"]),
        vec![
            row(&["Alice", "Paris"]),
            row(&["Bob", "北京"]),
            row(&["Carol"]),
        ],
    );

    let removed =
        remove_han_rows(table, Path::new("people.xlsx"), &[], &detector).expect("removed");

    assert_eq!(removed.rows_processed, 3);
    assert_eq!(removed.rows_removed, 1);
    assert_eq!(removed.rows_kept(), 2);
    assert_eq!(removed.table.header, row(&["名字", "city"]));
    assert_eq!(
        removed.table.rows,
        vec![row(&["Alice", "Paris"]), row(&["Carol"])]
    );
}

#[test]
fn text_filter_include_and_exclude_partition_lines() {
    let members: MembershipSet = ["b", "c"].into_iter().collect();
    let source = lines(&["a", "b", "c", "d"]);

    let included = filter_lines(source.clone(), &members, FilterMode::Include);
    let excluded = filter_lines(source, &members, FilterMode::Exclude);

    assert_eq!(included.lines, lines(&["b", "c"]));
    assert_eq!(excluded.lines, lines(&["a", "d"]));
    assert_eq!(included.lines_removed, 2);
    assert_eq!(included.lines_processed, 4);
}

#[test]
fn interleave_keeps_both_orders_and_spreads_evenly() {
    assert_eq!(
        interleave_lines(lines(&["m1", "m2"]), lines(&["s1", "s2", "s3"])),
        lines(&["s1", "m1", "s2", "s3", "m2"])
    );
    assert_eq!(
        interleave_lines(lines(&["m1", "m2", "m3", "m4", "m5", "m6"]), lines(&["s1", "s2"])),
        lines(&["m1", "m2", "s1", "m3", "m4", "s2", "m5", "m6"])
    );
    assert_eq!(
        interleave_lines(lines(&["m1"]), Vec::new()),
        lines(&["m1"])
    );
}

#[test]
fn phone_numbers_group_by_digits_in_input_order() {
    assert_eq!(digit_count("+86 138-0013-8000"), 13);
    assert_eq!(digit_count("n/a"), 0);

    let groups = split_by_digit_count(lines(&["123", "45", "678", "9"]));

    assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(groups[&3], lines(&["123", "678"]));
}
