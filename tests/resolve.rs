use std::fs;

use tempfile::tempdir;
use ts_sheet_tools::ToolError;
use ts_sheet_tools::io::resolve::{PathResolver, list_spreadsheets};

#[test]
fn first_search_directory_containing_the_file_wins() {
    let downloads = tempdir().expect("downloads directory");
    let desktop = tempdir().expect("desktop directory");
    fs::write(downloads.path().join("both.csv"), "id\n").expect("file written");
    fs::write(desktop.path().join("both.csv"), "id\n").expect("file written");
    fs::write(desktop.path().join("desk.csv"), "id\n").expect("file written");

    let resolver = PathResolver::with_search_dirs([downloads.path(), desktop.path()]);

    assert_eq!(
        resolver.resolve("both.csv"),
        Some(downloads.path().join("both.csv"))
    );
    assert_eq!(
        resolver.resolve("desk.csv"),
        Some(desktop.path().join("desk.csv"))
    );
    assert_eq!(resolver.resolve("absent.csv"), None);
}

#[test]
fn absolute_paths_are_used_only_when_they_exist() {
    let dir = tempdir().expect("temporary directory");
    let existing = dir.path().join("data.xlsx");
    fs::write(&existing, "placeholder").expect("file written");
    let resolver = PathResolver::with_search_dirs([dir.path()]);

    let absolute = existing.to_str().expect("utf-8 path");
    assert_eq!(resolver.resolve(absolute), Some(existing.clone()));

    let missing = dir.path().join("gone.xlsx");
    assert_eq!(resolver.resolve(missing.to_str().expect("utf-8 path")), None);
}

#[test]
fn directories_do_not_count_as_files() {
    let dir = tempdir().expect("temporary directory");
    fs::create_dir(dir.path().join("folder.csv")).expect("directory created");
    let resolver = PathResolver::with_search_dirs([dir.path()]);

    assert_eq!(resolver.resolve("folder.csv"), None);
}

#[test]
fn require_reports_the_missing_reference() {
    let dir = tempdir().expect("temporary directory");
    let resolver = PathResolver::with_search_dirs([dir.path()]);

    let error = resolver.require("report.xlsx").expect_err("file is missing");
    assert!(matches!(error, ToolError::FileNotFound(ref name) if name == "report.xlsx"));
    assert!(error.to_string().contains("report.xlsx"));
}

#[test]
fn list_spreadsheets_finds_excel_files_only() {
    let dir = tempdir().expect("temporary directory");
    fs::write(dir.path().join("b.XLSX"), "x").expect("file written");
    fs::write(dir.path().join("a.xls"), "x").expect("file written");
    fs::write(dir.path().join("c.csv"), "x").expect("file written");
    fs::create_dir(dir.path().join("nested.xlsx")).expect("directory created");

    let found = list_spreadsheets(dir.path()).expect("folder listed");

    assert_eq!(
        found,
        vec![dir.path().join("a.xls"), dir.path().join("b.XLSX")]
    );
}
