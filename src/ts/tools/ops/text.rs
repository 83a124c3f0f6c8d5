//! Line-oriented operations on plain text lists.

use std::collections::BTreeMap;

use crate::ts::tools::io::membership::MembershipSet;
use crate::ts::tools::model::FilterMode;

#[derive(Debug, Clone, PartialEq)]
pub struct LinesFiltered {
    pub lines: Vec<String>,
    pub lines_processed: usize,
    pub lines_removed: usize,
}

/// Keeps the lines that are (include) or are not (exclude) in `members`.
pub fn filter_lines(lines: Vec<String>, members: &MembershipSet, mode: FilterMode) -> LinesFiltered {
    let lines_processed = lines.len();
    let lines: Vec<_> = lines
        .into_iter()
        .filter(|line| mode.keeps(members.contains(line)))
        .collect();
    let lines_removed = lines_processed - lines.len();
    LinesFiltered {
        lines,
        lines_processed,
        lines_removed,
    }
}

/// Spreads `sub` evenly through `main`, keeping the relative order of both.
///
/// Sub line `j` (zero-based) is placed after the first
/// `(j + 1) * main.len() / (sub.len() + 1)` main lines.
pub fn interleave_lines(main: Vec<String>, sub: Vec<String>) -> Vec<String> {
    let main_len = main.len();
    let slots = sub.len() + 1;
    let mut merged = Vec::with_capacity(main_len + sub.len());
    let mut main = main.into_iter();
    let mut placed = 0;
    for (idx, line) in sub.into_iter().enumerate() {
        let slot = (idx + 1) * main_len / slots;
        merged.extend(main.by_ref().take(slot - placed));
        placed = slot;
        merged.push(line);
    }
    merged.extend(main);
    merged
}

/// Number of ASCII digits in a phone number, ignoring `+`, spaces and dashes.
pub fn digit_count(number: &str) -> usize {
    number.chars().filter(char::is_ascii_digit).count()
}

/// Groups numbers by their digit count, preserving input order in each group.
pub fn split_by_digit_count(numbers: Vec<String>) -> BTreeMap<usize, Vec<String>> {
    let mut groups: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for number in numbers {
        groups.entry(digit_count(&number)).or_default().push(number);
    }
    groups
}
