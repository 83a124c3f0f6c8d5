use std::collections::HashSet;
use std::path::Path;

use crate::ts::tools::error::{Result, ToolError};
use crate::ts::tools::io::text::read_lines;

/// Set of trimmed values read from a newline-delimited text file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipSet {
    values: HashSet<String>,
}

impl MembershipSet {
    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value.trim())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for MembershipSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let values = iter
            .into_iter()
            .map(|value| value.as_ref().trim().to_string())
            .filter(|value| !value.is_empty())
            .collect();
        Self { values }
    }
}

/// Reads one value per line, skipping blank lines. A file without any value
/// is rejected with [`ToolError::EmptyMembershipFile`].
pub fn read_membership(path: &Path) -> Result<MembershipSet> {
    let set: MembershipSet = read_lines(path)?.into_iter().collect();
    if set.is_empty() {
        return Err(ToolError::EmptyMembershipFile(path.to_path_buf()));
    }
    Ok(set)
}
