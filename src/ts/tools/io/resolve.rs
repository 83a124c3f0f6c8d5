use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ts::tools::error::{Result, ToolError};

/// Maps a bare file name onto a candidate location. Returns `None` when the
/// location itself cannot be determined (for example, no home directory).
type Probe = Box<dyn Fn(&Path) -> Option<PathBuf> + Send + Sync>;

/// Turns user-supplied file references into paths of files that exist.
///
/// Absolute references are accepted as-is when they exist. Relative references
/// are probed against each candidate location in order, and the first existing
/// file wins. A file that cannot be inspected counts as missing.
pub struct PathResolver {
    probes: Vec<Probe>,
}

impl PathResolver {
    /// Searches `~/Downloads`, the current working directory and `~/Desktop`.
    pub fn standard() -> Self {
        Self {
            probes: vec![
                Box::new(|name: &Path| {
                    dirs::home_dir().map(|home| home.join("Downloads").join(name))
                }) as Probe,
                Box::new(|name: &Path| std::env::current_dir().ok().map(|cwd| cwd.join(name))),
                Box::new(|name: &Path| {
                    dirs::home_dir().map(|home| home.join("Desktop").join(name))
                }),
            ],
        }
    }

    /// Searches the given directories, in order.
    pub fn with_search_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let probes = dirs
            .into_iter()
            .map(|dir| {
                let dir: PathBuf = dir.into();
                Box::new(move |name: &Path| Some(dir.join(name))) as Probe
            })
            .collect();
        Self { probes }
    }

    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let path = Path::new(reference);
        if path.is_absolute() {
            return is_existing_file(path).then(|| path.to_path_buf());
        }

        let found = self
            .probes
            .iter()
            .filter_map(|probe| probe(path))
            .find(|candidate| is_existing_file(candidate));
        match &found {
            Some(candidate) => debug!(reference, resolved = %candidate.display(), "resolved file"),
            None => debug!(reference, "file not found in any search location"),
        }
        found
    }

    /// Same as [`PathResolver::resolve`], but a miss becomes
    /// [`ToolError::FileNotFound`].
    pub fn require(&self, reference: &str) -> Result<PathBuf> {
        self.resolve(reference)
            .ok_or_else(|| ToolError::FileNotFound(reference.to_string()))
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::standard()
    }
}

fn is_existing_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

/// Lists the `.xlsx`/`.xls` files directly inside `folder`, sorted by path.
pub fn list_spreadsheets(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let path = entry.path();
        if is_spreadsheet(&path) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xls"))
        .unwrap_or(false)
}
