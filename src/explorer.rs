use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};

pub const OUTPUT_FILE_NAME: &str = "DOCUMENTATION.md";

/// What a run works on: the files to document and where the result goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub files: Vec<PathBuf>,
    pub output_path: PathBuf,
}

impl Target {
    /// True when the whole run covers exactly one file.
    pub fn is_single_file(&self) -> bool {
        self.files.len() == 1
    }
}

/// Classifies `path` and collects the files below it.
///
/// A file yields itself, with the output placed in its parent directory.
/// A directory yields every regular file reachable from it, skipping
/// subdirectories whose name starts with a dot, with the output placed inside
/// the directory.
pub fn resolve_target(path: &Path) -> Result<Target> {
    let meta = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::NotFound {
            path: path.to_path_buf(),
        },
        _ => Error::io(path, e),
    })?;

    if meta.is_file() {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Ok(Target {
            files: vec![path.to_path_buf()],
            output_path: parent.join(OUTPUT_FILE_NAME),
        })
    } else if meta.is_dir() {
        Ok(Target {
            files: walk_dir(path),
            output_path: path.join(OUTPUT_FILE_NAME),
        })
    } else {
        Err(Error::InvalidPath {
            path: path.to_path_buf(),
        })
    }
}

/// Lists regular files under `root`, sorted by name at every level.
fn walk_dir(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden_dir(entry));

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            // broken links, permission errors and link loops
            Err(e) => debug!("Skipping unreadable entry: {}", e),
        }
    }

    debug!("Collected {} files under {}", files.len(), root.display());
    files
}

// The root is never pruned, so `.` or a dot-named target still works.
fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}
