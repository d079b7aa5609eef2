use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    page_ref::{PageRef, SOURCE_EXTENSION},
};

/// A discovered document file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Path relative to the site root directory.
    pub relative_path: PathBuf,
    /// Path used to read the file (root joined with `relative_path`).
    pub absolute_path: PathBuf,
}

impl DiscoveredFile {
    pub fn page(&self) -> PageRef {
        PageRef::new(&self.relative_path)
    }
}

/// Order in which discovered documents are returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Sorted by relative path, component by component. Stable across runs
    /// and filesystems.
    #[default]
    Sorted,
    /// Whatever order the filesystem enumerates entries in. Files of a
    /// directory come before the contents of its subdirectories.
    Filesystem,
}

#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub order: TraversalOrder,
    /// Glob patterns matched against relative paths. Matching files are
    /// skipped and matching directories are not descended into.
    pub exclude: Vec<String>,
}

/// Recursively walk `root` and discover markdown documents.
///
/// Hidden entries are included. Symlinks to files are followed, symlinks to
/// directories are not descended into, and broken symlinks are skipped.
/// An unreadable root is an error; an unreadable subdirectory is logged and
/// skipped.
pub fn discover_documents(
    root: &Path,
    options: &WalkOptions,
) -> Result<Vec<DiscoveredFile>> {
    let exclude = build_exclude(&options.exclude)?;
    let mut results = Vec::new();
    walk_dir(root, root, &exclude, &mut results)?;

    if options.order == TraversalOrder::Sorted {
        results.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    }

    debug!(count = results.len(), root = %root.display(), "discovered documents");
    Ok(results)
}

fn build_exclude(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            Error::Config(format!("invalid exclude pattern '{pattern}': {e}"))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::Config(format!("invalid exclude patterns: {e}")))
}

fn walk_dir(
    root: &Path,
    current: &Path,
    exclude: &GlobSet,
    results: &mut Vec<DiscoveredFile>,
) -> std::io::Result<()> {
    let entries = std::fs::read_dir(current)?;
    let mut subdirs = Vec::new();

    for entry in entries {
        // Entries can vanish between listing and inspection.
        let Ok(entry) = entry else { continue };
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        if exclude.is_match(&relative) {
            continue;
        }

        if file_type.is_dir() {
            subdirs.push(path);
        } else if file_type.is_symlink() {
            let Ok(target) = std::fs::metadata(&path) else {
                continue; // broken symlink
            };
            if target.is_file() && is_document(&path) {
                results.push(DiscoveredFile {
                    relative_path: relative,
                    absolute_path: path,
                });
            }
        } else if file_type.is_file() && is_document(&path) {
            results.push(DiscoveredFile {
                relative_path: relative,
                absolute_path: path,
            });
        }
    }

    for dir in subdirs {
        if let Err(e) = walk_dir(root, &dir, exclude, results) {
            warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
        }
    }

    Ok(())
}

fn is_document(path: &Path) -> bool {
    let suffix = format!(".{SOURCE_EXTENSION}");
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(&suffix))
}
