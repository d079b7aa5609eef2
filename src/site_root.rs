use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File name of the page manifest written to the site root.
pub const PAGES_FILE: &str = "pages.json";

/// File name of the serialized search index written to the site root.
pub const SEARCH_INDEX_FILE: &str = "search_index.json";

/// The directory a site is built from and written back into.
#[derive(Debug, Clone)]
pub struct SiteRoot {
    root: PathBuf,
}

impl SiteRoot {
    /// Resolve the site root from, in order of priority:
    /// 1. An explicit path (from the command line)
    /// 2. The current working directory
    ///
    /// The path must exist and be a directory. It is canonicalized so that
    /// relative paths computed during traversal never carry `..` or `./`.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = match explicit {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir()?,
        };

        if !root.exists() {
            return Err(Error::NotFound {
                kind: "site root",
                name: root.display().to_string(),
            });
        }
        if !root.is_dir() {
            return Err(Error::Config(format!(
                "site root is not a directory: {}",
                root.display()
            )));
        }

        let root = root.canonicalize().map_err(|e| {
            Error::Config(format!("cannot resolve {}: {e}", root.display()))
        })?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pages_manifest(&self) -> PathBuf {
        self.root.join(PAGES_FILE)
    }

    pub fn search_index(&self) -> PathBuf {
        self.root.join(SEARCH_INDEX_FILE)
    }
}
