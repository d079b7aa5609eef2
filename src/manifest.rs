use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    artifact,
    error::Result,
    walker::DiscoveredFile,
};

/// The list of every discovered document, as written to `pages.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageManifest {
    pub pages: Vec<String>,
}

impl PageManifest {
    /// Build the manifest from traversal output, keeping its order.
    pub fn from_files(files: &[DiscoveredFile]) -> Self {
        Self {
            pages: files.iter().map(|f| f.page().path).collect(),
        }
    }

    /// Overwrite `path` with the pretty-printed manifest.
    pub fn write(&self, path: &Path) -> Result<()> {
        artifact::write_json(path, self, true)
    }

    pub fn load(path: &Path) -> Result<Self> {
        artifact::read_json(path, "page manifest")
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
