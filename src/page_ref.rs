use std::path::{Component, Path};

/// Extension that marks a file as a source document.
pub const SOURCE_EXTENSION: &str = "md";

/// Extension of the rendered page a document is published as.
pub const OUTPUT_EXTENSION: &str = "html";

/// The identity of one document, shared by the page manifest and the
/// search index.
///
/// Both artifacts derive their identifiers from this one type, so the
/// manifest entry and the index ref of a document always agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    /// Forward-slash path relative to the site root, source extension kept
    /// (e.g. `guides/setup.md`). This is what `pages.json` lists.
    pub path: String,
    /// `path` with the source extension swapped for the output extension
    /// (e.g. `guides/setup.html`). This is the search index ref.
    pub url: String,
    /// File name without directory or extension (e.g. `setup`).
    pub title: String,
}

impl PageRef {
    /// Build a page reference from a path relative to the site root.
    pub fn new(relative_path: &Path) -> Self {
        let path = relative_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");

        let title = relative_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            url: url_for(&path),
            path,
            title,
        }
    }
}

/// Map a manifest entry to the url it is indexed under.
pub fn url_for(page_path: &str) -> String {
    let suffix = format!(".{SOURCE_EXTENSION}");
    match page_path.strip_suffix(&suffix) {
        Some(stem) => format!("{stem}.{OUTPUT_EXTENSION}"),
        None => page_path.to_string(),
    }
}

impl std::fmt::Display for PageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}
