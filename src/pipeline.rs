use tracing::info;

use crate::{
    error::Result,
    ingestion::{self, SkippedDocument},
    manifest::PageManifest,
    render::MarkdownRenderer,
    search_index::SearchIndex,
    site_root::SiteRoot,
    walker::{self, WalkOptions},
};

/// Knobs for a full rebuild.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub walk: WalkOptions,
    /// Pretty-print `search_index.json` (the manifest is always pretty).
    pub pretty_index: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            walk: WalkOptions::default(),
            pretty_index: true,
        }
    }
}

/// What a rebuild produced.
#[derive(Debug)]
pub struct BuildReport {
    /// Documents listed in `pages.json`.
    pub pages: usize,
    /// Documents present in `search_index.json`.
    pub indexed: usize,
    /// Documents listed in the manifest but left out of the index.
    pub skipped: Vec<SkippedDocument>,
}

/// An output file that has just been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Written {
    /// `pages.json`, with the number of pages listed.
    Manifest { pages: usize },
    /// `search_index.json`, with the number of documents indexed.
    Index { documents: usize },
}

/// Rebuild `pages.json` and `search_index.json` for `site` from scratch.
///
/// Per-document failures are logged and reported in
/// [`BuildReport::skipped`]. Failing to read the root or to write either
/// output aborts the build.
pub fn build_site_index(
    site: &SiteRoot,
    options: &BuildOptions,
) -> Result<BuildReport> {
    build_site_index_with(site, options, |_| {})
}

/// Like [`build_site_index`], calling `on_written` right after each output
/// file lands on disk.
pub fn build_site_index_with(
    site: &SiteRoot,
    options: &BuildOptions,
    mut on_written: impl FnMut(Written),
) -> Result<BuildReport> {
    let files = walker::discover_documents(site.root(), &options.walk)?;

    let manifest = PageManifest::from_files(&files);
    let manifest_path = site.pages_manifest();
    manifest.write(&manifest_path)?;
    info!(path = %manifest_path.display(), pages = manifest.len(), "wrote page manifest");
    on_written(Written::Manifest {
        pages: manifest.len(),
    });

    let conversion = ingestion::convert_documents(&files, &MarkdownRenderer);

    let index = SearchIndex::from_records(&conversion.records);
    let index_path = site.search_index();
    index.write(&index_path, options.pretty_index)?;
    info!(path = %index_path.display(), documents = index.len(), "wrote search index");
    on_written(Written::Index {
        documents: index.len(),
    });

    Ok(BuildReport {
        pages: manifest.len(),
        indexed: index.len(),
        skipped: conversion.skipped,
    })
}
