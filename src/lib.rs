//! sitedex - page manifest and search index generator for markdown sites.
//!
//! sitedex walks a directory of markdown documents, lists them in
//! `pages.json`, renders each one to HTML and writes a fielded, weighted
//! full-text index to `search_index.json`. The index uses the layout
//! [lunr.js](https://lunrjs.com) loads with `lunr.Index.load`, so a static
//! site can search it in the browser. Text analysis is done with
//! [Tantivy](https://github.com/quickwit-oss/tantivy)'s tokenizers.
//!
//! Every run is a full rebuild.
//!
//! # Quick start
//!
//! ```no_run
//! use sitedex::{BuildOptions, SearchIndex, SiteRoot, build_site_index};
//!
//! let site = SiteRoot::resolve(None).unwrap();
//! let report = build_site_index(&site, &BuildOptions::default()).unwrap();
//! println!("{} pages, {} indexed", report.pages, report.indexed);
//!
//! let index = SearchIndex::load(&site.search_index()).unwrap();
//! for hit in index.search("hello") {
//!     println!("{} (score: {:.3})", hit.url, hit.score);
//! }
//! ```

pub mod analyzer;
pub mod artifact;
pub mod error;
pub mod ingestion;
pub mod manifest;
pub mod page_ref;
pub mod pipeline;
pub mod render;
pub mod search_index;
pub mod site_root;
pub mod walker;

pub use error::{Error, Result};
pub use ingestion::DocumentRecord;
pub use manifest::PageManifest;
pub use page_ref::PageRef;
pub use pipeline::{
    BuildOptions,
    BuildReport,
    Written,
    build_site_index,
    build_site_index_with,
};
pub use search_index::{SearchHit, SearchIndex};
pub use site_root::SiteRoot;
