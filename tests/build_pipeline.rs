use std::path::Path;

use sitedex::{
    BuildOptions,
    PageManifest,
    SearchIndex,
    SiteRoot,
    build_site_index,
    page_ref::url_for,
};

fn write(root: &Path, rel: &str, content: impl AsRef<[u8]>) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn build(root: &Path) -> (PageManifest, SearchIndex) {
    let site = SiteRoot::resolve(Some(root)).unwrap();
    build_site_index(&site, &BuildOptions::default()).unwrap();
    (
        PageManifest::load(&site.pages_manifest()).unwrap(),
        SearchIndex::load(&site.search_index()).unwrap(),
    )
}

#[test]
fn hello_world_scenario() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "a.md", "# Hello");
    write(tmp.path(), "sub/b.md", "World");

    let (manifest, index) = build(tmp.path());
    assert_eq!(manifest.pages, vec!["a.md", "sub/b.md"]);

    let raw = std::fs::read_to_string(tmp.path().join("pages.json")).unwrap();
    assert_eq!(raw, "{\n  \"pages\": [\n    \"a.md\",\n    \"sub/b.md\"\n  ]\n}");

    let hello = index.search("Hello");
    assert_eq!(hello[0].url, "a.html");
    assert!(hello.iter().all(|h| h.url != "sub/b.html"));

    let world = index.search("World");
    assert_eq!(world.len(), 1);
    assert_eq!(world[0].url, "sub/b.html");
}

#[test]
fn page_count_matches_markdown_files_at_any_depth() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "index.md", "home");
    write(tmp.path(), "one/two.md", "two");
    write(tmp.path(), "one/two/three.md", "three");
    write(tmp.path(), "one/two/three/four/five.md", "five");
    write(tmp.path(), "one/notes.txt", "not a page");
    write(tmp.path(), "assets/logo.svg", "<svg/>");

    let (manifest, index) = build(tmp.path());
    assert_eq!(manifest.len(), 4);
    assert_eq!(index.len(), 4);
}

#[test]
fn index_urls_match_manifest_paths() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "a.md", "alpha");
    write(tmp.path(), "guides/setup.md", "install");
    write(tmp.path(), "guides/deep/dive.md", "details");
    write(tmp.path(), "release.notes.md", "changes");

    let (manifest, index) = build(tmp.path());
    let expected: Vec<String> =
        manifest.pages.iter().map(|p| url_for(p)).collect();
    assert_eq!(index.refs(), expected.as_slice());
    assert!(index.refs().iter().all(|u| u.ends_with(".html")));
}

#[test]
fn rebuild_is_byte_identical() {
    let tmp = tempfile::tempdir().unwrap();
    for i in 0..20 {
        write(
            tmp.path(),
            &format!("section{}/page{i}.md", i % 4),
            format!("# Page {i}\n\nShared text and unique word{i}."),
        );
    }

    build(tmp.path());
    let pages_first = std::fs::read(tmp.path().join("pages.json")).unwrap();
    let index_first =
        std::fs::read(tmp.path().join("search_index.json")).unwrap();

    build(tmp.path());
    let pages_second = std::fs::read(tmp.path().join("pages.json")).unwrap();
    let index_second =
        std::fs::read(tmp.path().join("search_index.json")).unwrap();

    assert_eq!(pages_first, pages_second);
    assert_eq!(index_first, index_second);
}

#[test]
fn malformed_document_is_listed_but_not_searchable() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "good.md", "shared term");
    write(tmp.path(), "bad.md", b"shared term \xff\xfe broken".as_slice());

    let (manifest, index) = build(tmp.path());
    assert!(manifest.pages.contains(&"bad.md".to_string()));
    assert!(!index.refs().contains(&"bad.html".to_string()));

    let hits = index.search("shared");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].url, "good.html");
}

#[test]
fn empty_root_yields_empty_artifacts() {
    let tmp = tempfile::tempdir().unwrap();

    let (manifest, index) = build(tmp.path());
    assert!(manifest.is_empty());
    assert!(index.is_empty());
    assert!(index.search("anything").is_empty());

    let raw = std::fs::read_to_string(tmp.path().join("pages.json")).unwrap();
    assert_eq!(raw, "{\n  \"pages\": []\n}");

    let value: serde_json::Value = serde_json::from_slice(
        &std::fs::read(tmp.path().join("search_index.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(value["fieldVectors"], serde_json::json!([]));
    assert_eq!(value["invertedIndex"], serde_json::json!([]));
}

#[test]
fn previous_outputs_are_overwritten() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "old.md", "old");
    build(tmp.path());

    std::fs::remove_file(tmp.path().join("old.md")).unwrap();
    write(tmp.path(), "new.md", "new");

    let (manifest, index) = build(tmp.path());
    assert_eq!(manifest.pages, vec!["new.md"]);
    assert_eq!(index.refs(), ["new.html"]);
    assert!(index.search("old").is_empty());
}

#[test]
fn title_matches_outrank_body_matches() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "aardvark.md", "An animal that eats ants.");
    write(tmp.path(), "zoo.md", "The zoo keeps one aardvark.");

    let (_, index) = build(tmp.path());
    let hits = index.search("aardvark");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].url, "aardvark.html");
}
