use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    render::{RenderError, Renderer},
    walker::DiscoveredFile,
};

/// A converted document, ready for indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub url: String,
    pub title: String,
    /// Rendered HTML.
    pub body: String,
    /// Plain text of the body, the part that gets indexed.
    pub text: String,
}

/// Why a single document was left out of the index.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("cannot read: {0}")]
    Read(#[from] std::io::Error),

    #[error("not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    #[error("cannot render: {0}")]
    Render(#[from] RenderError),
}

/// A document that was discovered but could not be converted.
#[derive(Debug)]
pub struct SkippedDocument {
    /// Manifest path of the document.
    pub path: String,
    pub error: ConvertError,
}

/// Output of the conversion stage.
#[derive(Debug, Default)]
pub struct Conversion {
    /// Converted documents, in the same order as the input files.
    pub records: Vec<DocumentRecord>,
    pub skipped: Vec<SkippedDocument>,
}

/// Read, decode and render one document.
pub fn convert_document(
    file: &DiscoveredFile,
    renderer: &dyn Renderer,
) -> Result<DocumentRecord, ConvertError> {
    let bytes = std::fs::read(&file.absolute_path)?;
    let source = String::from_utf8(bytes)?;
    let rendered = renderer.render(&source)?;
    let page = file.page();

    Ok(DocumentRecord {
        url: page.url,
        title: page.title,
        body: rendered.html,
        text: rendered.text,
    })
}

/// Convert a batch of discovered files.
///
/// Files are read and rendered in parallel. Failures are logged and
/// collected into [`Conversion::skipped`]; they never abort the batch.
pub fn convert_documents(
    files: &[DiscoveredFile],
    renderer: &dyn Renderer,
) -> Conversion {
    // Indexed collect keeps input order, which the index tie-break relies on.
    let outcomes: Vec<_> = files
        .par_iter()
        .map(|file| (file, convert_document(file, renderer)))
        .collect();

    let mut conversion = Conversion::default();
    for (file, outcome) in outcomes {
        match outcome {
            Ok(record) => conversion.records.push(record),
            Err(error) => {
                let path = file.page().path;
                warn!(%path, %error, "skipping document");
                conversion.skipped.push(SkippedDocument { path, error });
            }
        }
    }

    debug!(
        converted = conversion.records.len(),
        skipped = conversion.skipped.len(),
        "conversion finished"
    );
    conversion
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{
        render::{MarkdownRenderer, Rendered},
        walker::{WalkOptions, discover_documents},
    };

    struct FailingRenderer;

    impl Renderer for FailingRenderer {
        fn render(&self, source: &str) -> Result<Rendered, RenderError> {
            if source.contains("explode") {
                Err(RenderError("unsupported construct".into()))
            } else {
                MarkdownRenderer.render(source)
            }
        }
    }

    fn discover(root: &Path) -> Vec<DiscoveredFile> {
        discover_documents(root, &WalkOptions::default()).unwrap()
    }

    #[test]
    fn record_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let sub = tmp.path().join("guides");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("setup.md"), "# Setup\n\nInstall it.").unwrap();

        let files = discover(tmp.path());
        let record = convert_document(&files[0], &MarkdownRenderer).unwrap();

        assert_eq!(record.url, "guides/setup.html");
        assert_eq!(record.title, "setup");
        assert_eq!(record.body, "<h1>Setup</h1>\n<p>Install it.</p>\n");
        let words: Vec<_> = record.text.split_whitespace().collect();
        assert_eq!(words, vec!["Setup", "Install", "it."]);
    }

    #[test]
    fn title_is_file_stem_not_heading() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("notes.md"), "# Something Else").unwrap();

        let files = discover(tmp.path());
        let record = convert_document(&files[0], &MarkdownRenderer).unwrap();
        assert_eq!(record.title, "notes");
    }

    #[test]
    fn invalid_utf8_is_decode_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("bad.md"), [0xff, 0xfe, 0x00, 0x80])
            .unwrap();

        let files = discover(tmp.path());
        let err = convert_document(&files[0], &MarkdownRenderer).unwrap_err();
        assert!(matches!(err, ConvertError::Decode(_)));
    }

    #[test]
    fn vanished_file_is_read_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("gone.md"), "soon gone").unwrap();

        let files = discover(tmp.path());
        std::fs::remove_file(tmp.path().join("gone.md")).unwrap();

        let err = convert_document(&files[0], &MarkdownRenderer).unwrap_err();
        assert!(matches!(err, ConvertError::Read(_)));
    }

    #[test]
    fn failures_are_skipped_and_order_is_kept() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.md"), "alpha").unwrap();
        std::fs::write(tmp.path().join("b.md"), [0xc3, 0x28]).unwrap();
        std::fs::write(tmp.path().join("c.md"), "please explode").unwrap();
        std::fs::write(tmp.path().join("d.md"), "delta").unwrap();

        let files = discover(tmp.path());
        let conversion = convert_documents(&files, &FailingRenderer);

        let urls: Vec<_> =
            conversion.records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["a.html", "d.html"]);

        let skipped: Vec<_> =
            conversion.skipped.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(skipped, vec!["b.md", "c.md"]);
        assert!(matches!(conversion.skipped[0].error, ConvertError::Decode(_)));
        assert!(matches!(conversion.skipped[1].error, ConvertError::Render(_)));
    }

    #[test]
    fn order_is_preserved_for_many_documents() {
        let tmp = tempfile::tempdir().unwrap();
        for i in 0..64 {
            std::fs::write(tmp.path().join(format!("doc{i:02}.md")), "text")
                .unwrap();
        }

        let files = discover(tmp.path());
        let conversion = convert_documents(&files, &MarkdownRenderer);

        let expected: Vec<_> = files.iter().map(|f| f.page().url).collect();
        let actual: Vec<_> =
            conversion.records.iter().map(|r| r.url.clone()).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn empty_input() {
        let conversion = convert_documents(&[], &MarkdownRenderer);
        assert!(conversion.records.is_empty());
        assert!(conversion.skipped.is_empty());
    }
}
