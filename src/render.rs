use pulldown_cmark::{Event, Options, Parser, TagEnd, html};

/// Error produced when a document cannot be rendered.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct RenderError(pub String);

/// A rendered document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    /// Publishable markup.
    pub html: String,
    /// The words a reader sees, for indexing. Raw HTML contributes nothing.
    pub text: String,
}

/// Turns document source text into publishable markup and its plain text.
pub trait Renderer: Sync {
    fn render(&self, source: &str) -> Result<Rendered, RenderError>;
}

/// CommonMark renderer with the common GitHub-style extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    fn options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_FOOTNOTES
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, source: &str) -> Result<Rendered, RenderError> {
        let events: Vec<Event<'_>> =
            Parser::new_ext(source, Self::options()).collect();

        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, events.iter().cloned());

        Ok(Rendered {
            html: out,
            text: plain_text(&events),
        })
    }
}

/// Concatenate text and inline code, with a space at every block boundary
/// and line break. Raw HTML blocks and inline tags are dropped.
fn plain_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak | Event::Rule => text.push(' '),
            Event::End(end) if is_block(end) => text.push(' '),
            _ => {}
        }
    }
    text
}

fn is_block(end: &TagEnd) -> bool {
    matches!(
        end,
        TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::CodeBlock
            | TagEnd::List(_)
            | TagEnd::Item
            | TagEnd::FootnoteDefinition
            | TagEnd::TableHead
            | TagEnd::TableRow
            | TagEnd::TableCell
    )
}
