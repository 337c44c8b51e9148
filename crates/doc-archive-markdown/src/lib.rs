//! Markdown-to-markup conversion for document summaries.
//!
//! [`convert`] runs a fixed sequence of pattern passes over the source text.
//! Every pass consumes the output of the previous one, so the order is part of
//! the contract: escaping, headings, emphasis, strikethrough, code, lists,
//! links, images, blockquotes, horizontal rules, line breaks and finally
//! paragraph wrapping.
//!
//! Emphasis and strikethrough use greedy single-line patterns. Several spans
//! on one line can therefore nest incorrectly, and list items never span more
//! than one source line.

mod block;
mod escape;
mod heading;
mod inline;
mod list;
mod paragraph;

pub use escape::escape_markup;
pub use heading::{find_title, normalize_heading_text};

use block::FenceStash;
use regex::Regex;

/// Convert Markdown source into display markup.
///
/// Never fails. Empty input yields empty output.
pub fn convert(source: &str) -> String {
    if source.is_empty() {
        return String::new();
    }

    let normalized = source.replace("\r\n", "\n");
    let mut html = escape_markup(&normalized);

    html = block::headings(&html);
    html = inline::emphasis(&html);
    html = inline::strikethrough(&html);

    let mut fences = FenceStash::default();
    html = fences.stash(&html);
    html = inline::inline_code(&html);

    html = list::group_lists(&html);
    html = inline::links(&html);
    html = inline::images(&html);
    html = block::blockquotes(&html);
    html = block::horizontal_rules(&html);

    html = html.replace('\n', "<br>");
    html = fences.restore(&html);

    paragraph::wrap_paragraphs(&html)
}

/// Convert optional Markdown source, treating `None` like empty input.
pub fn convert_opt(source: Option<&str>) -> String {
    source.map(convert).unwrap_or_default()
}

/// Compile one of the converter's built-in patterns.
pub(crate) fn compile_pattern(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in markdown pattern must compile")
}
