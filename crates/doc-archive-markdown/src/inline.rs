use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::compile_pattern;

struct InlinePatterns {
    bold_italic: Regex,
    bold_star: Regex,
    italic_star: Regex,
    bold_underscore: Regex,
    italic_underscore: Regex,
    strikethrough: Regex,
    code: Regex,
    link: Regex,
    image: Regex,
}

fn patterns() -> &'static InlinePatterns {
    static PATTERNS: OnceLock<InlinePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| InlinePatterns {
        bold_italic: compile_pattern(r"\*\*\*(.*)\*\*\*"),
        bold_star: compile_pattern(r"\*\*(.*)\*\*"),
        italic_star: compile_pattern(r"\*(.*)\*"),
        bold_underscore: compile_pattern(r"__(.*)__"),
        italic_underscore: compile_pattern(r"_(.*)_"),
        strikethrough: compile_pattern(r"~~(.*)~~"),
        code: compile_pattern(r"`([^`]+)`"),
        link: compile_pattern(r"(!?)\[([^\]]+)\]\(([^)]+)\)"),
        image: compile_pattern(r"!\[([^\]]*)\]\(([^)]+)\)"),
    })
}

/// Apply emphasis markers: triple, double, then single `*`, followed by
/// double and single `_`. Patterns are greedy within a line.
pub(crate) fn emphasis(html: &str) -> String {
    let patterns = patterns();
    let html = patterns
        .bold_italic
        .replace_all(html, "<strong><em>${1}</em></strong>");
    let html = patterns
        .bold_star
        .replace_all(&html, "<strong>${1}</strong>");
    let html = patterns.italic_star.replace_all(&html, "<em>${1}</em>");
    let html = patterns
        .bold_underscore
        .replace_all(&html, "<strong>${1}</strong>");
    patterns
        .italic_underscore
        .replace_all(&html, "<em>${1}</em>")
        .into_owned()
}

pub(crate) fn strikethrough(html: &str) -> String {
    patterns()
        .strikethrough
        .replace_all(html, "<del>${1}</del>")
        .into_owned()
}

pub(crate) fn inline_code(html: &str) -> String {
    patterns()
        .code
        .replace_all(html, "<code>${1}</code>")
        .into_owned()
}

/// Render `[label](target)` as an anchor that opens in a new browsing context.
///
/// Occurrences directly preceded by `!` are image references and are left for
/// the image pass.
pub(crate) fn links(html: &str) -> String {
    patterns()
        .link
        .replace_all(html, |caps: &Captures<'_>| {
            if !caps[1].is_empty() {
                return caps[0].to_string();
            }
            format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                safe_link_target(&caps[3]),
                &caps[2]
            )
        })
        .into_owned()
}

pub(crate) fn images(html: &str) -> String {
    patterns()
        .image
        .replace_all(html, |caps: &Captures<'_>| {
            format!(
                "<img src=\"{}\" alt=\"{}\" style=\"max-width:100%;\">",
                safe_image_source(&caps[2]),
                &caps[1]
            )
        })
        .into_owned()
}

fn safe_link_target(target: &str) -> &str {
    if has_scheme(target, &["javascript:", "vbscript:", "data:"]) {
        "#"
    } else {
        target
    }
}

fn safe_image_source(source: &str) -> &str {
    if has_scheme(source, &["javascript:", "vbscript:"]) {
        ""
    } else {
        source
    }
}

fn has_scheme(target: &str, schemes: &[&str]) -> bool {
    let compact: String = target
        .chars()
        .filter(|ch| !ch.is_whitespace() && !ch.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    schemes.iter().any(|scheme| compact.starts_with(scheme))
}
