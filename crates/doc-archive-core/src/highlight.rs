use doc_archive_markdown::escape_markup;
use regex::RegexBuilder;

const PATTERN_SIZE_LIMIT: usize = 1 << 20;
const ENTITY: &str = r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);";

/// Wrap every case-insensitive occurrence of `term` in `text` with a
/// highlight span, keeping the matched text's casing.
///
/// `text` is display-safe markup. The term is escaped the same way before it
/// is matched, and character entities already present in `text` are never
/// split by a match.
pub fn highlight(text: &str, term: &str) -> String {
    if term.is_empty() {
        return text.to_string();
    }

    let escaped_term = regex::escape(&escape_markup(term));
    let pattern = format!("({escaped_term})|({ENTITY})");
    let matcher = match RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .unicode(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
    {
        Ok(matcher) => matcher,
        Err(err) => {
            tracing::warn!(error = %err, "search term too large to highlight");
            return text.to_string();
        }
    };

    let mut output = String::with_capacity(text.len() + 32);
    let mut last = 0;
    for captures in matcher.captures_iter(text) {
        let Some(hit) = captures.get(1) else {
            continue;
        };
        output.push_str(&text[last..hit.start()]);
        output.push_str("<span class=\"highlight\">");
        output.push_str(hit.as_str());
        output.push_str("</span>");
        last = hit.end();
    }
    output.push_str(&text[last..]);
    output
}
