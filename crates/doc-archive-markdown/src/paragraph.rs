const BLOCK_TAGS: &[&str] = &["h1", "h2", "h3", "ul", "ol", "pre", "blockquote"];

/// Wrap loose content in paragraphs.
///
/// The input is split on `<br>`. Fragments that are complete block elements
/// pass through untouched; runs of other fragments become one paragraph whose
/// lines are joined with `<br>`. An empty fragment (a blank source line) ends
/// the current paragraph.
pub(crate) fn wrap_paragraphs(html: &str) -> String {
    let mut output = String::with_capacity(html.len() + 16);
    let mut paragraph: Vec<&str> = Vec::new();

    for fragment in html.split("<br>") {
        let trimmed = fragment.trim();
        if trimmed.is_empty() {
            flush_paragraph(&mut output, &mut paragraph);
            continue;
        }

        if is_block_element(trimmed) {
            flush_paragraph(&mut output, &mut paragraph);
            output.push_str(trimmed);
        } else {
            paragraph.push(trimmed);
        }
    }

    flush_paragraph(&mut output, &mut paragraph);
    output
}

fn flush_paragraph(output: &mut String, paragraph: &mut Vec<&str>) {
    if paragraph.is_empty() {
        return;
    }
    output.push_str("<p>");
    output.push_str(&paragraph.join("<br>"));
    output.push_str("</p>");
    paragraph.clear();
}

fn is_block_element(fragment: &str) -> bool {
    if fragment == "<hr>" {
        return true;
    }

    let Some(rest) = fragment.strip_prefix('<') else {
        return false;
    };

    BLOCK_TAGS.iter().any(|tag| {
        let opens = rest
            .strip_prefix(tag)
            .is_some_and(|after| after.starts_with('>') || after.starts_with(' '));
        opens && fragment.ends_with(&format!("</{tag}>"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_loose_text() {
        assert_eq!(wrap_paragraphs("hello"), "<p>hello</p>");
    }

    #[test]
    fn keeps_block_elements_untouched() {
        assert_eq!(
            wrap_paragraphs("<h1>Title</h1><br>body<br><hr>"),
            "<h1>Title</h1><p>body</p><hr>"
        );
    }

    #[test]
    fn joins_adjacent_lines_and_splits_on_blank_lines() {
        assert_eq!(
            wrap_paragraphs("one<br>two<br><br>three"),
            "<p>one<br>two</p><p>three</p>"
        );
    }

    #[test]
    fn inline_only_fragment_is_not_a_block() {
        assert_eq!(
            wrap_paragraphs("<strong>bold</strong>"),
            "<p><strong>bold</strong></p>"
        );
        assert!(!is_block_element("<h1>open only"));
        assert!(!is_block_element("<hr> trailing"));
    }

    #[test]
    fn recognises_attributes_on_block_tags() {
        assert!(is_block_element(
            "<pre><code class=\"language-rust\">x</code></pre>"
        ));
        assert!(!is_block_element("<header>x</header>"));
    }
}
