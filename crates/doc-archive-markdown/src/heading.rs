use pulldown_cmark::{Event, Options, Parser};

/// Return the text of the first level-one ATX heading, with inline markup
/// stripped. Headings inside fenced code blocks are ignored.
pub fn find_title(source: &str) -> Option<String> {
    let mut fence: Option<Fence> = None;

    for line in source.lines() {
        if let Some(open) = fence {
            if open.is_closed_by(line) {
                fence = None;
            }
            continue;
        }

        if let Some(opened) = Fence::detect(line) {
            fence = Some(opened);
            continue;
        }

        if let Some(raw) = level_one_heading(line) {
            let normalized = normalize_heading_text(raw);
            if !normalized.is_empty() {
                return Some(normalized);
            }
        }
    }

    None
}

fn level_one_heading(line: &str) -> Option<&str> {
    if leading_indent_width(line) > 3 {
        return None;
    }

    let trimmed = line.trim_start();
    let after_hash = trimmed.strip_prefix('#')?;
    if after_hash.starts_with('#') || !after_hash.starts_with(char::is_whitespace) {
        return None;
    }

    let content = after_hash.trim();
    let stripped = content.trim_end_matches('#');
    if stripped.len() < content.len() && stripped.ends_with(char::is_whitespace) {
        Some(stripped.trim_end())
    } else {
        Some(content)
    }
}

/// Flatten inline Markdown (emphasis, links, code) into plain text with
/// collapsed whitespace.
pub fn normalize_heading_text(input: &str) -> String {
    let mut text_segments = Vec::new();
    let parser = Parser::new_ext(input, Options::empty());

    for event in parser {
        match event {
            Event::Text(cow) | Event::Code(cow) => text_segments.push(cow.to_string()),
            Event::SoftBreak | Event::HardBreak => text_segments.push(" ".to_string()),
            _ => {}
        }
    }

    let normalized = text_segments.join("");
    let mut collapsed = String::new();

    for (idx, segment) in normalized.split_whitespace().enumerate() {
        if idx > 0 {
            collapsed.push(' ');
        }
        collapsed.push_str(segment);
    }

    collapsed
}

#[derive(Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn detect(line: &str) -> Option<Self> {
        if leading_indent_width(line) > 3 {
            return None;
        }

        let rest = line.trim_start();
        let marker = rest.chars().next()?;
        if marker != '`' && marker != '~' {
            return None;
        }

        let len = rest.chars().take_while(|ch| *ch == marker).count();
        (len >= 3).then_some(Fence { marker, len })
    }

    fn is_closed_by(self, line: &str) -> bool {
        if leading_indent_width(line) > 3 {
            return false;
        }

        let trimmed = line.trim();
        !trimmed.is_empty()
            && trimmed.chars().all(|ch| ch == self.marker)
            && trimmed.chars().count() >= self.len
    }
}

fn leading_indent_width(line: &str) -> usize {
    let mut width = 0usize;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => break,
        }
    }
    width
}
