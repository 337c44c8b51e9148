use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::compile_pattern;

struct BlockPatterns {
    h3: Regex,
    h2: Regex,
    h1: Regex,
    fence: Regex,
    placeholder: Regex,
    blockquote: Regex,
    rule: Regex,
}

fn patterns() -> &'static BlockPatterns {
    static PATTERNS: OnceLock<BlockPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| BlockPatterns {
        h3: compile_pattern(r"(?m)^### (.*)$"),
        h2: compile_pattern(r"(?m)^## (.*)$"),
        h1: compile_pattern(r"(?m)^# (.*)$"),
        fence: compile_pattern(r"(?s)```(.*?)```"),
        placeholder: compile_pattern(r"\x00(\d+)\x00"),
        // `>` has already been escaped when this pass runs.
        blockquote: compile_pattern(r"(?m)^&gt; (.*)$"),
        rule: compile_pattern(r"(?m)^---$"),
    })
}

/// Turn `#`, `##` and `###` lines into heading blocks, longest marker first.
pub(crate) fn headings(html: &str) -> String {
    let patterns = patterns();
    let html = patterns.h3.replace_all(html, "<h3>${1}</h3>");
    let html = patterns.h2.replace_all(&html, "<h2>${1}</h2>");
    patterns.h1.replace_all(&html, "<h1>${1}</h1>").into_owned()
}

pub(crate) fn blockquotes(html: &str) -> String {
    patterns()
        .blockquote
        .replace_all(html, "<blockquote>${1}</blockquote>")
        .into_owned()
}

pub(crate) fn horizontal_rules(html: &str) -> String {
    patterns().rule.replace_all(html, "<hr>").into_owned()
}

/// Rendered fenced code blocks, held aside while the remaining passes run.
///
/// Each block is replaced by a NUL-delimited index. Escaping strips NUL from
/// the source, so placeholders cannot collide with document text.
#[derive(Debug, Default)]
pub(crate) struct FenceStash {
    blocks: Vec<String>,
}

impl FenceStash {
    pub(crate) fn stash(&mut self, html: &str) -> String {
        patterns()
            .fence
            .replace_all(html, |caps: &Captures<'_>| {
                let index = self.blocks.len();
                self.blocks.push(render_fence(&caps[1]));
                format!("\0{index}\0")
            })
            .into_owned()
    }

    pub(crate) fn restore(&self, html: &str) -> String {
        if self.blocks.is_empty() {
            return html.to_string();
        }

        patterns()
            .placeholder
            .replace_all(html, |caps: &Captures<'_>| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.blocks.get(index))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.blocks.len()
    }
}

fn render_fence(raw: &str) -> String {
    let (language, body) = match split_info_string(raw) {
        Some((language, rest)) => (Some(language), rest),
        None => (None, raw.strip_prefix('\n').unwrap_or(raw)),
    };
    let body = body.strip_suffix('\n').unwrap_or(body);

    match language {
        Some(language) => {
            format!("<pre><code class=\"language-{language}\">{body}</code></pre>")
        }
        None => format!("<pre><code>{body}</code></pre>"),
    }
}

fn split_info_string(raw: &str) -> Option<(&str, &str)> {
    let (first, rest) = raw.split_once('\n')?;
    let info = first.trim();
    if info.is_empty() {
        return None;
    }

    let is_language = info
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '+' | '.'));
    is_language.then_some((info, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_prefer_longest_marker() {
        assert_eq!(
            headings("### Three\n## Two\n# One"),
            "<h3>Three</h3>\n<h2>Two</h2>\n<h1>One</h1>"
        );
    }

    #[test]
    fn heading_requires_space_after_marker() {
        assert_eq!(headings("#tag\n####deep"), "#tag\n####deep");
    }

    #[test]
    fn stashes_and_restores_fenced_blocks() {
        let mut stash = FenceStash::default();
        let html = stash.stash("before\n```rust\nlet x = 1;\n```\nafter");
        assert_eq!(stash.len(), 1);
        assert_eq!(html, "before\n\u{0}0\u{0}\nafter");
        assert_eq!(
            stash.restore(&html),
            "before\n<pre><code class=\"language-rust\">let x = 1;</code></pre>\nafter"
        );
    }

    #[test]
    fn fence_without_info_string_drops_leading_newline() {
        assert_eq!(render_fence("\nplain\ntext\n"), "<pre><code>plain\ntext</code></pre>");
    }

    #[test]
    fn fence_with_prose_first_line_keeps_it_as_content() {
        assert_eq!(
            render_fence("not a language\nbody"),
            "<pre><code>not a language\nbody</code></pre>"
        );
    }

    #[test]
    fn blockquote_matches_escaped_marker() {
        assert_eq!(blockquotes("&gt; quoted"), "<blockquote>quoted</blockquote>");
        assert_eq!(blockquotes("&gt;tight"), "&gt;tight");
    }

    #[test]
    fn rule_requires_exact_line() {
        assert_eq!(horizontal_rules("---\n----\n--- x"), "<hr>\n----\n--- x");
    }
}
