use std::sync::OnceLock;

use regex::Regex;

use crate::compile_pattern;

/// Kind of list container a run of item lines belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// Classification of a single line as seen by the list pass.
#[derive(Debug, PartialEq, Eq)]
enum ListLine<'a> {
    Item { kind: ListKind, text: &'a str },
    Other(&'a str),
}

struct ListPatterns {
    unordered: Regex,
    ordered: Regex,
}

fn patterns() -> &'static ListPatterns {
    static PATTERNS: OnceLock<ListPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| ListPatterns {
        unordered: compile_pattern(r"^[*-] (.*)"),
        ordered: compile_pattern(r"^\d+\. (.*)"),
    })
}

fn classify(line: &str) -> ListLine<'_> {
    let patterns = patterns();
    if let Some(caps) = patterns.unordered.captures(line) {
        if let Some(text) = caps.get(1) {
            return ListLine::Item {
                kind: ListKind::Unordered,
                text: text.as_str(),
            };
        }
    }
    if let Some(caps) = patterns.ordered.captures(line) {
        if let Some(text) = caps.get(1) {
            return ListLine::Item {
                kind: ListKind::Ordered,
                text: text.as_str(),
            };
        }
    }
    ListLine::Other(line)
}

/// Three-state machine grouping item lines into list containers.
///
/// `current` is `None` outside a list, otherwise it holds an unordered or an
/// ordered list under construction. A finished container is emitted as a
/// single line so later passes see it as one block element.
#[derive(Default)]
struct ListState {
    output: Vec<String>,
    current: Option<ListBuilder>,
}

struct ListBuilder {
    kind: ListKind,
    items: Vec<String>,
}

impl ListState {
    fn push(&mut self, line: ListLine<'_>) {
        match line {
            ListLine::Item { kind, text } => {
                if self.current_kind() != Some(kind) {
                    self.close();
                    self.current = Some(ListBuilder {
                        kind,
                        items: Vec::new(),
                    });
                }
                if let Some(current) = &mut self.current {
                    current.items.push(text.to_string());
                }
            }
            ListLine::Other(text) => {
                self.close();
                self.output.push(text.to_string());
            }
        }
    }

    fn current_kind(&self) -> Option<ListKind> {
        self.current.as_ref().map(|list| list.kind)
    }

    fn close(&mut self) {
        if let Some(list) = self.current.take() {
            self.output.push(list.render());
        }
    }

    fn finalize(mut self) -> Vec<String> {
        self.close();
        self.output
    }
}

impl ListBuilder {
    fn render(&self) -> String {
        let tag = self.kind.tag();
        let mut rendered = format!("<{tag}>");
        for item in &self.items {
            rendered.push_str("<li>");
            rendered.push_str(item);
            rendered.push_str("</li>");
        }
        rendered.push_str(&format!("</{tag}>"));
        rendered
    }
}

/// Group contiguous list-item lines into `<ul>`/`<ol>` containers.
pub(crate) fn group_lists(html: &str) -> String {
    let mut state = ListState::default();
    for line in html.split('\n') {
        state.push(classify(line));
    }
    state.finalize().join("\n")
}
