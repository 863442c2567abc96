//! Query text highlighting.
//!
//! Presentation only: each line is split into keyword, operator and plain
//! spans by a regex tokenizer. Nothing here validates or parses the query.

use std::sync::LazyLock;

use regex::Regex;

/// Keywords highlighted case-insensitively on word boundaries.
const KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "AND", "OR", "NOT", "IN", "IS", "NULL", "LIKE", "AS", "ORDER",
    "GROUP", "BY", "HAVING", "LIMIT", "OFFSET", "ASC", "DESC", "DISTINCT", "COUNT", "SUM",
    "LENGTH", "JOIN", "ON", "INSERT", "UPDATE", "DELETE", "START", "STOP", "PAUSE", "UNPAUSE",
    "REMOVE", "RESTART", "KILL", "TRUE", "FALSE",
];

/// HTML entities produced by [`escape_html`], matched as single operators.
const ENTITY_PATTERN: &str = r"&(?:amp|lt|gt|quot|#39);";

const OPERATOR_PATTERN: &str = r"<>|!=|<=|>=|[=<>+\-*/%(),;]";

static TOKEN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    let pattern = format!(
        r"(?P<op>{ENTITY_PATTERN}|{OPERATOR_PATTERN})|(?P<kw>(?i)\b(?:{})\b)",
        KEYWORDS.join("|")
    );
    Regex::new(&pattern).ok()
});

/// Kind of a highlighted span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Keyword,
    Operator,
    Plain,
}

impl SpanKind {
    /// CSS class used by [`highlight_html`]. Plain text has none.
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            SpanKind::Keyword => Some("keyword"),
            SpanKind::Operator => Some("operator"),
            SpanKind::Plain => None,
        }
    }
}

/// A classified slice of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub kind: SpanKind,
    pub text: String,
}

impl HighlightSpan {
    fn new(kind: SpanKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }
}

/// Splits a line into classified spans.
///
/// Spans are in order and their texts concatenate back to `line`.
pub fn classify_line(line: &str) -> Vec<HighlightSpan> {
    let Some(token) = TOKEN.as_ref() else {
        return plain(line);
    };

    let mut spans = Vec::new();
    let mut last = 0;
    for caps in token.captures_iter(line) {
        let (kind, m) = match (caps.name("op"), caps.name("kw")) {
            (Some(m), _) => (SpanKind::Operator, m),
            (None, Some(m)) => (SpanKind::Keyword, m),
            (None, None) => continue,
        };
        if m.start() > last {
            spans.push(HighlightSpan::new(SpanKind::Plain, &line[last..m.start()]));
        }
        spans.push(HighlightSpan::new(kind, m.as_str()));
        last = m.end();
    }
    if last < line.len() {
        spans.push(HighlightSpan::new(SpanKind::Plain, &line[last..]));
    }
    spans
}

fn plain(line: &str) -> Vec<HighlightSpan> {
    if line.is_empty() {
        Vec::new()
    } else {
        vec![HighlightSpan::new(SpanKind::Plain, line)]
    }
}

/// Escapes the characters that could inject markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Renders a line as escaped HTML with `<span class="...">` around
/// keywords and operators.
pub fn highlight_html(line: &str) -> String {
    classify_line(&escape_html(line))
        .into_iter()
        .map(|span| match span.kind.css_class() {
            Some(class) => format!(r#"<span class="{class}">{}</span>"#, span.text),
            None => span.text,
        })
        .collect()
}
