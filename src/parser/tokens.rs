/// A classified line of bulk-import markup.
///
/// The tokenizer never fails: anything that does not match a header or
/// image pattern degrades to a content line, and blank or separator lines
/// are dropped entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineToken {
    /// `## [<order>] <title>` — starts a topic.
    MainHeader { order: i32, title: String },
    /// `### [<order>] <title>` — starts a sub-topic.
    SubHeader { order: i32, title: String },
    /// `![Image](<url>)` — attaches an image to the open context.
    ImageRef { url: String },
    /// Free text attached to whichever header context is open.
    Content(String),
}

/// Classify a markup blob into a token per meaningful line.
pub fn tokenize(text: &str) -> Vec<LineToken> {
    text.lines().filter_map(classify).collect()
}

fn classify(line: &str) -> Option<LineToken> {
    let trimmed = line.trim();
    if trimmed.is_empty() || is_separator(trimmed) {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("### ") {
        if let Some((order, title)) = parse_ordered_title(rest) {
            return Some(LineToken::SubHeader { order, title });
        }
    } else if let Some(rest) = trimmed.strip_prefix("## ") {
        if let Some((order, title)) = parse_ordered_title(rest) {
            return Some(LineToken::MainHeader { order, title });
        }
    }

    if let Some(url) = parse_image_ref(trimmed) {
        return Some(LineToken::ImageRef { url });
    }

    Some(LineToken::Content(trimmed.to_string()))
}

/// Parse `[<order>] <title>` from the remainder of a header line.
///
/// A missing bracket pair or a non-integer order invalidates the header,
/// letting the line fall through as content.
fn parse_ordered_title(rest: &str) -> Option<(i32, String)> {
    let after_open = rest.strip_prefix('[')?;
    let close = after_open.find(']')?;
    let order = after_open[..close].trim().parse::<i32>().ok()?;
    let title = after_open[close + 1..].trim().to_string();
    Some((order, title))
}

/// Parse `![Image](<url>)`; the url is everything between the parens.
pub(crate) fn parse_image_ref(line: &str) -> Option<String> {
    let inner = line.strip_prefix("![Image](")?.strip_suffix(')')?;
    Some(inner.to_string())
}

/// Horizontal-rule separators: a line of three or more `-`, `*` or `_`.
fn is_separator(line: &str) -> bool {
    line.len() >= 3
        && (line.chars().all(|c| c == '-')
            || line.chars().all(|c| c == '*')
            || line.chars().all(|c| c == '_'))
}
