use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Trailing colons (ASCII and full-width) and whitespace left over from form labels
static TRAILING_LABEL_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s:：]+$").expect("static regex is valid"));

/// One label/value pair, rendered as a heading paragraph followed by a body paragraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub label: String,
    pub value: String,
}

impl ContentBlock {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Heading text: trimmed, with trailing colons removed
    pub fn heading(&self) -> String {
        normalize_label(&self.label)
    }

    /// Body text, or `None` when the block should be skipped
    pub fn body(&self) -> Option<String> {
        normalize_value(&self.value)
    }
}

impl<L: Into<String>, V: Into<String>> From<(L, V)> for ContentBlock {
    fn from((label, value): (L, V)) -> Self {
        Self::new(label, value)
    }
}

pub(crate) fn normalize_label(label: &str) -> String {
    let label = label.replace("\r\n", "\n");
    TRAILING_LABEL_PUNCTUATION
        .replace(label.trim_start(), "")
        .into_owned()
}

pub(crate) fn normalize_value(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    let value = value.replace("\r\n", "\n");
    Some(value.trim_end_matches('\n').to_string())
}
