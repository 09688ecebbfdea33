use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Smallest index that can receive inserted text (index 0 is the document start)
pub const MIN_INSERT_INDEX: usize = 1;

/// A single edit against the remote document.
///
/// Offsets are absolute, in [`IndexUnit`]s, and only meaningful against the
/// document state left by every operation submitted before this one.
/// Ranges are half-open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    InsertText {
        at: usize,
        text: String,
    },
    SetParagraphStyle {
        range: Range<usize>,
        style: NamedStyle,
    },
    SetTextStyle {
        range: Range<usize>,
        style: TextStyle,
    },
}

impl EditOp {
    /// Inserted text, if this is an insertion
    pub fn inserted_text(&self) -> Option<&str> {
        match self {
            EditOp::InsertText { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Target range of a style operation
    pub fn style_range(&self) -> Option<Range<usize>> {
        match self {
            EditOp::InsertText { .. } => None,
            EditOp::SetParagraphStyle { range, .. } | EditOp::SetTextStyle { range, .. } => {
                Some(range.clone())
            }
        }
    }
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOp::InsertText { at, text } => write!(f, "insert_text {at} {text:?}"),
            EditOp::SetParagraphStyle { range, style } => write!(
                f,
                "paragraph_style {}..{} {}",
                range.start,
                range.end,
                style.as_str()
            ),
            EditOp::SetTextStyle { range, style } => write!(
                f,
                "text_style {}..{} {}",
                range.start,
                range.end,
                style.fields_mask()
            ),
        }
    }
}

/// Named paragraph style types understood by the documents service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedStyle {
    #[serde(rename = "NORMAL_TEXT")]
    NormalText,
    #[serde(rename = "TITLE")]
    Title,
    #[serde(rename = "SUBTITLE")]
    Subtitle,
    #[serde(rename = "HEADING_1")]
    Heading1,
    #[serde(rename = "HEADING_2")]
    Heading2,
    #[serde(rename = "HEADING_3")]
    Heading3,
    #[serde(rename = "HEADING_4")]
    Heading4,
    #[serde(rename = "HEADING_5")]
    Heading5,
    #[serde(rename = "HEADING_6")]
    Heading6,
}

impl NamedStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamedStyle::NormalText => "NORMAL_TEXT",
            NamedStyle::Title => "TITLE",
            NamedStyle::Subtitle => "SUBTITLE",
            NamedStyle::Heading1 => "HEADING_1",
            NamedStyle::Heading2 => "HEADING_2",
            NamedStyle::Heading3 => "HEADING_3",
            NamedStyle::Heading4 => "HEADING_4",
            NamedStyle::Heading5 => "HEADING_5",
            NamedStyle::Heading6 => "HEADING_6",
        }
    }
}

/// Character-level style. Only the fields that are set get written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
}

impl TextStyle {
    pub fn bold() -> Self {
        Self {
            bold: Some(true),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bold.is_none() && self.italic.is_none() && self.underline.is_none()
    }

    /// Comma-separated list of the fields this style sets, e.g. `bold,italic`
    pub fn fields_mask(&self) -> String {
        [
            ("bold", self.bold),
            ("italic", self.italic),
            ("underline", self.underline),
        ]
        .iter()
        .filter(|(_, value)| value.is_some())
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(",")
    }
}

/// Unit in which document offsets are counted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexUnit {
    /// Unicode scalar values
    #[default]
    Chars,
    /// UTF-16 code units
    Utf16,
}

impl IndexUnit {
    /// Length of `text` in this unit
    pub fn measure(&self, text: &str) -> usize {
        match self {
            IndexUnit::Chars => text.chars().count(),
            IndexUnit::Utf16 => text.encode_utf16().count(),
        }
    }

    /// Width of a single character in this unit
    pub fn char_width(&self, c: char) -> usize {
        match self {
            IndexUnit::Chars => 1,
            IndexUnit::Utf16 => c.len_utf16(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(IndexUnit::Chars, "Topic", 5)]
    #[case(IndexUnit::Chars, "日本語", 3)]
    #[case(IndexUnit::Chars, "🎉ok", 3)]
    #[case(IndexUnit::Utf16, "日本語", 3)]
    #[case(IndexUnit::Utf16, "🎉ok", 4)]
    fn measure_never_counts_bytes(#[case] unit: IndexUnit, #[case] text: &str, #[case] len: usize) {
        assert_eq!(unit.measure(text), len);
    }

    #[test]
    fn fields_mask_lists_only_set_fields() {
        let style = TextStyle {
            bold: Some(true),
            italic: None,
            underline: Some(false),
        };
        assert_eq!(style.fields_mask(), "bold,underline");
        assert!(TextStyle::default().is_empty());
        assert_eq!(TextStyle::default().fields_mask(), "");
    }

    #[test]
    fn named_style_serializes_as_wire_name() {
        let json = serde_json::to_string(&NamedStyle::Heading2).unwrap();
        assert_eq!(json, "\"HEADING_2\"");
        let parsed: NamedStyle = serde_json::from_str("\"NORMAL_TEXT\"").unwrap();
        assert_eq!(parsed, NamedStyle::NormalText);
    }

    #[test]
    fn edit_op_is_self_describing() {
        let op = EditOp::SetParagraphStyle {
            range: 1..6,
            style: NamedStyle::Heading2,
        };
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "op": "set_paragraph_style",
                "range": {"start": 1, "end": 6},
                "style": "HEADING_2"
            })
        );
    }

    #[test]
    fn display_is_compact() {
        let op = EditOp::InsertText {
            at: 1,
            text: "Topic\n".to_string(),
        };
        assert_eq!(op.to_string(), "insert_text 1 \"Topic\\n\"");
    }
}
