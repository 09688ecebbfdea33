//! Batch-update request body for the remote documents service

use serde::Serialize;
use std::ops::Range;

use crate::editing::{EditOp, NamedStyle, TextStyle};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchUpdateRequest {
    pub requests: Vec<Request>,
}

impl BatchUpdateRequest {
    /// Encode operations one-to-one, keeping their order
    pub fn from_operations(ops: &[EditOp]) -> Self {
        Self {
            requests: ops.iter().map(Request::from).collect(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    InsertText(InsertText),
    UpdateParagraphStyle(UpdateParagraphStyle),
    UpdateTextStyle(UpdateTextStyle),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertText {
    pub location: Location,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRange {
    pub start_index: usize,
    pub end_index: usize,
}

impl From<&Range<usize>> for WireRange {
    fn from(range: &Range<usize>) -> Self {
        Self {
            start_index: range.start,
            end_index: range.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParagraphStyle {
    pub range: WireRange,
    pub paragraph_style: ParagraphStyle,
    pub fields: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
    pub named_style_type: NamedStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTextStyle {
    pub range: WireRange,
    pub text_style: TextStyle,
    pub fields: String,
}

impl From<&EditOp> for Request {
    fn from(op: &EditOp) -> Self {
        match op {
            EditOp::InsertText { at, text } => Request::InsertText(InsertText {
                location: Location { index: *at },
                text: text.clone(),
            }),
            EditOp::SetParagraphStyle { range, style } => {
                Request::UpdateParagraphStyle(UpdateParagraphStyle {
                    range: range.into(),
                    paragraph_style: ParagraphStyle {
                        named_style_type: *style,
                    },
                    fields: "namedStyleType".to_string(),
                })
            }
            EditOp::SetTextStyle { range, style } => Request::UpdateTextStyle(UpdateTextStyle {
                range: range.into(),
                text_style: style.clone(),
                fields: style.fields_mask(),
            }),
        }
    }
}
