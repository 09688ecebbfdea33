//! Webhook payload schema.
//!
//! Payloads are one internally tagged JSON object, discriminated by `kind`:
//!
//! ```json
//! {"kind": "record", "topic": "Sales", "fields": {"Name:": "Ada", "Note": "..."}}
//! {"kind": "batch", "topic": "Sales", "records": [{"Name": "Ada"}, {"Name": "Bob"}]}
//! ```
//!
//! Field order is preserved. Field values must be strings or `null`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::blocks::ContentBlock;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("payload must be a JSON object with a \"kind\" field, got {found}")]
    UnexpectedShape { found: &'static str },

    #[error("payload does not match the schema: {0}")]
    Schema(#[source] serde_json::Error),

    #[error("payload topic is empty")]
    EmptyTopic,

    #[error("field {field:?} must be a string or null, got {found}")]
    NonStringValue { field: String, found: &'static str },
}

/// Validated webhook payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum Payload {
    /// A single record rendered as consecutive blocks
    Record {
        topic: String,
        fields: Map<String, Value>,
    },
    /// Several records appended one after another
    Batch {
        topic: String,
        records: Vec<Map<String, Value>>,
    },
}

impl Payload {
    /// Parse and validate a payload from raw JSON text
    pub fn from_json(input: &str) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_str(input).map_err(PayloadError::Syntax)?;
        Self::from_value(value)
    }

    /// Validate an already-parsed JSON value
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        if !value.is_object() {
            return Err(PayloadError::UnexpectedShape {
                found: json_type(&value),
            });
        }
        let payload: Payload = serde_json::from_value(value).map_err(PayloadError::Schema)?;
        if payload.topic().is_empty() {
            return Err(PayloadError::EmptyTopic);
        }
        Ok(payload)
    }

    /// Topic with surrounding whitespace removed
    pub fn topic(&self) -> &str {
        match self {
            Payload::Record { topic, .. } | Payload::Batch { topic, .. } => topic.trim(),
        }
    }

    /// Convert into ordered content blocks.
    ///
    /// `null` values become empty blocks, which the builder skips.
    pub fn blocks(&self) -> Result<Vec<ContentBlock>, PayloadError> {
        match self {
            Payload::Record { fields, .. } => record_blocks(fields),
            Payload::Batch { records, .. } => {
                let mut blocks = Vec::new();
                for record in records {
                    blocks.extend(record_blocks(record)?);
                }
                Ok(blocks)
            }
        }
    }
}

fn record_blocks(fields: &Map<String, Value>) -> Result<Vec<ContentBlock>, PayloadError> {
    fields
        .iter()
        .map(|(label, value)| match value {
            Value::String(text) => Ok(ContentBlock::new(label.as_str(), text.as_str())),
            Value::Null => Ok(ContentBlock::new(label.as_str(), "")),
            other => Err(PayloadError::NonStringValue {
                field: label.clone(),
                found: json_type(other),
            }),
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Acknowledgement for an accepted payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub status: &'static str,
    pub topic: String,
    pub operations: usize,
    pub received: Value,
}

impl Receipt {
    pub fn success(topic: impl Into<String>, operations: usize, received: Value) -> Self {
        Self {
            status: "success",
            topic: topic.into(),
            operations,
            received,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn record_preserves_field_order() {
        let payload = Payload::from_json(
            r#"{"kind": "record", "topic": "Sales", "fields": {"Zed": "1", "Alpha": "2", "Mid": "3"}}"#,
        )
        .unwrap();
        let labels: Vec<_> = payload
            .blocks()
            .unwrap()
            .into_iter()
            .map(|block| block.label)
            .collect();
        assert_eq!(labels, vec!["Zed", "Alpha", "Mid"]);
        assert_eq!(payload.topic(), "Sales");
    }

    #[test]
    fn batch_concatenates_records() {
        let payload = Payload::from_value(json!({
            "kind": "batch",
            "topic": " Leads ",
            "records": [{"Name": "Ada"}, {"Name": "Bob", "Note": null}]
        }))
        .unwrap();
        assert_eq!(payload.topic(), "Leads");
        assert_eq!(
            payload.blocks().unwrap(),
            vec![
                ContentBlock::new("Name", "Ada"),
                ContentBlock::new("Name", "Bob"),
                ContentBlock::new("Note", ""),
            ]
        );
    }

    #[rstest]
    #[case(json!([{"Name": "Ada"}]), "array")]
    #[case(json!("{\"kind\": \"record\"}"), "string")]
    #[case(json!(42), "number")]
    fn non_object_shapes_are_rejected(#[case] value: Value, #[case] found: &str) {
        match Payload::from_value(value) {
            Err(PayloadError::UnexpectedShape { found: got }) => assert_eq!(got, found),
            other => panic!("expected UnexpectedShape, got {other:?}"),
        }
    }

    #[rstest]
    #[case(json!({"topic": "T", "fields": {}}))]
    #[case(json!({"kind": "rows", "topic": "T", "fields": {}}))]
    #[case(json!({"kind": "record", "topic": "T", "fields": {}, "extra": 1}))]
    #[case(json!({"kind": "record", "fields": {}}))]
    #[case(json!({"kind": "batch", "topic": "T", "records": {}}))]
    fn schema_violations_are_rejected(#[case] value: Value) {
        assert!(matches!(
            Payload::from_value(value),
            Err(PayloadError::Schema(_))
        ));
    }

    #[test]
    fn blank_topic_is_rejected() {
        let result = Payload::from_value(json!({"kind": "record", "topic": "  ", "fields": {}}));
        assert!(matches!(result, Err(PayloadError::EmptyTopic)));
    }

    #[test]
    fn non_string_value_names_the_field() {
        let payload = Payload::from_value(json!({
            "kind": "record",
            "topic": "T",
            "fields": {"Name": "Ada", "Age": 36}
        }))
        .unwrap();
        let err = payload.blocks().unwrap_err();
        assert_eq!(
            err.to_string(),
            "field \"Age\" must be a string or null, got number"
        );
    }

    #[test]
    fn invalid_json_is_a_syntax_error() {
        assert!(matches!(
            Payload::from_json("{not json"),
            Err(PayloadError::Syntax(_))
        ));
    }

    #[test]
    fn receipt_echoes_the_payload() {
        let received = json!({"kind": "record", "topic": "T", "fields": {}});
        let receipt = Receipt::success("T", 0, received.clone());
        assert_eq!(
            serde_json::to_value(&receipt).unwrap(),
            json!({"status": "success", "topic": "T", "operations": 0, "received": received})
        );
    }
}
