//! Boundary classification of fetched results.

use serde_json::Value;

use crate::error::{ResultError, ResultResult};
use crate::model::{ConversationResult, FetchedResult};

/// Classify the raw output of the conversation fetch.
///
/// A JSON string is the fetcher's failure message. A JSON object is decoded
/// into a structured result. Anything else is rejected.
///
/// # Errors
///
/// Returns a [`ResultError`] when the value is not a string or an object, or
/// when the object does not decode into a [`ConversationResult`].
pub fn classify(value: Value) -> ResultResult<FetchedResult> {
    match value {
        Value::String(message) => Ok(FetchedResult::Failure(message)),
        Value::Object(object) => {
            ConversationResult::from_object(object).map(|result| FetchedResult::Structured(Box::new(result)))
        }
        other => Err(ResultError::UnsupportedShape {
            kind: json_kind(&other),
        }),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings_are_failures() -> ResultResult<()> {
        assert_eq!(
            classify(json!("not_in_channel"))?,
            FetchedResult::Failure("not_in_channel".into())
        );
        Ok(())
    }

    #[test]
    fn objects_are_structured() -> ResultResult<()> {
        let classified = classify(json!({"message_and_thread": {}, "file_name": "msg1.json"}))?;
        assert!(
            matches!(classified, FetchedResult::Structured(ref result) if result.file_name.as_str() == "msg1.json")
        );
        Ok(())
    }

    #[test]
    fn other_kinds_and_incomplete_objects_are_rejected() {
        assert!(matches!(
            classify(json!([1, 2])),
            Err(ResultError::UnsupportedShape { kind: "array" })
        ));
        assert!(matches!(
            classify(json!(null)),
            Err(ResultError::UnsupportedShape { kind: "null" })
        ));
        assert!(matches!(
            classify(json!({"message_and_thread": {}})),
            Err(ResultError::MissingFileName)
        ));
        assert!(matches!(
            classify(json!({"file_name": ""})),
            Err(ResultError::MissingFileName)
        ));
        assert!(matches!(
            classify(json!({"file_name": 7})),
            Err(ResultError::InvalidField { field: "file_name", .. })
        ));
    }

    #[test]
    fn both_attachment_shapes_conflict() {
        let value = json!({
            "file_name": "msg1.json",
            "attachment_refs": {"img.png": "https://x/img"},
            "attachment_data": {"img.png": {"base64": "iVBORw=="}}
        });
        assert!(matches!(
            classify(value),
            Err(ResultError::ConflictingAttachments)
        ));
    }

    #[test]
    fn malformed_reserved_fields_report_the_field() {
        let value = json!({"file_name": "msg1.json", "attachment_refs": ["https://x/img"]});
        assert!(matches!(
            classify(value),
            Err(ResultError::Decode {
                field: "attachment_refs",
                ..
            })
        ));
    }
}
