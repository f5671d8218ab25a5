use serde_json::{Map, Value};

/// One classified event from the backend's stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental fragment of generated content.
    Chunk { text: String },
    /// Side-channel payload (collected trip information). Held back by the
    /// reader and surfaced once, after the transport ends.
    InfoResult { text: String },
    /// In-band completion marker.
    Done,
    /// Failure reported by the producer. Terminal for the stream.
    Error { message: String },
}

impl StreamEvent {
    /// `Done` and `Error` end a stream; nothing is emitted after them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error { .. })
    }

    pub fn as_chunk(&self) -> Option<&str> {
        match self {
            Self::Chunk { text } => Some(text.as_str()),
            _ => None,
        }
    }
}

pub(crate) const INFO_FIELD: &str = "info_collection_result";
pub(crate) const CHUNK_FIELD: &str = "chunk";
pub(crate) const DONE_FIELD: &str = "done";
pub(crate) const ERROR_FIELD: &str = "error";

/// Parse one frame payload.
///
/// `Ok(None)` means the payload was valid JSON but carried nothing we know.
pub fn parse_frame(payload: &str) -> Result<Option<StreamEvent>, serde_json::Error> {
    let value: Value = serde_json::from_str(payload)?;
    Ok(classify(&value))
}

/// Classify a decoded JSON value.
///
/// Precedence when several fields are present:
/// `info_collection_result` > `chunk` > `done` (truthy) > `error`.
pub fn classify(value: &Value) -> Option<StreamEvent> {
    let obj = value.as_object()?;

    if let Some(text) = text_field(obj, INFO_FIELD) {
        return Some(StreamEvent::InfoResult { text });
    }
    if let Some(text) = text_field(obj, CHUNK_FIELD) {
        return Some(StreamEvent::Chunk { text });
    }
    if obj.get(DONE_FIELD).is_some_and(is_truthy) {
        return Some(StreamEvent::Done);
    }
    if let Some(message) = text_field(obj, ERROR_FIELD) {
        return Some(StreamEvent::Error { message });
    }
    None
}

/// A field counts as present unless missing or `null`. Non-string values are
/// kept as compact JSON text.
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_each_kind() {
        assert_eq!(
            classify(&json!({"chunk": "Day 1"})),
            Some(StreamEvent::Chunk { text: "Day 1".into() })
        );
        assert_eq!(
            classify(&json!({"info_collection_result": "facts"})),
            Some(StreamEvent::InfoResult { text: "facts".into() })
        );
        assert_eq!(classify(&json!({"done": true})), Some(StreamEvent::Done));
        assert_eq!(
            classify(&json!({"error": "quota exceeded"})),
            Some(StreamEvent::Error { message: "quota exceeded".into() })
        );
    }

    #[test]
    fn test_precedence_is_fixed() {
        let all = json!({
            "error": "e",
            "done": true,
            "chunk": "c",
            "info_collection_result": "i"
        });
        assert_eq!(
            classify(&all),
            Some(StreamEvent::InfoResult { text: "i".into() })
        );

        let chunk_and_error = json!({"error": "e", "chunk": "c"});
        for _ in 0..3 {
            assert_eq!(
                classify(&chunk_and_error),
                Some(StreamEvent::Chunk { text: "c".into() })
            );
        }

        assert_eq!(
            classify(&json!({"done": true, "error": "e"})),
            Some(StreamEvent::Done)
        );
    }

    #[test]
    fn test_falsy_done_falls_through() {
        assert_eq!(classify(&json!({"done": false})), None);
        assert_eq!(classify(&json!({"done": 0})), None);
        assert_eq!(
            classify(&json!({"done": false, "error": "late"})),
            Some(StreamEvent::Error { message: "late".into() })
        );
        assert_eq!(classify(&json!({"done": 1})), Some(StreamEvent::Done));
    }

    #[test]
    fn test_null_fields_are_absent() {
        assert_eq!(
            classify(&json!({"chunk": null, "error": "boom"})),
            Some(StreamEvent::Error { message: "boom".into() })
        );
    }

    #[test]
    fn test_non_string_error_kept_as_json() {
        assert_eq!(
            classify(&json!({"error": {"code": 429}})),
            Some(StreamEvent::Error { message: r#"{"code":429}"#.into() })
        );
    }

    #[test]
    fn test_unknown_and_non_object_ignored() {
        assert_eq!(classify(&json!({"usage": {"tokens": 3}})), None);
        assert_eq!(classify(&json!(["chunk", "x"])), None);
        assert_eq!(classify(&json!("chunk")), None);
    }

    #[test]
    fn test_parse_frame_reports_bad_json() {
        assert!(parse_frame("{not json").is_err());
        assert_eq!(parse_frame("{}").unwrap(), None);
    }

    #[test]
    fn test_is_terminal() {
        assert!(StreamEvent::Done.is_terminal());
        assert!(StreamEvent::Error { message: String::new() }.is_terminal());
        assert!(!StreamEvent::Chunk { text: "x".into() }.is_terminal());
        assert_eq!(StreamEvent::Chunk { text: "x".into() }.as_chunk(), Some("x"));
    }
}
