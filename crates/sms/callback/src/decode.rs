//! Normalizers for payload fields whose JSON type the vendor does not fix.
//!
//! Each ambiguous field shape has one function here; decoders never
//! type-switch on JSON values themselves.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::notification::NotificationKind;
use crate::time;

/// Normalizes an identifier sent as a JSON string or a JSON integer.
///
/// Both encodings yield the same decimal string. `null`, `""`, `"0"` and `0`
/// are the vendor's "no value" markers and yield `None`. Any other JSON type
/// is an error.
pub fn normalize_identifier(value: &Value) -> Result<Option<String>, String> {
    let id = match value {
        Value::Null => return Ok(None),
        Value::String(s) => s.clone(),
        Value::Number(n) => n
            .as_i64()
            .map(|n| n.to_string())
            .ok_or_else(|| format!("identifier {n} is not a 64-bit integer"))?,
        other => return Err(format!("expected string or integer identifier, got {other}")),
    };

    if id.is_empty() || id.bytes().all(|b| b == b'0') {
        Ok(None)
    } else {
        Ok(Some(id))
    }
}

/// Normalizes a numeric code sent as a JSON integer or a decimal string.
///
/// Unlike identifiers, `0` is a real value here.
pub fn normalize_integer(value: &Value) -> Result<Option<i64>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| format!("{n} is not a 64-bit integer")),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| format!("{s:?} is not an integer")),
        other => Err(format!("expected integer, got {other}")),
    }
}

/// Normalizes a timestamp sent as Unix milliseconds or as a formatted string.
pub fn normalize_timestamp(value: &Value) -> Result<Option<DateTime<Utc>>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .and_then(time::from_unix_millis)
            .map(Some)
            .ok_or_else(|| format!("{n} is not a valid millisecond timestamp")),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => time::normalize(s).map(Some).map_err(|e| e.to_string()),
        other => Err(format!("expected timestamp, got {other}")),
    }
}

/// Normalizes free text; numbers (e.g. phone numbers) are rendered as-is.
pub fn normalize_text(value: &Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(format!("expected string, got {other}")),
    }
}

/// The top-level object of one `data` payload.
pub(crate) struct Fields<'a> {
    kind: NotificationKind,
    raw: &'a str,
    map: Map<String, Value>,
}

impl<'a> Fields<'a> {
    /// Parses `raw` as a JSON object.
    pub(crate) fn parse(kind: NotificationKind, raw: &'a str) -> Result<Self, DecodeError> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(Self { kind, raw, map }),
            Ok(other) => Err(DecodeError::new(
                kind,
                raw,
                format!("expected JSON object, got {}", json_type(&other)),
            )),
            Err(e) => Err(DecodeError::new(kind, raw, e.to_string())),
        }
    }

    pub(crate) fn identifier(&self, field: &str) -> Result<Option<String>, DecodeError> {
        self.apply(field, normalize_identifier)
    }

    /// An identifier that must be present and numeric.
    pub(crate) fn required_numeric_id(&self, field: &str) -> Result<i64, DecodeError> {
        let id = self.identifier(field)?.ok_or_else(|| self.missing(field))?;
        id.parse::<i64>()
            .map_err(|_| self.invalid(field, format!("{id:?} is not an integer")))
    }

    pub(crate) fn required_integer(&self, field: &str) -> Result<i64, DecodeError> {
        self.apply(field, normalize_integer)?
            .ok_or_else(|| self.missing(field))
    }

    pub(crate) fn timestamp(&self, field: &str) -> Result<Option<DateTime<Utc>>, DecodeError> {
        self.apply(field, normalize_timestamp)
    }

    pub(crate) fn text(&self, field: &str) -> Result<Option<String>, DecodeError> {
        self.apply(field, normalize_text)
    }

    pub(crate) fn required_text(&self, field: &str) -> Result<String, DecodeError> {
        self.text(field)?.ok_or_else(|| self.missing(field))
    }

    fn apply<T>(
        &self,
        field: &str,
        normalize: impl Fn(&Value) -> Result<Option<T>, String>,
    ) -> Result<Option<T>, DecodeError> {
        match self.map.get(field) {
            None => Ok(None),
            Some(value) => normalize(value).map_err(|reason| self.invalid(field, reason)),
        }
    }

    fn missing(&self, field: &str) -> DecodeError {
        DecodeError::new(self.kind, self.raw, format!("missing required field '{field}'"))
    }

    fn invalid(&self, field: &str, reason: String) -> DecodeError {
        DecodeError::new(self.kind, self.raw, format!("field '{field}': {reason}"))
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier_string_and_number_agree() {
        assert_eq!(normalize_identifier(&json!("123")).unwrap(), Some("123".into()));
        assert_eq!(normalize_identifier(&json!(123)).unwrap(), Some("123".into()));
        assert_eq!(normalize_identifier(&json!(-7)).unwrap(), Some("-7".into()));
    }

    #[test]
    fn test_identifier_sentinels_are_absent() {
        assert_eq!(normalize_identifier(&json!(0)).unwrap(), None);
        assert_eq!(normalize_identifier(&json!("")).unwrap(), None);
        assert_eq!(normalize_identifier(&json!("0")).unwrap(), None);
        assert_eq!(normalize_identifier(&Value::Null).unwrap(), None);
    }

    #[test]
    fn test_identifier_rejects_other_shapes() {
        assert!(normalize_identifier(&json!(1.5)).is_err());
        assert!(normalize_identifier(&json!(u64::MAX)).is_err());
        assert!(normalize_identifier(&json!({"id": 1})).is_err());
        assert!(normalize_identifier(&json!(true)).is_err());
    }

    #[test]
    fn test_integer() {
        assert_eq!(normalize_integer(&json!(0)).unwrap(), Some(0));
        assert_eq!(normalize_integer(&json!("2")).unwrap(), Some(2));
        assert_eq!(normalize_integer(&json!("")).unwrap(), None);
        assert!(normalize_integer(&json!("two")).is_err());
        assert!(normalize_integer(&json!([1])).is_err());
    }

    #[test]
    fn test_timestamp_number_is_millis() {
        let parsed = normalize_timestamp(&json!(1_672_628_645_500_i64)).unwrap().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2023-01-02T03:04:05.500+00:00");
    }

    #[test]
    fn test_timestamp_string_uses_normalizer() {
        let parsed = normalize_timestamp(&json!("2023-01-02 03:04:05.5")).unwrap().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2023-01-02T03:04:05.500+00:00");
        assert_eq!(normalize_timestamp(&json!("")).unwrap(), None);
        assert!(normalize_timestamp(&json!("soon")).is_err());
        assert!(normalize_timestamp(&json!(false)).is_err());
    }

    #[test]
    fn test_text() {
        assert_eq!(normalize_text(&json!(15550100)).unwrap(), Some("15550100".into()));
        assert_eq!(normalize_text(&json!("hi")).unwrap(), Some("hi".into()));
        assert!(normalize_text(&json!(["hi"])).is_err());
    }

    #[test]
    fn test_fields_rejects_non_object() {
        let err = Fields::parse(NotificationKind::Reply, "[1,2]").err().unwrap();
        assert_eq!(err.kind, NotificationKind::Reply);
        assert_eq!(err.raw, "[1,2]");
        assert!(err.reason.contains("array"));

        assert!(Fields::parse(NotificationKind::Reply, "{not json").is_err());
    }

    #[test]
    fn test_fields_required() {
        let fields =
            Fields::parse(NotificationKind::TemplateAudit, r#"{"templateId":"42"}"#).unwrap();
        assert_eq!(fields.required_numeric_id("templateId").unwrap(), 42);
        let err = fields.required_integer("status").unwrap_err();
        assert!(err.reason.contains("status"));
    }
}
