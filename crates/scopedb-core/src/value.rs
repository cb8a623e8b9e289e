use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use serde_json::Value as JsonValue;
use std::fmt;
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

///
/// Value
///
/// Scalar literal carried by a filter condition. Every caller-supplied
/// value reaches SQL as a bound parameter, never as interpolated text.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(OffsetDateTime),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for values that carry no constraint: null and the empty string.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Render the value as plain text; null has no text form.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(n) => Some(n.to_string()),
            Self::Text(text) => Some(text.clone()),
            Self::Date(date) => Some(format_iso(*date)),
        }
    }

    /// Return the value in its bindable form: dates become ISO-8601 text.
    #[must_use]
    pub fn to_parameter(&self) -> Self {
        match self {
            Self::Date(date) => Self::Text(format_iso(*date)),
            other => other.clone(),
        }
    }

    /// Convert a scalar JSON value. Arrays and objects have no scalar form.
    #[must_use]
    pub fn from_json(raw: &JsonValue) -> Option<Self> {
        match raw {
            JsonValue::Null => Some(Self::Null),
            JsonValue::Bool(b) => Some(Self::Bool(*b)),
            JsonValue::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            JsonValue::String(text) => Some(Self::Text(text.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => None,
        }
    }
}

/// Format a timestamp the way the console serializes dates: UTC, RFC 3339.
#[must_use]
pub fn format_iso(date: OffsetDateTime) -> String {
    let utc = date.to_offset(UtcOffset::UTC);

    utc.format(&Rfc3339)
        .unwrap_or_else(|_| utc.unix_timestamp().to_string())
}

/// Parse an RFC 3339 timestamp stored as text in a local record.
#[must_use]
pub fn parse_iso(text: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(text, &Rfc3339).ok()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => write!(f, "{text}"),
            None => write!(f, "null"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(value: OffsetDateTime) -> Self {
        Self::Date(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Float(n) => serializer.serialize_f64(*n),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Date(date) => serializer.serialize_str(&format_iso(*date)),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = JsonValue::deserialize(deserializer)?;

        Self::from_json(&raw)
            .ok_or_else(|| D::Error::custom(format!("expected a scalar filter value, found {raw}")))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dates_bind_as_utc_iso_text() {
        let date = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();

        assert_eq!(
            Value::Date(date).to_parameter(),
            Value::Text("2023-11-14T22:13:20Z".to_string())
        );
    }

    #[test]
    fn json_scalars_convert_and_containers_do_not() {
        assert_eq!(Value::from_json(&json!(null)), Some(Value::Null));
        assert_eq!(Value::from_json(&json!(3)), Some(Value::Int(3)));
        assert_eq!(Value::from_json(&json!(2.5)), Some(Value::Float(2.5)));
        assert_eq!(Value::from_json(&json!("ssh")), Some(Value::from("ssh")));
        assert_eq!(Value::from_json(&json!([1])), None);
        assert_eq!(Value::from_json(&json!({ "a": 1 })), None);
    }

    #[test]
    fn deserialize_rejects_nested_values() {
        let err = serde_json::from_value::<Value>(json!({ "nested": true })).unwrap_err();

        assert!(err.to_string().contains("expected a scalar filter value"));
    }

    #[test]
    fn blank_values_are_null_or_empty_text() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("").is_blank());
        assert!(!Value::Int(0).is_blank());
        assert!(!Value::from("x").is_blank());
    }
}
