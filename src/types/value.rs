use std::fmt;

use super::answers::Answer;

/// A literal on the right-hand side of an `equals` / `notEquals` condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A 64-bit floating-point number.
    Number(f64),
    /// A boolean value.
    Bool(bool),
    /// A UTF-8 string.
    String(String),
}

impl Value {
    /// Strict equality against an answer. Values of different kinds never
    /// compare equal, and a multi-select answer never equals a scalar.
    #[must_use]
    pub fn matches_answer(&self, answer: &Answer) -> bool {
        match (self, answer) {
            (Value::String(a), Answer::Text(b)) => a == b,
            (Value::Number(a), Answer::Number(b)) => a == b,
            (Value::Bool(a), Answer::Bool(b)) => a == b,
            _ => false,
        }
    }

    /// Convert a JSON literal. Returns `None` for null, arrays, and objects.
    pub(crate) fn from_json(value: &serde_json::Value) -> Option<Value> {
        match value {
            serde_json::Value::String(s) => Some(Value::String(s.clone())),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "\"{v}\""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_conversions() {
        assert_eq!(Value::from(2_i64), Value::Number(2.0));
        assert_eq!(Value::from(2.5_f64), Value::Number(2.5));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from("Yes"), Value::String("Yes".to_owned()));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Number(2.0).to_string(), "2");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::String("No".into()).to_string(), "\"No\"");
    }

    #[test]
    fn equality_is_kind_strict() {
        assert!(Value::from("Yes").matches_answer(&Answer::Text("Yes".into())));
        assert!(!Value::from("2").matches_answer(&Answer::Number(2.0)));
        assert!(!Value::from(2_i64).matches_answer(&Answer::Text("2".into())));
        assert!(!Value::from("Yes").matches_answer(&Answer::Choices(vec!["Yes".into()])));
        assert!(Value::from(true).matches_answer(&Answer::Bool(true)));
    }

    #[test]
    fn json_literals() {
        assert_eq!(
            Value::from_json(&serde_json::json!("Not sure")),
            Some(Value::String("Not sure".into()))
        );
        assert_eq!(Value::from_json(&serde_json::json!(7)), Some(Value::Number(7.0)));
        assert_eq!(Value::from_json(&serde_json::json!(null)), None);
        assert_eq!(Value::from_json(&serde_json::json!(["a"])), None);
    }
}
