use std::collections::HashMap;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single questionnaire answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// Single-choice or free-text answer.
    Text(String),
    /// Multi-select answer, in selection order.
    Choices(Vec<String>),
    /// Numeric answer.
    Number(f64),
    /// Boolean answer.
    Bool(bool),
}

impl Answer {
    /// Coerce this answer to a finite number.
    ///
    /// This is the only numeric coercion in the crate. Text is trimmed and
    /// parsed as `f64`; empty or whitespace-only text, unparsable text, and
    /// non-finite results yield `None`. Booleans and multi-select answers
    /// never coerce.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Answer::Number(n) => *n,
            Answer::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok()?
            }
            Answer::Choices(_) | Answer::Bool(_) => return None,
        };
        n.is_finite().then_some(n)
    }

    /// The selected items, if this is a multi-select answer.
    #[must_use]
    pub fn as_choices(&self) -> Option<&[String]> {
        match self {
            Answer::Choices(items) => Some(items),
            _ => None,
        }
    }

    fn from_json(value: serde_json::Value) -> Option<Answer> {
        match value {
            serde_json::Value::String(s) => Some(Answer::Text(s)),
            serde_json::Value::Number(n) => n.as_f64().map(Answer::Number),
            serde_json::Value::Bool(b) => Some(Answer::Bool(b)),
            serde_json::Value::Array(items) => Some(Answer::Choices(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        serde_json::Value::String(s) => Some(s),
                        serde_json::Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect(),
            )),
            serde_json::Value::Null | serde_json::Value::Object(_) => None,
        }
    }
}

impl From<&str> for Answer {
    fn from(v: &str) -> Self {
        Answer::Text(v.to_owned())
    }
}

impl From<String> for Answer {
    fn from(v: String) -> Self {
        Answer::Text(v)
    }
}

impl From<f64> for Answer {
    fn from(v: f64) -> Self {
        Answer::Number(v)
    }
}

impl From<i64> for Answer {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        Answer::Number(v as f64)
    }
}

impl From<bool> for Answer {
    fn from(v: bool) -> Self {
        Answer::Bool(v)
    }
}

impl From<Vec<String>> for Answer {
    fn from(v: Vec<String>) -> Self {
        Answer::Choices(v)
    }
}

impl From<&[&str]> for Answer {
    fn from(v: &[&str]) -> Self {
        Answer::Choices(v.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Answer {
    fn from(v: [&str; N]) -> Self {
        Answer::Choices(v.iter().map(|s| (*s).to_owned()).collect())
    }
}

/// Flat map from question identifier to [`Answer`].
///
/// A missing key means "not provided", which is distinct from an explicit
/// "Not sure" choice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Answers {
    data: HashMap<String, Answer>,
}

impl Answers {
    /// Create an empty answer map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an answer, builder style.
    #[must_use]
    pub fn set(mut self, key: &str, value: impl Into<Answer>) -> Self {
        self.insert(key, value.into());
        self
    }

    /// Insert an answer (mutable reference version).
    pub fn insert(&mut self, key: &str, value: Answer) {
        self.data.insert(key.to_owned(), value);
    }

    /// Look up an answer. Returns `None` if the question was not answered.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Answer> {
        self.data.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Parse a JSON object of answers.
    ///
    /// `null` values and nested objects are dropped and therefore read as
    /// "not provided".
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if the input is not a JSON object.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

impl<'de> Deserialize<'de> for Answers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: HashMap<String, serde_json::Value> = HashMap::deserialize(deserializer)?;
        let data = raw
            .into_iter()
            .filter_map(|(key, value)| Answer::from_json(value).map(|answer| (key, answer)))
            .collect();
        Ok(Self { data })
    }
}

impl Serialize for Answers {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut keys: Vec<&String> = self.data.keys().collect();
        keys.sort();
        let mut map = serializer.serialize_map(Some(keys.len()))?;
        for key in keys {
            match &self.data[key] {
                Answer::Text(s) => map.serialize_entry(key, s)?,
                Answer::Choices(items) => map.serialize_entry(key, items)?,
                Answer::Number(n) => map.serialize_entry(key, n)?,
                Answer::Bool(b) => map.serialize_entry(key, b)?,
            }
        }
        map.end()
    }
}
