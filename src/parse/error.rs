use thiserror::Error;

/// Errors produced when parsing a condition expression or a summary template.
#[derive(Debug, Error)]
#[error("parse error: {message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
