mod error;
mod grammar;

pub use error::ParseError;

use crate::Expr;

/// Parse a condition expression such as
/// `federal_nexus == 'Yes' AND activities contains 'Pesticide application'`.
///
/// Bare identifiers parse as references to named conditions; they are
/// resolved when the ruleset is compiled.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid expression.
pub fn parse_condition(input: &str) -> Result<Expr, ParseError> {
    use winnow::Parser;
    grammar::parse_condition
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))
}
