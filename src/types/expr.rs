use super::condition::{Condition, NumericGuard};
use super::Value;

/// User-facing condition AST as authored in a ruleset document or parsed
/// from an expression string. May reference named conditions by name.
/// Transformed into [`Condition`] during compilation, once every reference
/// is resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Equals { field: String, value: Value },
    NotEquals { field: String, value: Value },
    Includes { field: String, value: String },
    Numeric(NumericGuard),
    IsNumber { field: String, expected: bool },
    All(Vec<Expr>),
    Any(Vec<Expr>),
    /// Reference to an entry of the document's `conditions` map.
    Ref(String),
}

impl Expr {
    /// Names of all conditions referenced anywhere in this expression, in
    /// the order they appear.
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        collect_refs(self, &mut refs);
        refs
    }

    /// Convert to a [`Condition`] if the expression holds no references.
    #[must_use]
    pub fn to_condition(&self) -> Option<Condition> {
        Some(match self {
            Expr::Equals { field, value } => Condition::Equals {
                field: field.clone(),
                value: value.clone(),
            },
            Expr::NotEquals { field, value } => Condition::NotEquals {
                field: field.clone(),
                value: value.clone(),
            },
            Expr::Includes { field, value } => Condition::Includes {
                field: field.clone(),
                value: value.clone(),
            },
            Expr::Numeric(guard) => Condition::Numeric(guard.clone()),
            Expr::IsNumber { field, expected } => Condition::IsNumber {
                field: field.clone(),
                expected: *expected,
            },
            Expr::All(items) => {
                Condition::All(items.iter().map(Expr::to_condition).collect::<Option<_>>()?)
            }
            Expr::Any(items) => {
                Condition::Any(items.iter().map(Expr::to_condition).collect::<Option<_>>()?)
            }
            Expr::Ref(_) => return None,
        })
    }
}

fn collect_refs<'a>(expr: &'a Expr, out: &mut Vec<&'a str>) {
    match expr {
        Expr::Ref(name) => out.push(name),
        Expr::All(items) | Expr::Any(items) => {
            for item in items {
                collect_refs(item, out);
            }
        }
        Expr::Equals { .. }
        | Expr::NotEquals { .. }
        | Expr::Includes { .. }
        | Expr::Numeric(_)
        | Expr::IsNumber { .. } => {}
    }
}

impl From<Condition> for Expr {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Equals { field, value } => Expr::Equals { field, value },
            Condition::NotEquals { field, value } => Expr::NotEquals { field, value },
            Condition::Includes { field, value } => Expr::Includes { field, value },
            Condition::Numeric(guard) => Expr::Numeric(guard),
            Condition::IsNumber { field, expected } => Expr::IsNumber { field, expected },
            Condition::All(items) => Expr::All(items.into_iter().map(Expr::from).collect()),
            Condition::Any(items) => Expr::Any(items.into_iter().map(Expr::from).collect()),
        }
    }
}
