use std::fmt;

use super::Value;

/// Ordering operators for numeric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOp {
    Gte,
    Gt,
    Lte,
    Lt,
}

impl NumericOp {
    #[must_use]
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            NumericOp::Gte => lhs >= rhs,
            NumericOp::Gt => lhs > rhs,
            NumericOp::Lte => lhs <= rhs,
            NumericOp::Lt => lhs < rhs,
        }
    }

    /// The document key for this operator (`"gte"`, `"gt"`, ...).
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            NumericOp::Gte => "gte",
            NumericOp::Gt => "gt",
            NumericOp::Lte => "lte",
            NumericOp::Lt => "lt",
        }
    }
}

impl fmt::Display for NumericOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericOp::Gte => write!(f, ">="),
            NumericOp::Gt => write!(f, ">"),
            NumericOp::Lte => write!(f, "<="),
            NumericOp::Lt => write!(f, "<"),
        }
    }
}

/// A numeric threshold check on one answer field.
///
/// Used both as a [`Condition::Numeric`] leaf and as the optional numeric
/// guard on conditional triggers and lower-risk adds.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericGuard {
    pub field: String,
    pub op: NumericOp,
    pub threshold: f64,
}

impl fmt::Display for NumericGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.threshold)
    }
}

/// A boolean predicate over an answer map.
///
/// Every shape the document grammar accepts maps to exactly one variant, so
/// an unrecognized condition cannot exist once a ruleset is compiled.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Equals { field: String, value: Value },
    NotEquals { field: String, value: Value },
    /// The field must be a multi-select answer containing `value`.
    Includes { field: String, value: String },
    Numeric(NumericGuard),
    /// Whether the field coerces to a number. With `expected: false` this
    /// also holds for an absent field.
    IsNumber { field: String, expected: bool },
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    #[must_use]
    pub fn and(self, other: Condition) -> Condition {
        match self {
            Condition::All(mut items) => {
                items.push(other);
                Condition::All(items)
            }
            first => Condition::All(vec![first, other]),
        }
    }

    #[must_use]
    pub fn or(self, other: Condition) -> Condition {
        match self {
            Condition::Any(mut items) => {
                items.push(other);
                Condition::Any(items)
            }
            first => Condition::Any(vec![first, other]),
        }
    }

    /// Nesting depth of this condition (a leaf has depth 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Condition::All(items) | Condition::Any(items) => {
                1 + items.iter().map(Condition::depth).max().unwrap_or(0)
            }
            _ => 1,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Equals { field, value } => write!(f, "({field} == {value})"),
            Condition::NotEquals { field, value } => write!(f, "({field} != {value})"),
            Condition::Includes { field, value } => write!(f, "({field} contains \"{value}\")"),
            Condition::Numeric(guard) => write!(f, "({guard})"),
            Condition::IsNumber {
                field,
                expected: true,
            } => write!(f, "({field} is number)"),
            Condition::IsNumber {
                field,
                expected: false,
            } => write!(f, "({field} is not number)"),
            Condition::All(items) => write_joined(f, items, "AND", "true"),
            Condition::Any(items) => write_joined(f, items, "OR", "false"),
        }
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    items: &[Condition],
    keyword: &str,
    empty: &str,
) -> fmt::Result {
    if items.is_empty() {
        return write!(f, "{empty}");
    }
    write!(f, "(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " {keyword} ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, ")")
}

/// Intermediate builder for field conditions.
/// Created by [`field()`]; requires a comparison method to produce a [`Condition`].
#[derive(Debug, Clone)]
pub struct FieldCondition {
    name: String,
}

impl FieldCondition {
    #[must_use]
    pub fn eq(self, value: impl Into<Value>) -> Condition {
        Condition::Equals {
            field: self.name,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn neq(self, value: impl Into<Value>) -> Condition {
        Condition::NotEquals {
            field: self.name,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn includes(self, value: &str) -> Condition {
        Condition::Includes {
            field: self.name,
            value: value.to_owned(),
        }
    }

    #[must_use]
    pub fn gte(self, threshold: f64) -> Condition {
        Condition::Numeric(self.guard(NumericOp::Gte, threshold))
    }

    #[must_use]
    pub fn gt(self, threshold: f64) -> Condition {
        Condition::Numeric(self.guard(NumericOp::Gt, threshold))
    }

    #[must_use]
    pub fn lte(self, threshold: f64) -> Condition {
        Condition::Numeric(self.guard(NumericOp::Lte, threshold))
    }

    #[must_use]
    pub fn lt(self, threshold: f64) -> Condition {
        Condition::Numeric(self.guard(NumericOp::Lt, threshold))
    }

    #[must_use]
    pub fn is_number(self) -> Condition {
        Condition::IsNumber {
            field: self.name,
            expected: true,
        }
    }

    /// True when the field is absent or does not coerce to a number.
    #[must_use]
    pub fn not_number(self) -> Condition {
        Condition::IsNumber {
            field: self.name,
            expected: false,
        }
    }

    /// Build a bare numeric guard rather than a condition.
    #[must_use]
    pub fn guard(self, op: NumericOp, threshold: f64) -> NumericGuard {
        NumericGuard {
            field: self.name,
            op,
            threshold,
        }
    }
}

#[must_use]
pub fn field(name: &str) -> FieldCondition {
    FieldCondition {
        name: name.to_owned(),
    }
}

/// Conjunction over `conditions`; true when empty.
#[must_use]
pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::All(conditions.into_iter().collect())
}

/// Disjunction over `conditions`; false when empty.
#[must_use]
pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::Any(conditions.into_iter().collect())
}
