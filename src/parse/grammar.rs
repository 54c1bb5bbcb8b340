use winnow::ascii::{digit1, till_line_ending};
use winnow::combinator::{alt, cut_err, delimited, not, opt, preceded, repeat, terminated};
use winnow::error::{ContextError, ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use crate::{Expr, NumericGuard, NumericOp, Value};

// -- Whitespace & comments --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

// -- Identifiers ------------------------------------------------------------

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_ident_char),
    )
        .take()
        .parse_next(input)
}

/// A keyword in either spelling, not followed by another identifier
/// character.
fn keyword<'i>(
    upper: &'static str,
    lower: &'static str,
) -> impl Parser<&'i str, (), ErrMode<ContextError>> {
    terminated(alt((upper, lower)), not(one_of(is_ident_char))).void()
}

// -- Literals ---------------------------------------------------------------

/// Single- or double-quoted string. The closing quote must match the
/// opening one; the other quote character needs no escaping.
fn string_literal(input: &mut &str) -> ModalResult<String> {
    let quote = alt(('"', '\'')).parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            c if c == quote => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\'' => s.push('\''),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn number(input: &mut &str) -> ModalResult<f64> {
    (opt('-'), digit1, opt(('.', digit1)))
        .take()
        .try_map(str::parse::<f64>)
        .context(StrContext::Expected(StrContextValue::Description("number")))
        .parse_next(input)
}

fn literal(input: &mut &str) -> ModalResult<Value> {
    ws.parse_next(input)?;
    alt((
        string_literal.map(Value::String),
        "true".value(Value::Bool(true)),
        "false".value(Value::Bool(false)),
        number.map(Value::Number),
    ))
    .context(StrContext::Expected(StrContextValue::Description("value")))
    .parse_next(input)
}

// -- Operators --------------------------------------------------------------

#[derive(Clone, Copy)]
enum Op {
    Eq,
    Neq,
    Ordering(NumericOp),
}

fn compare_op(input: &mut &str) -> ModalResult<Op> {
    alt((
        ">=".value(Op::Ordering(NumericOp::Gte)),
        ">".value(Op::Ordering(NumericOp::Gt)),
        "<=".value(Op::Ordering(NumericOp::Lte)),
        "<".value(Op::Ordering(NumericOp::Lt)),
        "==".value(Op::Eq),
        "!=".value(Op::Neq),
    ))
    .parse_next(input)
}

// -- Expressions (precedence: OR < AND < primary) ---------------------------

fn primary(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    alt((delimited('(', expr, (ws, ')')), comparison_or_ref))
        .context(StrContext::Expected(StrContextValue::Description(
            "condition",
        )))
        .parse_next(input)
}

fn comparison_or_ref(input: &mut &str) -> ModalResult<Expr> {
    let name = ident.parse_next(input)?;
    let field = name.to_owned();
    let checkpoint = input.checkpoint();
    ws.parse_next(input)?;

    if let Ok(op) = compare_op.parse_next(input) {
        return match op {
            Op::Eq => {
                let value = cut_err(literal).parse_next(input)?;
                Ok(Expr::Equals { field, value })
            }
            Op::Neq => {
                let value = cut_err(literal).parse_next(input)?;
                Ok(Expr::NotEquals { field, value })
            }
            Op::Ordering(op) => {
                let threshold = cut_err(preceded(ws, number)).parse_next(input)?;
                Ok(Expr::Numeric(NumericGuard {
                    field,
                    op,
                    threshold,
                }))
            }
        };
    }

    input.reset(&checkpoint);
    ws.parse_next(input)?;
    if opt(keyword("CONTAINS", "contains")).parse_next(input)?.is_some() {
        let value = cut_err(preceded(ws, string_literal))
            .context(StrContext::Expected(StrContextValue::Description(
                "quoted string",
            )))
            .parse_next(input)?;
        return Ok(Expr::Includes { field, value });
    }

    input.reset(&checkpoint);
    ws.parse_next(input)?;
    if opt(keyword("IS", "is")).parse_next(input)?.is_some() {
        let negated = opt(preceded(ws, keyword("NOT", "not")))
            .parse_next(input)?
            .is_some();
        cut_err(preceded(ws, keyword("NUMBER", "number")))
            .context(StrContext::Expected(StrContextValue::Description(
                "number",
            )))
            .parse_next(input)?;
        return Ok(Expr::IsNumber {
            field,
            expected: !negated,
        });
    }

    input.reset(&checkpoint);
    Ok(Expr::Ref(field))
}

fn and_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = primary(input)?;
    let rest: Vec<Expr> =
        repeat(0.., preceded((ws, keyword("AND", "and")), cut_err(primary))).parse_next(input)?;
    Ok(join(first, rest, Expr::All))
}

fn or_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = and_expr(input)?;
    let rest: Vec<Expr> =
        repeat(0.., preceded((ws, keyword("OR", "or")), cut_err(and_expr))).parse_next(input)?;
    Ok(join(first, rest, Expr::Any))
}

fn join(first: Expr, rest: Vec<Expr>, wrap: fn(Vec<Expr>) -> Expr) -> Expr {
    if rest.is_empty() {
        return first;
    }
    let mut items = Vec::with_capacity(rest.len() + 1);
    items.push(first);
    items.extend(rest);
    wrap(items)
}

fn expr(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    or_expr(input)
}

// -- Top-level parser -------------------------------------------------------

pub fn parse_condition(input: &mut &str) -> ModalResult<Expr> {
    let condition = expr(input)?;
    ws.parse_next(input)?;
    Ok(condition)
}
