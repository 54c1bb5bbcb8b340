//! Plain-text documentation summaries.
//!
//! A template is ordinary text with `{placeholder}` slots filled from a
//! [`Decision`] and the answers it was computed from:
//!
//! ```text
//! Screening result: {determination}.
//! Risk score: {riskScore}/{riskScoreMax} ({riskBand} risk). Confidence: {confidence}.
//! Federal nexus: {answer:federal_nexus}.
//! ```
//!
//! `{{` and `}}` produce literal braces. Unknown placeholders are rejected
//! when the template is parsed, so rendering cannot fail.

use winnow::combinator::{alt, cut_err, repeat};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::take_till;

use crate::parse::ParseError;
use crate::{Answer, Answers, Decision};

const NOT_PROVIDED: &str = "Not provided";
const NONE_SELECTED: &str = "None selected";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Placeholder {
    Determination,
    RiskScore,
    RiskScoreMax,
    RiskBand,
    Confidence,
    WhyText,
    NextAction,
    Answer(String),
}

impl Placeholder {
    fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Some(field) = name.strip_prefix("answer:") {
            let field = field.trim();
            return (!field.is_empty()).then(|| Placeholder::Answer(field.to_owned()));
        }
        Some(match name {
            "determination" => Placeholder::Determination,
            "riskScore" => Placeholder::RiskScore,
            "riskScoreMax" => Placeholder::RiskScoreMax,
            "riskBand" => Placeholder::RiskBand,
            "confidence" => Placeholder::Confidence,
            "whyText" => Placeholder::WhyText,
            "nextAction" => Placeholder::NextAction,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Slot(Placeholder),
}

/// A parsed summary template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTemplate {
    segments: Vec<Segment>,
}

impl SummaryTemplate {
    /// Parse a template.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on an unknown or unterminated placeholder, or
    /// a stray `}`.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let segments = template
            .parse(input)
            .map_err(|e| ParseError::new(e.to_string()))?;
        Ok(Self { segments })
    }

    /// Parse template lines, joined with newlines.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse).
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, ParseError> {
        let joined: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
        Self::parse(&joined.join("\n"))
    }

    /// Fill every placeholder. Missing answers render as `Not provided`,
    /// multi-select answers are joined with `, ` (`None selected` when empty).
    #[must_use]
    pub fn render(&self, decision: &Decision, answers: &Answers, risk_score_max: u32) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot(Placeholder::Determination) => out.push_str(&decision.determination),
                Segment::Slot(Placeholder::RiskScore) => {
                    out.push_str(&decision.risk_score.to_string());
                }
                Segment::Slot(Placeholder::RiskScoreMax) => {
                    out.push_str(&risk_score_max.to_string());
                }
                Segment::Slot(Placeholder::RiskBand) => out.push_str(&decision.risk_band),
                Segment::Slot(Placeholder::Confidence) => out.push_str(&decision.confidence),
                Segment::Slot(Placeholder::WhyText) => out.push_str(&decision.why_text),
                Segment::Slot(Placeholder::NextAction) => out.push_str(&decision.next_action),
                Segment::Slot(Placeholder::Answer(field)) => {
                    out.push_str(&render_answer(answers.get(field)));
                }
            }
        }
        out
    }
}

fn render_answer(answer: Option<&Answer>) -> String {
    match answer {
        None => NOT_PROVIDED.to_owned(),
        Some(Answer::Text(s)) => s.clone(),
        Some(Answer::Number(n)) => n.to_string(),
        Some(Answer::Bool(b)) => b.to_string(),
        Some(Answer::Choices(items)) if items.is_empty() => NONE_SELECTED.to_owned(),
        Some(Answer::Choices(items)) => items.join(", "),
    }
}

// -- Grammar ----------------------------------------------------------------

fn placeholder(input: &mut &str) -> ModalResult<Placeholder> {
    '{'.parse_next(input)?;
    let slot = cut_err(take_till(1.., ['{', '}']).verify_map(Placeholder::from_name))
        .context(StrContext::Expected(StrContextValue::Description(
            "known placeholder",
        )))
        .parse_next(input)?;
    cut_err('}').parse_next(input)?;
    Ok(slot)
}

fn segment(input: &mut &str) -> ModalResult<Segment> {
    alt((
        "{{".value(Segment::Text("{".to_owned())),
        "}}".value(Segment::Text("}".to_owned())),
        placeholder.map(Segment::Slot),
        take_till(1.., ['{', '}']).map(|s: &str| Segment::Text(s.to_owned())),
    ))
    .parse_next(input)
}

fn template(input: &mut &str) -> ModalResult<Vec<Segment>> {
    let raw: Vec<Segment> = repeat(0.., segment).parse_next(input)?;
    let mut merged: Vec<Segment> = Vec::with_capacity(raw.len());
    for seg in raw {
        match (merged.last_mut(), seg) {
            (Some(Segment::Text(prev)), Segment::Text(next)) => prev.push_str(&next),
            (_, seg) => merged.push(seg),
        }
    }
    Ok(merged)
}
