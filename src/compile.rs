use std::collections::{BTreeMap, HashMap, VecDeque};

use tracing::{info, warn};

use crate::parse::parse_condition;
use crate::summary::SummaryTemplate;
use crate::types::document::{
    ConditionDoc, ConditionNode, ConditionalTriggerDoc, EarlyExitDoc, HighRiskTriggerDoc,
    LowerRiskAddDoc, MetaDoc, OutcomeDoc, PenaltyDoc, RecommendationRuleDoc, RulesetDocument,
    ScoringDoc,
};
use crate::{
    Condition, ConditionalTrigger, ConfidenceBand, ConfigError, Driver, EarlyExitRule, Expr,
    HighRiskTrigger, LowerRiskAdd, Meta, NumericGuard, NumericOp, Outcome, RecommendationRule,
    RecommendationTrigger, RiskBand, Ruleset, Scoring, TriggerOutcome, UnknownPenalty, Value,
};

pub(crate) fn compile(doc: RulesetDocument) -> Result<Ruleset, ConfigError> {
    let meta_doc = doc
        .meta
        .ok_or(ConfigError::MissingSection { section: "meta" })?;
    let scoring_doc = doc
        .scoring
        .ok_or(ConfigError::MissingSection { section: "scoring" })?;

    let named = resolve_named(&doc.conditions)?;
    let resolver = Resolver { named: &named };

    let meta = build_meta(meta_doc);
    let early_exits = doc
        .rules_in_order
        .into_iter()
        .enumerate()
        .map(|(i, rule)| early_exit(rule, &resolver, &format!("rulesInOrder[{i}]")))
        .collect::<Result<Vec<_>, ConfigError>>()?;
    let scoring = build_scoring(scoring_doc, &resolver)?;

    finish(meta, early_exits, scoring)
}

/// Validation shared by every way of producing a [`Ruleset`]: documents,
/// the builder, and the binary cache.
pub(crate) fn finish(
    meta: Meta,
    early_exits: Vec<EarlyExitRule>,
    scoring: Scoring,
) -> Result<Ruleset, ConfigError> {
    check_meta(&meta)?;
    check_early_exits(&early_exits)?;
    check_scoring(&scoring)?;

    let summary = meta
        .summary
        .as_deref()
        .map(SummaryTemplate::from_lines)
        .transpose()
        .map_err(|source| ConfigError::InvalidTemplate {
            path: "meta.summary".to_owned(),
            source,
        })?;

    info!(
        early_exits = early_exits.len(),
        unknown_penalties = scoring.unknown_penalties.len(),
        high_risk_triggers = scoring.high_risk_triggers.len(),
        conditional_triggers = scoring.conditional_triggers.len(),
        lower_risk_adds = scoring.lower_risk_adds.len(),
        "compiled screening ruleset"
    );

    Ok(Ruleset {
        meta,
        early_exits,
        scoring,
        summary,
    })
}

// -- Document -> domain -----------------------------------------------------

fn build_meta(doc: MetaDoc) -> Meta {
    let confidence = doc
        .confidence_by_unknowns
        .into_iter()
        .map(|b| ConfidenceBand {
            max_unknowns: b.max_unknowns,
            label: b.label,
        })
        .collect();
    let risk = doc
        .risk_bands
        .into_iter()
        .map(|b| RiskBand {
            min: b.min,
            label: b.label,
        })
        .collect();

    let mut meta = Meta::new(doc.risk_score_max, confidence, risk, doc.defaults.baseline_risk);
    if let Some(label) = doc.defaults.fallback_confidence {
        meta = meta.with_fallback_confidence(label);
    }
    if let Some(label) = doc.defaults.fallback_risk_band {
        meta = meta.with_fallback_risk_band(label);
    }
    if let Some(detail) = doc.defaults.unknown_penalty_detail {
        meta = meta.with_unknown_penalty_detail(detail);
    }
    if let Some(max) = doc.max_recommendations {
        meta = meta.with_max_recommendations(max);
    }
    if let Some(lines) = doc.summary {
        meta = meta.with_summary(lines);
    }
    meta
}

fn early_exit(
    doc: EarlyExitDoc,
    resolver: &Resolver<'_>,
    path: &str,
) -> Result<EarlyExitRule, ConfigError> {
    Ok(EarlyExitRule {
        when_all: resolver.conditions(&doc.when_all, &format!("{path}.whenAll"))?,
        outcome: outcome(doc.outcome, &format!("{path}.outcome"))?,
    })
}

fn outcome(doc: OutcomeDoc, path: &str) -> Result<Outcome, ConfigError> {
    Ok(Outcome {
        determination: determination(doc.determination, path)?,
        risk_score: doc.risk_score,
        unknowns: doc.unknowns,
        why_text: doc.why_text,
        next_action: doc.next_action,
        recommendations: doc.recommendations,
        drivers: doc.drivers,
    })
}

fn trigger_outcome(doc: OutcomeDoc, path: &str) -> Result<TriggerOutcome, ConfigError> {
    Ok(TriggerOutcome {
        determination: determination(doc.determination, path)?,
        why_text: doc.why_text,
        next_action: doc.next_action,
    })
}

fn determination(value: Option<String>, path: &str) -> Result<String, ConfigError> {
    value
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingDetermination {
            path: path.to_owned(),
        })
}

fn build_scoring(doc: ScoringDoc, resolver: &Resolver<'_>) -> Result<Scoring, ConfigError> {
    let unknown_penalties = doc
        .unknown_penalties
        .into_iter()
        .enumerate()
        .map(|(i, p)| penalty(p, resolver, &format!("scoring.unknownPenalties[{i}]")))
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let high_risk_triggers = doc
        .high_risk_triggers
        .into_iter()
        .enumerate()
        .map(|(i, t)| high_risk(t, resolver, &format!("scoring.highRiskTriggers[{i}]")))
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let conditional_triggers = doc
        .conditional_triggers
        .into_iter()
        .enumerate()
        .map(|(i, t)| conditional(t, resolver, &format!("scoring.conditionalTriggers[{i}]")))
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let lower_risk_adds = doc
        .lower_risk_adds
        .into_iter()
        .enumerate()
        .map(|(i, a)| lower_risk(a, resolver, &format!("scoring.lowerRiskAdds[{i}]")))
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let default_outcome = doc.default_outcome.ok_or(ConfigError::MissingSection {
        section: "scoring.defaultOutcome",
    })?;

    let recommendation_rules = doc
        .recommendation_rules
        .into_iter()
        .enumerate()
        .map(|(i, r)| recommendation_rule(r, &format!("scoring.recommendationRules[{i}]")))
        .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(Scoring {
        baseline_drivers: doc.baseline_drivers,
        unknown_penalties,
        high_risk_triggers,
        conditional_triggers,
        lower_risk_adds,
        default_outcome: trigger_outcome(default_outcome, "scoring.defaultOutcome")?,
        default_recommendations: doc.default_recommendations,
        recommendation_rules,
    })
}

fn penalty(
    doc: PenaltyDoc,
    resolver: &Resolver<'_>,
    path: &str,
) -> Result<UnknownPenalty, ConfigError> {
    let inline = node_kinds(&doc.node);
    let condition = match (&doc.when, inline.first()) {
        (Some(_), Some(kind)) => {
            return Err(ConfigError::AmbiguousCondition {
                path: path.to_owned(),
                first: "when",
                second: kind.key(),
            })
        }
        (Some(when), None) => resolver.condition(when, &format!("{path}.when"))?,
        (None, _) => resolver.resolve(&node_to_expr(&doc.node, path)?, path)?,
    };
    Ok(UnknownPenalty {
        condition,
        label: doc.label,
        points: doc.points,
        detail: doc.detail,
    })
}

fn high_risk(
    doc: HighRiskTriggerDoc,
    resolver: &Resolver<'_>,
    path: &str,
) -> Result<HighRiskTrigger, ConfigError> {
    Ok(HighRiskTrigger {
        when_any: resolver.conditions(&doc.when_any, &format!("{path}.whenAny"))?,
        driver: Driver::new(doc.label, doc.add_points, doc.detail),
        outcome: trigger_outcome(doc.outcome, &format!("{path}.outcome"))?,
    })
}

fn conditional(
    doc: ConditionalTriggerDoc,
    resolver: &Resolver<'_>,
    path: &str,
) -> Result<ConditionalTrigger, ConfigError> {
    Ok(ConditionalTrigger {
        when_all: resolver.conditions(&doc.when_all, &format!("{path}.whenAll"))?,
        when_any: resolver.conditions(&doc.when_any, &format!("{path}.whenAny"))?,
        numeric: resolver.numeric(doc.numeric.as_ref(), &format!("{path}.numeric"))?,
        driver: Driver::new(doc.label, doc.add_points, doc.detail),
        outcome: trigger_outcome(doc.outcome, &format!("{path}.outcome"))?,
    })
}

fn lower_risk(
    doc: LowerRiskAddDoc,
    resolver: &Resolver<'_>,
    path: &str,
) -> Result<LowerRiskAdd, ConfigError> {
    Ok(LowerRiskAdd {
        when_all: resolver.conditions(&doc.when_all, &format!("{path}.whenAll"))?,
        numeric: resolver.numeric(doc.numeric.as_ref(), &format!("{path}.numeric"))?,
        driver: Driver::new(doc.label, doc.add_points, doc.detail),
    })
}

fn recommendation_rule(
    doc: RecommendationRuleDoc,
    path: &str,
) -> Result<RecommendationRule, ConfigError> {
    let when = match (doc.when_driver_label_contains, doc.when_confidence_is_not) {
        (Some(phrase), None) => RecommendationTrigger::DriverLabelContains(phrase),
        (None, Some(label)) => RecommendationTrigger::ConfidenceIsNot(label),
        (Some(_), Some(_)) => {
            return Err(ConfigError::AmbiguousCondition {
                path: path.to_owned(),
                first: "whenDriverLabelContains",
                second: "whenConfidenceIsNot",
            })
        }
        (None, None) => {
            return Err(ConfigError::UnrecognizedCondition {
                path: path.to_owned(),
            })
        }
    };
    Ok(RecommendationRule {
        when,
        recommendations: doc.recommendations,
    })
}

// -- Condition nodes --------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Equals,
    NotEquals,
    Includes,
    Numeric(NumericOp, f64),
    IsNumber(bool),
    All,
    Any,
    Ref,
}

impl NodeKind {
    fn key(self) -> &'static str {
        match self {
            NodeKind::Equals => "equals",
            NodeKind::NotEquals => "notEquals",
            NodeKind::Includes => "includes",
            NodeKind::Numeric(op, _) => op.key(),
            NodeKind::IsNumber(_) => "isNumber",
            NodeKind::All => "all",
            NodeKind::Any => "any",
            NodeKind::Ref => "ref",
        }
    }
}

/// Every kind key present on a node, in a fixed order.
fn node_kinds(node: &ConditionNode) -> Vec<NodeKind> {
    let mut kinds = Vec::new();
    if node.equals.is_some() {
        kinds.push(NodeKind::Equals);
    }
    if node.not_equals.is_some() {
        kinds.push(NodeKind::NotEquals);
    }
    if node.includes.is_some() {
        kinds.push(NodeKind::Includes);
    }
    for (op, threshold) in [
        (NumericOp::Gte, node.gte),
        (NumericOp::Gt, node.gt),
        (NumericOp::Lte, node.lte),
        (NumericOp::Lt, node.lt),
    ] {
        if let Some(threshold) = threshold {
            kinds.push(NodeKind::Numeric(op, threshold));
        }
    }
    if let Some(expected) = node.is_number {
        kinds.push(NodeKind::IsNumber(expected));
    }
    if node.all.is_some() {
        kinds.push(NodeKind::All);
    }
    if node.any.is_some() {
        kinds.push(NodeKind::Any);
    }
    if node.reference.is_some() {
        kinds.push(NodeKind::Ref);
    }
    kinds
}

fn to_expr(doc: &ConditionDoc, path: &str) -> Result<Expr, ConfigError> {
    match doc {
        ConditionDoc::Expression(text) => {
            parse_condition(text).map_err(|source| ConfigError::InvalidExpression {
                path: path.to_owned(),
                source,
            })
        }
        ConditionDoc::Node(node) => node_to_expr(node, path),
    }
}

fn node_to_expr(node: &ConditionNode, path: &str) -> Result<Expr, ConfigError> {
    let kind = match node_kinds(node).as_slice() {
        [] => {
            return Err(ConfigError::UnrecognizedCondition {
                path: path.to_owned(),
            })
        }
        [kind] => *kind,
        [first, second, ..] => {
            return Err(ConfigError::AmbiguousCondition {
                path: path.to_owned(),
                first: first.key(),
                second: second.key(),
            })
        }
    };

    let field = || {
        node.field.clone().ok_or_else(|| ConfigError::MissingField {
            path: path.to_owned(),
            key: kind.key(),
        })
    };
    let unsupported = || ConfigError::UnsupportedLiteral {
        path: path.to_owned(),
    };

    Ok(match kind {
        NodeKind::Equals => Expr::Equals {
            field: field()?,
            value: node
                .equals
                .as_ref()
                .and_then(Value::from_json)
                .ok_or_else(unsupported)?,
        },
        NodeKind::NotEquals => Expr::NotEquals {
            field: field()?,
            value: node
                .not_equals
                .as_ref()
                .and_then(Value::from_json)
                .ok_or_else(unsupported)?,
        },
        NodeKind::Includes => Expr::Includes {
            field: field()?,
            value: node
                .includes
                .as_ref()
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
                .ok_or_else(unsupported)?,
        },
        NodeKind::Numeric(op, threshold) => Expr::Numeric(NumericGuard {
            field: field()?,
            op,
            threshold,
        }),
        NodeKind::IsNumber(expected) => Expr::IsNumber {
            field: field()?,
            expected,
        },
        NodeKind::All => Expr::All(children(node.all.as_deref(), &format!("{path}.all"))?),
        NodeKind::Any => Expr::Any(children(node.any.as_deref(), &format!("{path}.any"))?),
        NodeKind::Ref => Expr::Ref(node.reference.clone().unwrap_or_default()),
    })
}

fn children(docs: Option<&[ConditionDoc]>, path: &str) -> Result<Vec<Expr>, ConfigError> {
    docs.unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, doc)| to_expr(doc, &format!("{path}[{i}]")))
        .collect()
}

// -- Reference resolution ---------------------------------------------------

struct Resolver<'a> {
    named: &'a HashMap<String, Condition>,
}

impl Resolver<'_> {
    fn condition(&self, doc: &ConditionDoc, path: &str) -> Result<Condition, ConfigError> {
        self.resolve(&to_expr(doc, path)?, path)
    }

    fn conditions(&self, docs: &[ConditionDoc], path: &str) -> Result<Vec<Condition>, ConfigError> {
        docs.iter()
            .enumerate()
            .map(|(i, doc)| self.condition(doc, &format!("{path}[{i}]")))
            .collect()
    }

    fn numeric(
        &self,
        doc: Option<&ConditionDoc>,
        path: &str,
    ) -> Result<Option<NumericGuard>, ConfigError> {
        doc.map(|doc| match self.condition(doc, path)? {
            Condition::Numeric(guard) => Ok(guard),
            _ => Err(ConfigError::NotNumericGuard {
                path: path.to_owned(),
            }),
        })
        .transpose()
    }

    fn resolve(&self, expr: &Expr, path: &str) -> Result<Condition, ConfigError> {
        resolve(expr, self.named, path)
    }
}

/// Substitute every reference with its resolved condition.
fn resolve(
    expr: &Expr,
    named: &HashMap<String, Condition>,
    path: &str,
) -> Result<Condition, ConfigError> {
    Ok(match expr {
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
        Expr::All(items) => Condition::All(
            items
                .iter()
                .map(|e| resolve(e, named, path))
                .collect::<Result<_, _>>()?,
        ),
        Expr::Any(items) => Condition::Any(
            items
                .iter()
                .map(|e| resolve(e, named, path))
                .collect::<Result<_, _>>()?,
        ),
        Expr::Ref(name) => {
            named
                .get(name)
                .cloned()
                .ok_or_else(|| ConfigError::UndefinedConditionRef {
                    path: path.to_owned(),
                    reference: name.clone(),
                })?
        }
    })
}

/// Parse and resolve the `conditions` map. Entries are resolved in
/// dependency order so each reference is substituted exactly once.
fn resolve_named(
    docs: &BTreeMap<String, ConditionDoc>,
) -> Result<HashMap<String, Condition>, ConfigError> {
    let exprs = docs
        .iter()
        .map(|(name, doc)| Ok((name.clone(), to_expr(doc, &format!("conditions.{name}"))?)))
        .collect::<Result<BTreeMap<String, Expr>, ConfigError>>()?;

    check_references(&exprs)?;
    let order = topological_sort(&exprs)?;

    let mut resolved = HashMap::with_capacity(order.len());
    for name in order {
        let condition = resolve(&exprs[&name], &resolved, &format!("conditions.{name}"))?;
        resolved.insert(name, condition);
    }
    Ok(resolved)
}

fn check_references(exprs: &BTreeMap<String, Expr>) -> Result<(), ConfigError> {
    for (name, expr) in exprs {
        if let Some(missing) = expr.references().into_iter().find(|r| !exprs.contains_key(*r)) {
            return Err(ConfigError::UndefinedConditionRef {
                path: format!("conditions.{name}"),
                reference: missing.to_owned(),
            });
        }
    }
    Ok(())
}

/// Kahn's algorithm for topological sort with cycle detection.
fn topological_sort(exprs: &BTreeMap<String, Expr>) -> Result<Vec<String>, ConfigError> {
    // dependents[X] = conditions that reference X (X must be resolved first)
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut in_degree: BTreeMap<&str, usize> =
        exprs.keys().map(|name| (name.as_str(), 0)).collect();

    for (name, expr) in exprs {
        for dep in expr.references() {
            dependents.entry(dep).or_default().push(name.as_str());
            *in_degree.entry(name.as_str()).or_insert(0) += 1;
        }
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(name, _)| *name)
        .collect();

    let mut sorted = Vec::with_capacity(exprs.len());

    while let Some(name) = queue.pop_front() {
        if let Some(deps) = dependents.get(name) {
            for &dependent in deps {
                if let Some(deg) = in_degree.get_mut(dependent) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }
        sorted.push(name.to_owned());
    }

    if sorted.len() != exprs.len() {
        return Err(ConfigError::CyclicConditionRef {
            cycle: find_cycle(exprs),
        });
    }

    Ok(sorted)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DfsState {
    Unvisited,
    InStack,
    Done,
}

/// DFS-based cycle finder for error reporting.
fn find_cycle(exprs: &BTreeMap<String, Expr>) -> Vec<String> {
    let adj: BTreeMap<&str, Vec<&str>> = exprs
        .iter()
        .map(|(name, expr)| (name.as_str(), expr.references()))
        .collect();

    let mut state: HashMap<&str, DfsState> = exprs
        .keys()
        .map(|name| (name.as_str(), DfsState::Unvisited))
        .collect();
    let mut stack: Vec<&str> = Vec::new();

    for name in exprs.keys() {
        if state.get(name.as_str()) == Some(&DfsState::Unvisited) {
            if let Some(cycle) = dfs(name, &adj, &mut state, &mut stack) {
                return cycle;
            }
        }
    }

    Vec::new()
}

fn dfs<'a>(
    node: &'a str,
    adj: &BTreeMap<&str, Vec<&'a str>>,
    state: &mut HashMap<&'a str, DfsState>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    state.insert(node, DfsState::InStack);
    stack.push(node);

    if let Some(neighbors) = adj.get(node) {
        for &neighbor in neighbors {
            match state.get(neighbor) {
                Some(DfsState::InStack) => {
                    let pos = stack.iter().position(|&n| n == neighbor)?;
                    let mut cycle: Vec<String> =
                        stack[pos..].iter().map(|&s| s.to_owned()).collect();
                    cycle.push(neighbor.to_owned());
                    return Some(cycle);
                }
                Some(DfsState::Unvisited) | None => {
                    if let Some(cycle) = dfs(neighbor, adj, state, stack) {
                        return Some(cycle);
                    }
                }
                Some(DfsState::Done) => {}
            }
        }
    }

    stack.pop();
    state.insert(node, DfsState::Done);
    None
}

// -- Structural checks ------------------------------------------------------

fn check_meta(meta: &Meta) -> Result<(), ConfigError> {
    if meta.confidence_bands.is_empty() {
        return Err(ConfigError::EmptyBandTable {
            table: "meta.confidenceByUnknowns",
        });
    }
    if meta.risk_bands.is_empty() {
        return Err(ConfigError::EmptyBandTable {
            table: "meta.riskBands",
        });
    }
    finite(meta.baseline_risk, "meta.defaults.baselineRisk")?;
    for (i, band) in meta.risk_bands.iter().enumerate() {
        finite(band.min, &format!("meta.riskBands[{i}].min"))?;
    }
    Ok(())
}

fn check_early_exits(rules: &[EarlyExitRule]) -> Result<(), ConfigError> {
    for (i, rule) in rules.iter().enumerate() {
        let path = format!("rulesInOrder[{i}]");
        check_conditions(&rule.when_all, &format!("{path}.whenAll"))?;
        check_determination(&rule.outcome.determination, &format!("{path}.outcome"))?;
        finite(rule.outcome.risk_score, &format!("{path}.outcome.riskScore"))?;
    }
    Ok(())
}

fn check_scoring(scoring: &Scoring) -> Result<(), ConfigError> {
    for (i, penalty) in scoring.unknown_penalties.iter().enumerate() {
        check_condition(&penalty.condition, &format!("scoring.unknownPenalties[{i}]"))?;
    }

    for (i, trigger) in scoring.high_risk_triggers.iter().enumerate() {
        let path = format!("scoring.highRiskTriggers[{i}]");
        if trigger.when_any.is_empty() {
            return Err(ConfigError::EmptyTriggerGuard { path });
        }
        check_conditions(&trigger.when_any, &format!("{path}.whenAny"))?;
        check_determination(&trigger.outcome.determination, &format!("{path}.outcome"))?;
    }

    for (i, trigger) in scoring.conditional_triggers.iter().enumerate() {
        let path = format!("scoring.conditionalTriggers[{i}]");
        check_conditions(&trigger.when_all, &format!("{path}.whenAll"))?;
        check_conditions(&trigger.when_any, &format!("{path}.whenAny"))?;
        check_guard(trigger.numeric.as_ref(), &format!("{path}.numeric"))?;
        check_determination(&trigger.outcome.determination, &format!("{path}.outcome"))?;
        if trigger.when_all.is_empty() && trigger.when_any.is_empty() && trigger.numeric.is_none()
        {
            warn!(trigger = %path, "conditional trigger has no guards and always fires");
        }
    }

    for (i, add) in scoring.lower_risk_adds.iter().enumerate() {
        let path = format!("scoring.lowerRiskAdds[{i}]");
        check_conditions(&add.when_all, &format!("{path}.whenAll"))?;
        check_guard(add.numeric.as_ref(), &format!("{path}.numeric"))?;
    }

    check_determination(
        &scoring.default_outcome.determination,
        "scoring.defaultOutcome",
    )
}

fn check_conditions(conditions: &[Condition], path: &str) -> Result<(), ConfigError> {
    for (i, condition) in conditions.iter().enumerate() {
        check_condition(condition, &format!("{path}[{i}]"))?;
    }
    Ok(())
}

fn check_condition(condition: &Condition, path: &str) -> Result<(), ConfigError> {
    match condition {
        Condition::Numeric(guard) => check_guard(Some(guard), path),
        Condition::All(items) => check_conditions(items, &format!("{path}.all")),
        Condition::Any(items) => check_conditions(items, &format!("{path}.any")),
        Condition::Equals { value, .. } | Condition::NotEquals { value, .. } => match value {
            Value::Number(n) => finite(*n, path),
            Value::Bool(_) | Value::String(_) => Ok(()),
        },
        Condition::Includes { .. } | Condition::IsNumber { .. } => Ok(()),
    }
}

fn check_guard(guard: Option<&NumericGuard>, path: &str) -> Result<(), ConfigError> {
    guard.map_or(Ok(()), |g| finite(g.threshold, path))
}

fn check_determination(determination: &str, path: &str) -> Result<(), ConfigError> {
    if determination.trim().is_empty() {
        return Err(ConfigError::MissingDetermination {
            path: path.to_owned(),
        });
    }
    Ok(())
}

fn finite(value: f64, path: &str) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFiniteNumber {
            path: path.to_owned(),
        })
    }
}
