use normgate_canonical::{default_canonicalizer, hash_value, Digest, RuleCode};
use normgate_core::{json_type_name, Evidence, EvidenceContent, Verdict, VerdictResult};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::LayoutError;
use crate::facts::{Fact, LayoutFacts};
use crate::rules::{
    required_font_size, rule_table, Check, LayoutRule, MarginSide, MARGIN_TOLERANCE,
    REQUIRED_LINE_SPACING, REQUIRED_MARGIN, VALID_FONTS,
};

/// Expected and actual value of one check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// Required value.
    pub expected: Value,
    /// Reported value; `null` when absent.
    pub actual: Value,
    /// Whether the check held.
    #[serde(rename = "match")]
    pub matched: bool,
}

/// Everything one evaluated rule produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    /// Rule code.
    pub rule_code: RuleCode,
    /// Fact the rule read.
    pub fact: &'static str,
    /// The comparison performed.
    pub comparison: Comparison,
    /// The single evidence record.
    pub evidence: Evidence,
    /// The verdict.
    pub verdict: Verdict,
}

impl RuleOutcome {
    /// Report entry for this rule.
    pub fn report(&self) -> Value {
        json!({
            "rule_code": self.rule_code,
            "verdict_id": self.verdict.verdict_id(),
            "result": self.verdict.result(),
            "severity": self.verdict.severity(),
            "blocking": self.verdict.severity().is_blocking(),
            "reasoning": self.verdict.reasoning(),
            "evidence": [{
                "evidence_id": self.evidence.evidence_id(),
                "fact_name": self.fact,
                "expected_value": self.comparison.expected,
                "actual_value": self.comparison.actual,
                "match": self.comparison.matched,
            }],
        })
    }
}

/// Ordered outcomes of one layout evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEvaluation {
    outcomes: Vec<RuleOutcome>,
}

impl LayoutEvaluation {
    /// Outcomes in rule table order.
    pub fn outcomes(&self) -> &[RuleOutcome] {
        &self.outcomes
    }

    /// Verdicts in rule table order.
    pub fn verdicts(&self) -> Vec<Verdict> {
        self.outcomes.iter().map(|o| o.verdict.clone()).collect()
    }

    /// Evidence in rule table order.
    pub fn evidence(&self) -> Vec<Evidence> {
        self.outcomes.iter().map(|o| o.evidence.clone()).collect()
    }

    /// True when every verdict passed.
    pub fn ok(&self) -> bool {
        self.failed_rules() == 0
    }

    /// Number of rules evaluated.
    pub fn total_rules(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of passing rules.
    pub fn passed_rules(&self) -> usize {
        self.total_rules() - self.failed_rules()
    }

    /// Number of failing rules.
    pub fn failed_rules(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.verdict.result() == VerdictResult::Fail)
            .count()
    }

    /// Ordered report list.
    pub fn report(&self) -> Value {
        Value::Array(self.outcomes.iter().map(RuleOutcome::report).collect())
    }

    /// Content hash of [`report`](Self::report); equal inputs give equal hashes.
    pub fn verdict_hash(&self) -> Result<Digest, LayoutError> {
        Ok(hash_value(&self.report(), default_canonicalizer())?)
    }
}

fn margin(facts: &LayoutFacts, side: MarginSide) -> &Fact<f64> {
    match side {
        MarginSide::Top => &facts.margin_top,
        MarginSide::Bottom => &facts.margin_bottom,
        MarginSide::Left => &facts.margin_left,
        MarginSide::Right => &facts.margin_right,
    }
}

/// Runs the comparison for `check`, or `None` when the rule does not apply.
fn compare(check: Check, facts: &LayoutFacts) -> Option<Comparison> {
    let comparison = match check {
        Check::Margin(side) => {
            let fact = margin(facts, side);
            Comparison {
                expected: json!(REQUIRED_MARGIN),
                actual: fact.to_value(),
                matched: fact
                    .present()
                    .is_some_and(|v| (v - REQUIRED_MARGIN).abs() <= MARGIN_TOLERANCE),
            }
        }
        Check::FontValid => Comparison {
            expected: json!(VALID_FONTS.iter().map(|(name, _)| *name).collect::<Vec<_>>()),
            actual: facts.font_name.to_value(),
            matched: facts
                .font_name
                .present()
                .is_some_and(|name| required_font_size(name).is_some()),
        },
        Check::FontSize { font, size } => {
            if facts.font_name.present().map(String::as_str) != Some(font) {
                return None;
            }
            Comparison {
                expected: json!(size),
                actual: facts.font_size.to_value(),
                matched: facts.font_size.present() == Some(&size),
            }
        }
        Check::LineSpacing => Comparison {
            expected: json!(REQUIRED_LINE_SPACING),
            actual: facts.line_spacing.to_value(),
            matched: facts.line_spacing.present() == Some(&REQUIRED_LINE_SPACING),
        },
        Check::PageNumbering => Comparison {
            expected: json!(true),
            actual: facts.page_numbering.to_value(),
            matched: facts.page_numbering.present() == Some(&true),
        },
    };
    Some(comparison)
}

fn reasoning(entry: &LayoutRule, comparison: &Comparison) -> String {
    let fact = entry.check.fact();
    let actual = match &comparison.actual {
        Value::Null => "absent".to_string(),
        other => other.to_string(),
    };
    if comparison.matched {
        format!("{} is {}; {}", fact, actual, entry.rule.description())
    } else {
        format!(
            "{} is {}, expected {}; {}",
            fact,
            actual,
            comparison.expected,
            entry.rule.description()
        )
    }
}

fn outcome(
    entry: &LayoutRule,
    comparison: Comparison,
    subject: &Digest,
) -> Result<RuleOutcome, LayoutError> {
    let fact = entry.check.fact();
    let evidence = Evidence::new(EvidenceContent {
        field_path: format!("layout.{}", fact),
        value_type: json_type_name(&comparison.actual).to_string(),
        extracted_value: comparison.actual.clone(),
        confidence: 1.0,
        source_context: None,
    })?;
    let verdict = Verdict::for_rule(
        &entry.rule,
        subject,
        VerdictResult::from_bool(comparison.matched),
        std::slice::from_ref(&evidence),
        reasoning(entry, &comparison),
    )?;
    Ok(RuleOutcome {
        rule_code: entry.rule.code().clone(),
        fact,
        comparison,
        evidence,
        verdict,
    })
}

/// Evaluates the rule table against `facts` for the audited `subject`.
///
/// Only the size rule of the declared font runs, so a valid font yields
/// eight outcomes and anything else yields seven. An absent fact fails its
/// rule.
pub fn evaluate(facts: &LayoutFacts, subject: &Digest) -> Result<LayoutEvaluation, LayoutError> {
    let mut outcomes = Vec::new();
    for entry in rule_table()? {
        if let Some(comparison) = compare(entry.check, facts) {
            outcomes.push(outcome(entry, comparison, subject)?);
        }
    }
    Ok(LayoutEvaluation { outcomes })
}
