use normgate_canonical::{RuleCode, RuleVersion};
use normgate_core::{CoreError, LogicType, Rule, RuleContent, Severity};
use std::sync::LazyLock;

use crate::error::LayoutError;

/// Required margin on every side, in inches.
pub const REQUIRED_MARGIN: f64 = 1.0;

/// Accepted deviation from [`REQUIRED_MARGIN`], in inches.
pub const MARGIN_TOLERANCE: f64 = 0.01;

/// Required line spacing multiplier.
pub const REQUIRED_LINE_SPACING: f64 = 2.0;

/// Version shared by every rule in the table.
pub const RULE_VERSION: &str = "7.0.0";

/// Accepted fonts with their required size in points.
pub const VALID_FONTS: [(&str, f64); 4] = [
    ("Times New Roman", 12.0),
    ("Calibri", 11.0),
    ("Arial", 11.0),
    ("Georgia", 11.0),
];

/// Page side of a margin rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginSide {
    /// Top margin.
    Top,
    /// Bottom margin.
    Bottom,
    /// Left margin.
    Left,
    /// Right margin.
    Right,
}

impl MarginSide {
    /// Name of the fact holding this margin.
    pub fn fact(self) -> &'static str {
        match self {
            MarginSide::Top => "margin_top",
            MarginSide::Bottom => "margin_bottom",
            MarginSide::Left => "margin_left",
            MarginSide::Right => "margin_right",
        }
    }
}

/// The comparison a rule performs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Check {
    /// Margin within tolerance of [`REQUIRED_MARGIN`].
    Margin(MarginSide),
    /// Font is one of [`VALID_FONTS`].
    FontValid,
    /// Font size equals the size required for this font.
    FontSize {
        /// Font the rule applies to.
        font: &'static str,
        /// Required size in points.
        size: f64,
    },
    /// Line spacing equals [`REQUIRED_LINE_SPACING`].
    LineSpacing,
    /// Page numbering is present.
    PageNumbering,
}

impl Check {
    /// Name of the fact the check reads.
    pub fn fact(&self) -> &'static str {
        match self {
            Check::Margin(side) => side.fact(),
            Check::FontValid => "font_name",
            Check::FontSize { .. } => "font_size",
            Check::LineSpacing => "line_spacing",
            Check::PageNumbering => "page_numbering",
        }
    }
}

/// A content-addressed rule paired with the check that evaluates it.
#[derive(Debug, Clone)]
pub struct LayoutRule {
    /// The rule record.
    pub rule: Rule,
    /// Its comparison.
    pub check: Check,
}

struct RuleDef {
    code: &'static str,
    description: &'static str,
    consequent: &'static str,
    check: Check,
}

const RULE_DEFS: [RuleDef; 11] = [
    RuleDef {
        code: "APA7-MARGIN-TOP",
        description: "Top margin must be exactly 1 inch",
        consequent: "margin_top within 0.01 in of 1.0 in",
        check: Check::Margin(MarginSide::Top),
    },
    RuleDef {
        code: "APA7-MARGIN-BOTTOM",
        description: "Bottom margin must be exactly 1 inch",
        consequent: "margin_bottom within 0.01 in of 1.0 in",
        check: Check::Margin(MarginSide::Bottom),
    },
    RuleDef {
        code: "APA7-MARGIN-LEFT",
        description: "Left margin must be exactly 1 inch",
        consequent: "margin_left within 0.01 in of 1.0 in",
        check: Check::Margin(MarginSide::Left),
    },
    RuleDef {
        code: "APA7-MARGIN-RIGHT",
        description: "Right margin must be exactly 1 inch",
        consequent: "margin_right within 0.01 in of 1.0 in",
        check: Check::Margin(MarginSide::Right),
    },
    RuleDef {
        code: "APA7-FONT-VALID",
        description: "Font must be Times New Roman, Calibri, Arial, or Georgia",
        consequent: "font_name is an accepted font",
        check: Check::FontValid,
    },
    RuleDef {
        code: "APA7-FONT-SIZE-TNR",
        description: "Times New Roman must be 12pt",
        consequent: "font_size equals 12.0 pt",
        check: Check::FontSize {
            font: "Times New Roman",
            size: 12.0,
        },
    },
    RuleDef {
        code: "APA7-FONT-SIZE-CALIBRI",
        description: "Calibri must be 11pt",
        consequent: "font_size equals 11.0 pt",
        check: Check::FontSize {
            font: "Calibri",
            size: 11.0,
        },
    },
    RuleDef {
        code: "APA7-FONT-SIZE-ARIAL",
        description: "Arial must be 11pt",
        consequent: "font_size equals 11.0 pt",
        check: Check::FontSize {
            font: "Arial",
            size: 11.0,
        },
    },
    RuleDef {
        code: "APA7-FONT-SIZE-GEORGIA",
        description: "Georgia must be 11pt",
        consequent: "font_size equals 11.0 pt",
        check: Check::FontSize {
            font: "Georgia",
            size: 11.0,
        },
    },
    RuleDef {
        code: "APA7-LINE-SPACING",
        description: "Line spacing must be double (2.0)",
        consequent: "line_spacing equals 2.0",
        check: Check::LineSpacing,
    },
    RuleDef {
        code: "APA7-PAGE-NUMBERING",
        description: "Page numbering must be present",
        consequent: "page_numbering is true",
        check: Check::PageNumbering,
    },
];

fn build(def: &RuleDef) -> Result<LayoutRule, CoreError> {
    let condition = match def.check {
        Check::FontSize { font, .. } => Some(format!("font_name is {}", font)),
        _ => None,
    };
    let rule = Rule::new(RuleContent {
        code: RuleCode::parse(def.code)?,
        version: RuleVersion::parse(RULE_VERSION)?,
        description: def.description.to_string(),
        logic_type: LogicType::Binary,
        condition,
        consequent: def.consequent.to_string(),
        evidence_field: format!("layout.{}", def.check.fact()),
        severity: Severity::Error,
    })?;
    Ok(LayoutRule {
        rule,
        check: def.check,
    })
}

static RULE_TABLE: LazyLock<Result<Vec<LayoutRule>, String>> = LazyLock::new(|| {
    RULE_DEFS
        .iter()
        .map(build)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())
});

/// The layout rule table, in evaluation order. Built once, never mutated.
pub fn rule_table() -> Result<&'static [LayoutRule], LayoutError> {
    RULE_TABLE
        .as_ref()
        .map(Vec::as_slice)
        .map_err(|e| LayoutError::RuleTable(e.clone()))
}

/// Looks up a rule by code.
pub fn find_rule(code: &str) -> Result<&'static LayoutRule, LayoutError> {
    rule_table()?
        .iter()
        .find(|r| r.rule.code().as_str() == code)
        .ok_or_else(|| LayoutError::UnknownRule(code.to_string()))
}

/// Required size for an accepted font.
pub fn required_font_size(font: &str) -> Option<f64> {
    VALID_FONTS
        .iter()
        .find(|(name, _)| *name == font)
        .map(|(_, size)| *size)
}
