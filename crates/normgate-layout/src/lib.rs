//! Page layout conformance for APA 7th edition documents.
//!
//! The module is a pure chain: [`extract_facts`] copies named layout fields
//! out of `context.meta["layout"]`, [`evaluate`] compares them against the
//! static [`rule_table`], and [`layout_stage`] wraps both as a blocking
//! pipeline stage. Every evaluated rule yields exactly one verdict backed by
//! one evidence record.
//!
#![deny(missing_docs)]

/// Layout error types.
pub mod error;
/// Rule evaluation.
pub mod evaluate;
/// Fact extraction.
pub mod facts;
/// The static rule table.
pub mod rules;
/// Pipeline stage wrapper.
pub mod stage;

pub use error::{LayoutError, TECHNICAL_ERROR_PREFIX};
pub use evaluate::{evaluate, Comparison, LayoutEvaluation, RuleOutcome};
pub use facts::{extract_facts, Fact, LayoutFacts};
pub use rules::{
    find_rule, required_font_size, rule_table, Check, LayoutRule, MarginSide, MARGIN_TOLERANCE,
    REQUIRED_LINE_SPACING, REQUIRED_MARGIN, RULE_VERSION, VALID_FONTS,
};
pub use stage::{check_layout, layout_stage};
