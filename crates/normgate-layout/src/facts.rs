use normgate_kernel::PipelineContext;
use serde_json::{Map, Value};

use crate::error::LayoutError;

/// A measured value, or an explicit marker that the document did not report it.
#[derive(Debug, Clone, PartialEq)]
pub enum Fact<T> {
    /// The value as reported.
    Present(T),
    /// Missing or `null`.
    Absent,
}

impl<T> Fact<T> {
    /// The value, if present.
    pub fn present(&self) -> Option<&T> {
        match self {
            Fact::Present(value) => Some(value),
            Fact::Absent => None,
        }
    }
}

impl Fact<f64> {
    /// JSON form; `null` when absent.
    pub fn to_value(&self) -> Value {
        match self {
            Fact::Present(value) => serde_json::json!(value),
            Fact::Absent => Value::Null,
        }
    }
}

impl Fact<String> {
    /// JSON form; `null` when absent.
    pub fn to_value(&self) -> Value {
        match self {
            Fact::Present(value) => Value::String(value.clone()),
            Fact::Absent => Value::Null,
        }
    }
}

impl Fact<bool> {
    /// JSON form; `null` when absent.
    pub fn to_value(&self) -> Value {
        match self {
            Fact::Present(value) => Value::Bool(*value),
            Fact::Absent => Value::Null,
        }
    }
}

/// Layout properties of one document. Margins in inches, font size in points.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutFacts {
    /// Top margin.
    pub margin_top: Fact<f64>,
    /// Bottom margin.
    pub margin_bottom: Fact<f64>,
    /// Left margin.
    pub margin_left: Fact<f64>,
    /// Right margin.
    pub margin_right: Fact<f64>,
    /// Body font family.
    pub font_name: Fact<String>,
    /// Body font size.
    pub font_size: Fact<f64>,
    /// Line spacing multiplier.
    pub line_spacing: Fact<f64>,
    /// Whether pages are numbered.
    pub page_numbering: Fact<bool>,
}

impl LayoutFacts {
    /// Every fact absent.
    pub fn absent() -> Self {
        Self {
            margin_top: Fact::Absent,
            margin_bottom: Fact::Absent,
            margin_left: Fact::Absent,
            margin_right: Fact::Absent,
            font_name: Fact::Absent,
            font_size: Fact::Absent,
            line_spacing: Fact::Absent,
            page_numbering: Fact::Absent,
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn number(layout: &Map<String, Value>, fact: &'static str) -> Result<Fact<f64>, LayoutError> {
    match layout.get(fact) {
        None | Some(Value::Null) => Ok(Fact::Absent),
        Some(value) => value
            .as_f64()
            .map(Fact::Present)
            .ok_or(LayoutError::WrongType {
                fact,
                expected: "number",
                found: type_name(value),
            }),
    }
}

fn text(layout: &Map<String, Value>, fact: &'static str) -> Result<Fact<String>, LayoutError> {
    match layout.get(fact) {
        None | Some(Value::Null) => Ok(Fact::Absent),
        Some(Value::String(value)) => Ok(Fact::Present(value.clone())),
        Some(value) => Err(LayoutError::WrongType {
            fact,
            expected: "string",
            found: type_name(value),
        }),
    }
}

fn flag(layout: &Map<String, Value>, fact: &'static str) -> Result<Fact<bool>, LayoutError> {
    match layout.get(fact) {
        None | Some(Value::Null) => Ok(Fact::Absent),
        Some(Value::Bool(value)) => Ok(Fact::Present(*value)),
        Some(value) => Err(LayoutError::WrongType {
            fact,
            expected: "boolean",
            found: type_name(value),
        }),
    }
}

/// Copies the layout facts out of the `layout` block.
///
/// The block is read from the attached snapshot's extracted fields, so
/// verdicts carrying its id describe its own facts; without a snapshot it
/// comes from `context.meta["layout"]`. No interpretation happens here:
/// values are taken as reported, and missing or `null` entries become
/// [`Fact::Absent`]. A missing `layout` block yields all-absent facts.
pub fn extract_facts(context: &PipelineContext) -> Result<LayoutFacts, LayoutError> {
    let snapshot = context.snapshot().transpose()?;
    let fields = match &snapshot {
        Some(snapshot) => snapshot.extracted_fields(),
        None => context.meta(),
    };
    let layout = match fields.get("layout") {
        None | Some(Value::Null) => return Ok(LayoutFacts::absent()),
        Some(Value::Object(layout)) => layout,
        Some(other) => {
            return Err(LayoutError::NotAnObject {
                found: type_name(other),
            })
        }
    };

    Ok(LayoutFacts {
        margin_top: number(layout, "margin_top")?,
        margin_bottom: number(layout, "margin_bottom")?,
        margin_left: number(layout, "margin_left")?,
        margin_right: number(layout, "margin_right")?,
        font_name: text(layout, "font_name")?,
        font_size: number(layout, "font_size")?,
        line_spacing: number(layout, "line_spacing")?,
        page_numbering: flag(layout, "page_numbering")?,
    })
}
