//! Response Schema
//!
//! The contract a primary inference payload must satisfy before it becomes
//! an [`Identification`]. The same tree is rendered into the provider's
//! structured-output schema (so the model is constrained to it) and walked
//! by the validator (so nothing unchecked crosses into the data model).
//!
//! `mapData` is deliberately absent: it is filled in by the enrichment
//! stage, never by the model.

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::identification::Identification;

/// A node in the response schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    String,
    Boolean,
    Integer {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
    Array(Box<SchemaNode>),
    Object {
        properties: Vec<(&'static str, SchemaNode)>,
        required: Vec<&'static str>,
    },
}

impl SchemaNode {
    fn object(properties: Vec<(&'static str, SchemaNode)>, required: Vec<&'static str>) -> Self {
        Self::Object {
            properties,
            required,
        }
    }

    /// Object whose properties are all required.
    fn strict_object(properties: Vec<(&'static str, SchemaNode)>) -> Self {
        let required = properties.iter().map(|(name, _)| *name).collect();
        Self::object(properties, required)
    }

    fn type_name(&self) -> &'static str {
        match self {
            SchemaNode::String => "string",
            SchemaNode::Boolean => "boolean",
            SchemaNode::Integer { .. } => "integer",
            SchemaNode::Array(_) => "array",
            SchemaNode::Object { .. } => "object",
        }
    }

    /// Render as a structured-output schema (OpenAPI subset, upper-case types).
    pub fn to_json(&self) -> Value {
        match self {
            SchemaNode::String => json!({ "type": "STRING" }),
            SchemaNode::Boolean => json!({ "type": "BOOLEAN" }),
            SchemaNode::Integer { minimum, maximum } => {
                let mut node = json!({ "type": "INTEGER" });
                if let Some(min) = minimum {
                    node["minimum"] = json!(min);
                }
                if let Some(max) = maximum {
                    node["maximum"] = json!(max);
                }
                node
            }
            SchemaNode::Array(items) => json!({ "type": "ARRAY", "items": items.to_json() }),
            SchemaNode::Object {
                properties,
                required,
            } => {
                let mut props = Map::new();
                for (name, node) in properties {
                    props.insert((*name).to_string(), node.to_json());
                }
                let ordering: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
                json!({
                    "type": "OBJECT",
                    "properties": props,
                    "required": required,
                    "propertyOrdering": ordering,
                })
            }
        }
    }

    /// Collect every violation of this node by `value`, rooted at `path`.
    pub fn validate(&self, value: &Value) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();
        self.validate_at("", value, &mut violations);
        violations
    }

    fn validate_at(&self, path: &str, value: &Value, out: &mut Vec<SchemaViolation>) {
        match (self, value) {
            (SchemaNode::String, Value::String(_)) | (SchemaNode::Boolean, Value::Bool(_)) => {}
            (SchemaNode::Integer { minimum, maximum }, Value::Number(n)) => {
                let Some(v) = n.as_f64().filter(|v| v.fract() == 0.0) else {
                    out.push(SchemaViolation::new(path, format!("expected integer, got {}", n)));
                    return;
                };
                if let Some(min) = minimum {
                    if v < *min as f64 {
                        out.push(SchemaViolation::new(path, format!("{} is below minimum {}", v, min)));
                    }
                }
                if let Some(max) = maximum {
                    if v > *max as f64 {
                        out.push(SchemaViolation::new(path, format!("{} is above maximum {}", v, max)));
                    }
                }
            }
            (SchemaNode::Array(items), Value::Array(elements)) => {
                for (idx, element) in elements.iter().enumerate() {
                    items.validate_at(&format!("{}[{}]", path, idx), element, out);
                }
            }
            (
                SchemaNode::Object {
                    properties,
                    required,
                },
                Value::Object(fields),
            ) => {
                for name in required {
                    if !fields.contains_key(*name) {
                        out.push(SchemaViolation::new(
                            &join_path(path, name),
                            "missing required field",
                        ));
                    }
                }
                for (name, node) in properties {
                    match fields.get(*name) {
                        // An optional field sent as null is treated as absent.
                        Some(Value::Null) if !required.contains(name) => {}
                        Some(field) => node.validate_at(&join_path(path, name), field, out),
                        None => {}
                    }
                }
            }
            (node, other) => out.push(SchemaViolation::new(
                path,
                format!("expected {}, got {}", node.type_name(), json_type_name(other)),
            )),
        }
    }
}

fn join_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", parent, field)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The identification response schema (everything except `mapData`).
pub fn identification_schema() -> SchemaNode {
    use SchemaNode::{Boolean, String};

    SchemaNode::strict_object(vec![
        ("commonName", String),
        ("scientificName", String),
        ("family", String),
        ("description", String),
        (
            "careInstructions",
            SchemaNode::strict_object(vec![
                ("watering", String),
                ("sunlight", String),
                ("soil", String),
                ("fertilizer", String),
            ]),
        ),
        (
            "toxicity",
            SchemaNode::strict_object(vec![("isToxic", Boolean), ("details", String)]),
        ),
        (
            "healthStatus",
            SchemaNode::object(
                vec![
                    ("isHealthy", Boolean),
                    ("diagnosis", String),
                    ("treatment", String),
                    (
                        "healthScore",
                        SchemaNode::Integer {
                            minimum: Some(0),
                            maximum: Some(100),
                        },
                    ),
                ],
                vec!["isHealthy", "diagnosis", "healthScore"],
            ),
        ),
        (
            "isWeed",
            SchemaNode::strict_object(vec![("status", Boolean), ("reasoning", String)]),
        ),
        (
            "suggestedReminders",
            SchemaNode::Array(Box::new(SchemaNode::strict_object(vec![
                ("task", String),
                ("description", String),
                ("frequency", String),
            ]))),
        ),
    ])
}

/// One schema violation, addressed by dotted path (`healthStatus.healthScore`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub path: String,
    pub reason: String,
}

impl SchemaViolation {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        Self {
            path: if path.is_empty() { "$".to_string() } else { path.to_string() },
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Why a primary payload could not become an [`Identification`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("payload is empty")]
    Empty,

    #[error("payload is not valid JSON: {0}")]
    Syntax(String),

    #[error("payload violates the response schema: {}", join_violations(.0))]
    Schema(Vec<SchemaViolation>),
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Strip a markdown code fence if the model wrapped its JSON in one.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(after_fence) = trimmed.strip_prefix("```") {
        // Skip optional language identifier (e.g., "json"), which may sit
        // directly against the payload on a single line.
        let start = after_fence
            .find(|c| matches!(c, '\n' | '{' | '['))
            .unwrap_or(after_fence.len());
        let rest = &after_fence[start..];
        let content = rest.strip_prefix('\n').unwrap_or(rest);
        if let Some(end) = content.rfind("```") {
            return content[..end].trim();
        }
    }
    trimmed
}

/// Parse and validate a raw primary payload.
///
/// The returned identification never carries `map_data`, even if the model
/// volunteered one.
pub fn parse_identification(payload: &str) -> Result<Identification, ParseError> {
    let body = strip_code_fence(payload);
    if body.is_empty() {
        return Err(ParseError::Empty);
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| ParseError::Syntax(e.to_string()))?;

    let violations = identification_schema().validate(&value);
    if !violations.is_empty() {
        return Err(ParseError::Schema(violations));
    }

    let mut identification: Identification =
        serde_json::from_value(value).map_err(|e| ParseError::Syntax(e.to_string()))?;
    identification.map_data = None;
    Ok(identification)
}
