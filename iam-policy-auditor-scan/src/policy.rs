//! IAM policy document model
//!
//! Parses a raw policy object conforming to the IAM policy JSON grammar
//! (`Version`, `Statement` as object-or-array, string-or-array `Action`
//! and `Resource` fields) into an immutable [`PolicyDocument`].

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ScanError, ScanResult};

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

/// A single parsed policy statement. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct Statement {
    /// Optional statement identifier; not used in classification
    pub sid: Option<String>,
    pub effect: Effect,
    /// Action strings with their input casing preserved; comparisons
    /// against the catalog and exclusions are case-insensitive
    pub actions: Vec<String>,
    /// Resource ARNs or `"*"`
    pub resources: Vec<String>,
}

/// A parsed policy document. Statement order is preserved from input.
#[derive(Debug, Clone)]
pub struct PolicyDocument {
    pub statements: Vec<Statement>,
}

/// IAM allows several fields to be either a string or an array of strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawStatement {
    #[serde(rename = "Sid")]
    sid: Option<String>,
    #[serde(rename = "Effect")]
    effect: Option<String>,
    #[serde(rename = "Action")]
    action: Option<OneOrMany>,
    #[serde(rename = "NotAction")]
    not_action: Option<OneOrMany>,
    #[serde(rename = "Resource")]
    resource: Option<OneOrMany>,
    #[serde(rename = "NotResource")]
    not_resource: Option<OneOrMany>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatementField {
    One(Box<RawStatement>),
    Many(Vec<RawStatement>),
}

#[derive(Debug, Deserialize)]
struct RawPolicy {
    #[serde(rename = "Version")]
    _version: Option<String>,
    #[serde(rename = "Statement")]
    statement: StatementField,
}

impl PolicyDocument {
    /// Parse a policy document from a JSON value.
    ///
    /// Fails with [`ScanError::Parse`] when the object does not conform to
    /// the IAM policy grammar; either every statement parses completely or
    /// the whole construction fails.
    pub fn from_value(value: &Value) -> ScanResult<Self> {
        let raw: RawPolicy = serde_json::from_value(value.clone())
            .map_err(|e| ScanError::parse(e.to_string()))?;
        let raw_statements = match raw.statement {
            StatementField::One(statement) => vec![*statement],
            StatementField::Many(statements) => statements,
        };
        let statements = raw_statements
            .into_iter()
            .enumerate()
            .map(|(index, raw)| convert_statement(index, raw))
            .collect::<ScanResult<Vec<_>>>()?;
        Ok(Self { statements })
    }

    /// Parse a policy document from JSON text.
    pub fn from_json_str(text: &str) -> ScanResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ScanError::parse(e.to_string()))?;
        Self::from_value(&value)
    }
}

fn convert_statement(index: usize, raw: RawStatement) -> ScanResult<Statement> {
    let label = raw
        .sid
        .clone()
        .unwrap_or_else(|| format!("statement {}", index));

    let effect = match raw.effect.as_deref() {
        Some("Allow") => Effect::Allow,
        Some("Deny") => Effect::Deny,
        Some(other) => {
            return Err(ScanError::parse(format!(
                "{}: invalid Effect {:?}",
                label, other
            )))
        }
        None => return Err(ScanError::parse(format!("{}: missing Effect", label))),
    };

    // NotAction/NotResource are out of scope for classification: the catalog
    // is not a complete action enumeration, so the complement set cannot be
    // computed. Such statements parse but contribute nothing.
    let actions = match (raw.action, raw.not_action) {
        (Some(action), _) => action.into_vec(),
        (None, Some(_)) => {
            log::warn!("{}: NotAction is not evaluated, skipping", label);
            Vec::new()
        }
        (None, None) => {
            return Err(ScanError::parse(format!("{}: missing Action", label)));
        }
    };

    let resources = match (raw.resource, raw.not_resource) {
        (Some(resource), _) => resource.into_vec(),
        (None, Some(_)) => {
            log::warn!("{}: NotResource is not evaluated, skipping", label);
            Vec::new()
        }
        (None, None) => {
            return Err(ScanError::parse(format!("{}: missing Resource", label)));
        }
    };

    Ok(Statement {
        sid: raw.sid,
        effect,
        actions,
        resources,
    })
}
