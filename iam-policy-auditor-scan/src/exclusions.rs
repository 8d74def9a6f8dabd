//! Exclusions: the user-supplied allow-list suppressing known-acceptable
//! findings
//!
//! Built once per scan run from a YAML or JSON configuration object and
//! shared read-only across every statement evaluation. Resource patterns
//! use explicit `*` segment matching rather than regular expressions so
//! the matching semantics stay predictable and auditable.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use crate::catalog::ReferenceData;
use crate::error::{ScanError, ScanResult};
use crate::policy::Statement;

/// Recognized configuration keys. Absent keys default to empty sets;
/// unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExclusionsConfig {
    #[serde(default, rename = "exclude-actions")]
    pub actions: Vec<String>,
    #[serde(default, rename = "exclude-resource-arns")]
    pub resource_arns: Vec<String>,
    #[serde(default, rename = "exclude-policy-names")]
    pub policy_names: Vec<String>,
}

/// Resolved exclusion filter consumed by every classification step.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    actions: HashSet<String>,
    resource_arns: Vec<String>,
    policy_names: Vec<String>,
}

impl Exclusions {
    pub fn new(config: ExclusionsConfig) -> Self {
        Self {
            actions: config
                .actions
                .into_iter()
                .map(|a| a.to_ascii_lowercase())
                .collect(),
            resource_arns: config
                .resource_arns
                .into_iter()
                .map(|r| r.to_ascii_lowercase())
                .collect(),
            policy_names: config
                .policy_names
                .into_iter()
                .map(|n| n.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Build exclusions from a parsed JSON configuration object.
    pub fn from_value(value: &Value) -> ScanResult<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        let config: ExclusionsConfig = serde_json::from_value(value.clone())
            .map_err(|e| ScanError::configuration(e.to_string()))?;
        Ok(Self::new(config))
    }

    /// Build exclusions from YAML configuration text.
    pub fn from_yaml_str(text: &str) -> ScanResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ExclusionsConfig =
            serde_yaml::from_str(text).map_err(|e| ScanError::configuration(e.to_string()))?;
        Ok(Self::new(config))
    }

    /// The embedded default exclusions, used when no configuration file is
    /// supplied.
    pub fn default_exclusions() -> ScanResult<Self> {
        let data = ReferenceData::fetch("default-exclusions.yml")?;
        let text = std::str::from_utf8(&data).map_err(|e| {
            ScanError::configuration(format!("default exclusions are not UTF-8: {}", e))
        })?;
        Self::from_yaml_str(text)
    }

    /// Whether the action is excluded from the scan entirely.
    pub fn is_excluded_action(&self, action: &str) -> bool {
        self.actions.contains(&action.to_ascii_lowercase())
    }

    /// Whether the resource matches an excluded resource pattern.
    pub fn is_excluded_resource(&self, resource: &str) -> bool {
        let lowered = resource.to_ascii_lowercase();
        self.resource_arns
            .iter()
            .any(|pattern| wildcard_match(pattern, &lowered))
    }

    /// Whether the policy name matches an excluded policy-name pattern.
    /// Useful for callers iterating over many policies; never consulted
    /// during statement classification.
    pub fn is_excluded_policy_name(&self, policy_name: &str) -> bool {
        let lowered = policy_name.to_ascii_lowercase();
        self.policy_names
            .iter()
            .any(|pattern| wildcard_match(pattern, &lowered))
    }

    /// True when every resource on the statement is either a concrete
    /// (non-wildcard) ARN or matches an excluded-resource pattern; false as
    /// soon as the bare wildcard `"*"` appears without being excluded.
    pub fn has_sufficient_resource_constraint(&self, statement: &Statement) -> bool {
        statement
            .resources
            .iter()
            .all(|resource| resource != "*" || self.is_excluded_resource(resource))
    }
}

/// Glob-style matching with explicit prefix/suffix/segment semantics:
/// the text before the first `*` must anchor the start, the text after the
/// last `*` must anchor the end, and intermediate segments must appear in
/// order between them.
fn wildcard_match(pattern: &str, value: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == value;
    }
    let parts: Vec<&str> = pattern.split('*').collect();
    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !value.starts_with(first) || !value.ends_with(last) {
        return false;
    }
    if value.len() < first.len() + last.len() {
        return false;
    }
    let mut remainder = &value[first.len()..value.len() - last.len()];
    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match remainder.find(part) {
            Some(position) => remainder = &remainder[position + part.len()..],
            None => return false,
        }
    }
    true
}
