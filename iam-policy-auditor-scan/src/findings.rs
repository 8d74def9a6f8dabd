//! Finding aggregation across a whole policy document
//!
//! Combines per-statement evaluations into a single deduplicated, sorted
//! result partitioned into risk categories. A policy with no unconstrained
//! modify actions yields no finding at all, never a zero-valued struct.

use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::ActionCatalog;
use crate::error::ScanResult;
use crate::evaluate::evaluate_statement;
use crate::exclusions::Exclusions;
use crate::policy::PolicyDocument;

/// A matched privilege-escalation combination. Serializes to
/// `{"type": <method>, "PrivilegeEscalation": [<action>, ...]}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PrivilegeEscalationMatch {
    #[serde(rename = "type")]
    pub method: String,
    #[serde(rename = "PrivilegeEscalation")]
    pub actions: Vec<String>,
}

/// The structured result of scanning one policy document.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Finding {
    #[serde(rename = "PolicyName")]
    pub policy_name: String,
    #[serde(rename = "Arn")]
    pub arn: String,
    /// Matched escalation combinations, first-seen order, deduplicated by
    /// exact (method, action-set) pair
    #[serde(rename = "PrivilegeEscalation")]
    pub privilege_escalation: Vec<PrivilegeEscalationMatch>,
    #[serde(rename = "DataExfiltrationActions")]
    pub data_exfiltration_actions: Vec<String>,
    /// Permissions-management actions; presented as "Resource Exposure"
    #[serde(rename = "PermissionsManagementActions")]
    pub permissions_management_actions: Vec<String>,
    /// All actions missing resource constraints, sorted and deduplicated
    #[serde(rename = "Actions")]
    pub actions: Vec<String>,
}

/// Scan a raw policy object for missing resource constraints.
///
/// Returns `Ok(None)` when the policy grants no unconstrained modify
/// actions; that is success-with-no-risk, not absence of data.
pub fn scan(
    policy_json: &Value,
    policy_name: &str,
    arn: &str,
    exclusions: &Exclusions,
) -> ScanResult<Option<Finding>> {
    let document = PolicyDocument::from_value(policy_json)?;
    Ok(scan_document(&document, policy_name, arn, exclusions))
}

/// Scan an already-parsed policy document.
pub fn scan_document(
    document: &PolicyDocument,
    policy_name: &str,
    arn: &str,
    exclusions: &Exclusions,
) -> Option<Finding> {
    scan_document_with_catalog(document, policy_name, arn, exclusions, ActionCatalog::shared())
}

/// Scan with an explicit catalog, for callers that inject their own
/// versioned action table.
pub fn scan_document_with_catalog(
    document: &PolicyDocument,
    policy_name: &str,
    arn: &str,
    exclusions: &Exclusions,
    catalog: &ActionCatalog,
) -> Option<Finding> {
    // IAM action names are case-insensitive, so the union keys on the
    // lowercased action; the first-seen spelling is kept for display.
    let mut missing: BTreeMap<String, String> = BTreeMap::new();
    let mut privilege_escalation: Vec<PrivilegeEscalationMatch> = Vec::new();
    let mut seen_escalations: HashSet<(String, Vec<String>)> = HashSet::new();

    for (index, statement) in document.statements.iter().enumerate() {
        log::debug!(
            "evaluating statement {} (sid {:?}) of policy {}",
            index,
            statement.sid,
            policy_name
        );
        let evaluation = evaluate_statement(statement, exclusions, catalog);
        for action in evaluation.missing_constraint_actions {
            missing
                .entry(action.to_ascii_lowercase())
                .or_insert(action);
        }
        for matched in evaluation.escalation_matches {
            let key = (matched.method.clone(), matched.actions.clone());
            if seen_escalations.insert(key) {
                privilege_escalation.push(matched);
            }
        }
    }

    if missing.is_empty() {
        return None;
    }

    // BTreeMap iteration yields the union sorted by normalized action
    // name, deduplicated and independent of statement order.
    let actions: Vec<String> = missing.into_values().collect();
    let permissions_management_actions = actions
        .iter()
        .filter(|action| catalog.is_permissions_management(action))
        .cloned()
        .collect();
    let data_exfiltration_actions = actions
        .iter()
        .filter(|action| catalog.is_data_exfiltration(action))
        .cloned()
        .collect();

    Some(Finding {
        policy_name: policy_name.to_string(),
        arn: arn.to_string(),
        privilege_escalation,
        data_exfiltration_actions,
        permissions_management_actions,
        actions,
    })
}

/// Scan many named policy documents in parallel. Each document scan is
/// independent; the shared exclusions and catalog are read-only.
pub fn scan_documents(
    policies: &[(String, PolicyDocument)],
    exclusions: &Exclusions,
) -> Vec<Finding> {
    policies
        .par_iter()
        .filter_map(|(name, document)| scan_document(document, name, name, exclusions))
        .collect()
}
