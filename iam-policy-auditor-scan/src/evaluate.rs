//! Per-statement risk evaluation
//!
//! For a single statement: the subset of its modify actions that lack a
//! resource constraint after exclusions, and any privilege-escalation
//! action combinations the statement completes on its own.

use std::collections::{BTreeSet, HashSet};

use crate::catalog::ActionCatalog;
use crate::exclusions::Exclusions;
use crate::findings::PrivilegeEscalationMatch;
use crate::policy::{Effect, Statement};

/// One statement's contribution to a policy scan. Empty results are valid,
/// non-error outcomes.
#[derive(Debug, Default)]
pub(crate) struct StatementEvaluation {
    pub(crate) missing_constraint_actions: BTreeSet<String>,
    pub(crate) escalation_matches: Vec<PrivilegeEscalationMatch>,
}

pub(crate) fn evaluate_statement(
    statement: &Statement,
    exclusions: &Exclusions,
    catalog: &ActionCatalog,
) -> StatementEvaluation {
    let mut evaluation = StatementEvaluation::default();

    // Deny statements cannot grant access.
    if statement.effect != Effect::Allow {
        return evaluation;
    }

    if !exclusions.has_sufficient_resource_constraint(statement) {
        for action in &statement.actions {
            if exclusions.is_excluded_action(action) {
                continue;
            }
            if !catalog.is_modify_action(action) {
                continue;
            }
            evaluation
                .missing_constraint_actions
                .insert(action.clone());
        }
    }

    // Privilege escalation is matched against the statement's own action
    // set only; combinations are never merged across statements. The check
    // is independent of the resource-constraint filter.
    let granted: HashSet<String> = statement
        .actions
        .iter()
        .map(|a| a.to_ascii_lowercase())
        .collect();
    for method in catalog.escalation_methods() {
        let complete = !method.requires.is_empty()
            && method
                .requires
                .iter()
                .all(|required| granted.contains(&required.to_ascii_lowercase()));
        if complete {
            evaluation.escalation_matches.push(PrivilegeEscalationMatch {
                method: method.name.clone(),
                actions: method.requires.clone(),
            });
        }
    }

    evaluation
}
