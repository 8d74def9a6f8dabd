//! Embedded IAM action reference data
//!
//! The action catalog classifies IAM actions into risk categories and
//! "modify" vs. read-only verb classes, and carries the table of known
//! privilege-escalation action combinations. The data ships as JSON
//! documents embedded into the binary at compile time; a custom catalog
//! version can be loaded from raw bytes instead.

use std::collections::HashSet;
use std::sync::OnceLock;

use rust_embed::RustEmbed;
use serde::Deserialize;

use crate::error::{ScanError, ScanResult};

/// Embedded reference data: action catalog, escalation methods, and the
/// default exclusions file.
#[derive(RustEmbed)]
#[folder = "data"]
#[include = "*.json"]
#[include = "*.yml"]
pub(crate) struct ReferenceData;

impl ReferenceData {
    /// Fetch an embedded file or fail with a configuration error naming it.
    pub(crate) fn fetch(name: &str) -> ScanResult<Vec<u8>> {
        Self::get(name)
            .map(|file| file.data.to_vec())
            .ok_or_else(|| ScanError::configuration(format!("{} is not embedded", name)))
    }
}

/// A named combination of IAM actions that together allow a principal to
/// gain additional permissions.
#[derive(Debug, Clone, Deserialize)]
pub struct EscalationMethod {
    /// Method name, e.g. `PassExistingRoleToNewEc2Instance`
    pub name: String,
    /// Actions that must all be granted by a single statement
    pub requires: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    read_only_verb_prefixes: Vec<String>,
    permissions_management_actions: Vec<String>,
    data_exfiltration_actions: Vec<String>,
}

/// Static lookup table classifying IAM actions.
///
/// All lookups are case-insensitive; keys are normalized to lower case at
/// construction. The catalog is read-only after construction and safe to
/// share across concurrent scans.
#[derive(Debug)]
pub struct ActionCatalog {
    read_only_verb_prefixes: Vec<String>,
    permissions_management: HashSet<String>,
    data_exfiltration: HashSet<String>,
    escalation_methods: Vec<EscalationMethod>,
}

static CATALOG: OnceLock<ActionCatalog> = OnceLock::new();

impl ActionCatalog {
    /// The process-wide catalog built from the embedded reference data.
    pub fn shared() -> &'static Self {
        CATALOG.get_or_init(|| {
            Self::from_embedded().expect("embedded action catalog data is valid")
        })
    }

    /// Build the catalog from the embedded JSON documents.
    pub fn from_embedded() -> ScanResult<Self> {
        let catalog = ReferenceData::fetch("action-catalog.json")?;
        let methods = ReferenceData::fetch("escalation-methods.json")?;
        Self::from_slices(&catalog, &methods)
    }

    /// Build a catalog from raw JSON bytes, for callers that ship their own
    /// versioned table.
    pub fn from_slices(catalog_json: &[u8], methods_json: &[u8]) -> ScanResult<Self> {
        let raw: RawCatalog = serde_json::from_slice(catalog_json)
            .map_err(|e| ScanError::configuration(format!("action catalog: {}", e)))?;
        let escalation_methods: Vec<EscalationMethod> = serde_json::from_slice(methods_json)
            .map_err(|e| ScanError::configuration(format!("escalation methods: {}", e)))?;

        Ok(Self {
            read_only_verb_prefixes: lowercase_all(raw.read_only_verb_prefixes),
            permissions_management: lowercase_set(raw.permissions_management_actions),
            data_exfiltration: lowercase_set(raw.data_exfiltration_actions),
            escalation_methods,
        })
    }

    /// Whether the action is capable of changing state.
    ///
    /// Actions listed in a sensitive category always count as modify:
    /// the data-exfiltration reads (`s3:GetObject` and friends) are
    /// risk-relevant despite their read-only verbs. Unknown actions fall
    /// back to the read-only verb-prefix rule.
    pub fn is_modify_action(&self, action: &str) -> bool {
        let lowered = action.to_ascii_lowercase();
        if self.permissions_management.contains(&lowered)
            || self.data_exfiltration.contains(&lowered)
        {
            return true;
        }
        let verb = lowered.split(':').nth(1).unwrap_or(lowered.as_str());
        !self
            .read_only_verb_prefixes
            .iter()
            .any(|prefix| verb.starts_with(prefix.as_str()))
    }

    /// Whether the action grants or alters access to a resource
    /// (reported as "Resource Exposure").
    pub fn is_permissions_management(&self, action: &str) -> bool {
        self.permissions_management
            .contains(&action.to_ascii_lowercase())
    }

    /// Whether the action can read sensitive data out of the account.
    pub fn is_data_exfiltration(&self, action: &str) -> bool {
        self.data_exfiltration
            .contains(&action.to_ascii_lowercase())
    }

    /// The known privilege-escalation action combinations.
    pub fn escalation_methods(&self) -> &[EscalationMethod] {
        &self.escalation_methods
    }
}

fn lowercase_all(values: Vec<String>) -> Vec<String> {
    values.into_iter().map(|v| v.to_ascii_lowercase()).collect()
}

fn lowercase_set(values: Vec<String>) -> HashSet<String> {
    values.into_iter().map(|v| v.to_ascii_lowercase()).collect()
}
