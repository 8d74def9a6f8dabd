//! This crate provides the core risk-evaluation engine for IAM Policy Auditor:
//! - Policy document model (IAM policy JSON grammar)
//! - Action catalog and privilege-escalation method table (embedded data)
//! - Exclusions filtering
//! - Per-statement evaluation and finding aggregation
//!
//! The core is purely computational: no I/O, no shared mutable state. The
//! catalog and exclusions are read-only after construction, so independent
//! policy scans can run in parallel without coordination.

mod catalog;
mod error;
mod evaluate;
mod exclusions;
mod findings;
mod policy;

// Re-exports for a small, focused public API
pub use catalog::{ActionCatalog, EscalationMethod};
pub use error::{ScanError, ScanResult};
pub use exclusions::{Exclusions, ExclusionsConfig};
pub use findings::{
    scan, scan_document, scan_document_with_catalog, scan_documents, Finding,
    PrivilegeEscalationMatch,
};
pub use policy::{Effect, PolicyDocument, Statement};
