//! Audit records, filters and compliance reports.

mod entry;
mod query;
mod report;

pub use entry::{AuditDraft, AuditEntry, SequenceId, payload_hash};
pub use query::{AuditQuery, TimeRange};
pub use report::{ComplianceReport, PairStats, ReportError, RuleCount};
