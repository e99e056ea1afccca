//! Diesel schema for audit persistence.

diesel::table! {
    /// Append-only audit entries, one per validated handoff.
    handoff_audit_entries (sequence_id) {
        /// Position in the audit log.
        sequence_id -> Int8,
        /// Handoff trace id.
        #[max_length = 100]
        trace_id -> Varchar,
        /// Handing-off agent.
        #[max_length = 100]
        source -> Varchar,
        /// Receiving agent.
        #[max_length = 100]
        target -> Varchar,
        /// Governing contract, if any.
        #[max_length = 100]
        contract -> Nullable<Varchar>,
        /// Required compliance scopes as a JSON array.
        compliance_scopes -> Jsonb,
        /// Effective enforcement mode.
        #[max_length = 20]
        mode -> Varchar,
        /// Verdict.
        #[max_length = 20]
        verdict -> Varchar,
        /// Whether the payload was withheld.
        blocked -> Bool,
        /// Violations as a JSON array.
        violations -> Jsonb,
        /// Stage timings.
        timings -> Jsonb,
        /// Masked payload.
        payload -> Jsonb,
        /// SHA-256 of the unmasked payload.
        #[max_length = 64]
        payload_hash -> Varchar,
        /// Masked caller metadata.
        metadata -> Jsonb,
        /// When the handoff was attempted.
        handoff_at -> Timestamptz,
        /// When the entry was sequenced.
        recorded_at -> Timestamptz,
    }
}
