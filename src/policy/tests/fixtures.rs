//! Handoff fixtures for policy tests.

use crate::policy::ports::PolicyContext;
use crate::registry::domain::{
    AgentIdentity, AgentName, AuthorityLevel, ContractName, FieldContract, HandoffContract,
};
use crate::validation::domain::{HandoffRecord, Metadata, TraceId};
use mockable::{Clock, DefaultClock};
use serde_json::Value;
use std::sync::Arc;

pub fn agent(name: &str) -> AgentName {
    AgentName::new(name).expect("valid agent name")
}

/// One handoff with everything a [`PolicyContext`] borrows.
pub struct Scenario {
    pub record: HandoffRecord,
    pub contract: Arc<HandoffContract>,
    pub source: AgentIdentity,
    pub target: AgentIdentity,
}

impl Scenario {
    /// `desk` -> `analyst` under a contract requiring `scopes`.
    pub fn new(scopes: &[&str], payload: Value) -> Self {
        Self::with_fields(scopes, Vec::new(), payload)
    }

    pub fn with_fields(scopes: &[&str], fields: Vec<FieldContract>, payload: Value) -> Self {
        let contract = Arc::new(
            HandoffContract::builder(
                ContractName::new("FIN-1").expect("valid contract name"),
                agent("desk"),
                agent("analyst"),
            )
            .require_scopes(scopes.iter().copied())
            .fields(fields)
            .build(),
        );
        let record = HandoffRecord::new(
            TraceId::generate(),
            agent("desk"),
            agent("analyst"),
            Some(Arc::clone(&contract)),
            payload,
            DefaultClock.utc(),
        );
        Self {
            record,
            contract,
            source: AgentIdentity::new(agent("desk"), AuthorityLevel::Execute),
            target: AgentIdentity::new(agent("analyst"), AuthorityLevel::ReadOnly),
        }
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.record = self
            .record
            .with_metadata(metadata.as_object().cloned().unwrap_or_else(Metadata::new));
        self
    }

    pub fn target(mut self, target: AgentIdentity) -> Self {
        self.target = target;
        self
    }

    pub fn context(&self) -> PolicyContext<'_> {
        PolicyContext {
            record: &self.record,
            contract: &self.contract,
            source: Some(&self.source),
            target: Some(&self.target),
        }
    }
}
