//! Contract coverage across every registered agent pair.

use super::domain::AgentName;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Coverage state of one ordered agent pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    /// The source and target are the same agent.
    #[serde(rename = "self")]
    SelfPair,
    /// A contract governs handoffs for this pair.
    Covered,
    /// Distinct agents with no governing contract.
    Uncovered,
}

impl CoverageStatus {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelfPair => "self",
            Self::Covered => "covered",
            Self::Uncovered => "uncovered",
        }
    }
}

impl fmt::Display for CoverageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cell of the coverage matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageCell {
    /// Handing-off agent.
    pub source: AgentName,
    /// Receiving agent.
    pub target: AgentName,
    /// Coverage state.
    pub status: CoverageStatus,
}

/// Coverage status for every ordered pair of registered agents.
///
/// Cells are sorted by `(source, target)`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CoverageMatrix {
    agents: Vec<AgentName>,
    cells: Vec<CoverageCell>,
}

impl CoverageMatrix {
    /// Builds the matrix from sorted agent names and a coverage predicate.
    pub(crate) fn build(
        agents: Vec<AgentName>,
        is_covered: impl Fn(&AgentName, &AgentName) -> bool,
    ) -> Self {
        let mut cells = Vec::with_capacity(agents.len().saturating_mul(agents.len()));
        for source in &agents {
            for target in &agents {
                let status = if source == target {
                    CoverageStatus::SelfPair
                } else if is_covered(source, target) {
                    CoverageStatus::Covered
                } else {
                    CoverageStatus::Uncovered
                };
                cells.push(CoverageCell {
                    source: source.clone(),
                    target: target.clone(),
                    status,
                });
            }
        }
        Self { agents, cells }
    }

    /// Returns the agents on both axes, sorted.
    #[must_use]
    pub fn agents(&self) -> &[AgentName] {
        &self.agents
    }

    /// Returns every cell.
    #[must_use]
    pub fn cells(&self) -> &[CoverageCell] {
        &self.cells
    }

    /// Returns the status of `(source, target)`, or `None` when either agent
    /// is not registered.
    #[must_use]
    pub fn status(&self, source: &AgentName, target: &AgentName) -> Option<CoverageStatus> {
        self.cells
            .binary_search_by(|cell| match cell.source.cmp(source) {
                Ordering::Equal => cell.target.cmp(target),
                other => other,
            })
            .ok()
            .and_then(|index| self.cells.get(index))
            .map(|cell| cell.status)
    }

    /// Returns the pairs of distinct agents with no contract.
    pub fn uncovered_pairs(&self) -> impl Iterator<Item = (&AgentName, &AgentName)> {
        self.cells
            .iter()
            .filter(|cell| cell.status == CoverageStatus::Uncovered)
            .map(|cell| (&cell.source, &cell.target))
    }

    /// Returns the number of covered pairs.
    #[must_use]
    pub fn covered_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.status == CoverageStatus::Covered)
            .count()
    }
}
