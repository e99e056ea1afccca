//! Values produced and consumed by the validation pipeline.

mod evidence;
mod number;
mod record;
mod result;
mod rule;
mod severity;
mod stage;
mod violation;

pub use evidence::Evidence;
pub use number::numeric_value;
pub use record::{HandoffRecord, InvalidTraceId, Metadata, TraceId};
pub use result::{StageTimings, ValidationResult, Verdict};
pub use rule::{Rule, rules};
pub use severity::Severity;
pub use stage::ValidationStage;
pub use violation::{Violation, ViolationOrigin};
