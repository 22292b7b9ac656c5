//! 十阶段写作工作流

pub mod guards;
pub mod machine;

pub use guards::{guard_for, GuardFailure, GuardResult};
pub use machine::{can_enter, StageReport, TransitionOutcome, WorkflowMachine};
