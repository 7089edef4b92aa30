pub mod collection;
pub mod executor;
pub mod reporter;
pub mod types;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

pub use collection::CollectionRunner;
pub use executor::{RequestExecutor, resolve_options};
pub use reporter::Reporter;
pub use types::{
    CollectionRunResult, ExecutionOutcome, RequestRunResult, ScopeInputs, StepRunResult,
    WorkflowRunResult,
};
pub use workflow::WorkflowEngine;
