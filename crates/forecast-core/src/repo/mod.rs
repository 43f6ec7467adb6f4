mod types;

pub use types::{ExecutionSummary, FlowRepository, InMemoryFlowRepository};
