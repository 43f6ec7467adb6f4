//! forecast-core: motor de workflows con retry/catch, rama condicional y
//! registro de eventos append-only.
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod graph;
pub mod hashing;
pub mod injection;
pub mod model;
pub mod policy;
pub mod repo;
pub mod step;

pub use engine::{AbortHandle, ExecutionHandle, FlowEngine};
pub use errors::{CoreEngineError, StepError};
pub use event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore};
pub use graph::{ChoiceState, Edge, GraphBuilder, Predicate, ResultPath, StateNode, TaskState, WorkflowGraph};
pub use model::{ExecutionState, ExecutionStatus, HistoryEntry};
pub use policy::{CatchRule, ErrorMatcher, RetryRule, TaskOutcome};
pub use repo::{ExecutionSummary, FlowRepository, InMemoryFlowRepository};
pub use step::{StepDefinition, StepKind};
