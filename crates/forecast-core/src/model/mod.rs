//! Modelos de ejecución (ExecutionState, historial, estado terminal).

mod execution;

pub use execution::{ExecutionState, ExecutionStatus, HistoryEntry};
