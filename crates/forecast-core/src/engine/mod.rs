//! Engine: executor de ejecuciones sobre un `WorkflowGraph`.
//!
//! Cada ejecución es una máquina de estados secuencial; ejecuciones
//! distintas no comparten estado mutable (sólo las stores append-only).

mod abort;
pub mod core;

pub use abort::AbortHandle;
pub use self::core::{ExecutionHandle, FlowEngine};
