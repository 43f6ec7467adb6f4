//! Definiciones relacionadas a Steps.
//!
//! Un Step es una unidad de trabajo remota y opaca: recibe un objeto JSON y
//! devuelve un objeto JSON o un `StepError` clasificado. Este módulo define:
//! - `StepDefinition`: interfaz neutral usada por el engine.
//! - `StepInvocation`: registro de un intento concreto.
//! - `StepExecutor`: una invocación remota por intento, con timeout opcional.

pub mod definition;
pub mod executor;
mod invocation;

pub use definition::{StepDefinition, StepKind};
pub use executor::StepExecutor;
pub use invocation::StepInvocation;
