//! Motor de Retry/Catch.
//!
//! Las políticas con nombre (job-polling, deletion-polling) son sólo
//! instancias de `RetryRule`; no hay rutas de código separadas para ellas.

mod catch;
mod engine;
mod matcher;
mod retry;

pub use catch::CatchRule;
pub use engine::{RetryCatchEngine, TaskOutcome};
pub use matcher::ErrorMatcher;
pub use retry::RetryRule;
