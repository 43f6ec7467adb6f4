//! forecast-adapters: el pipeline de forecasts sobre `forecast-core`.
//!
//! Este crate provee:
//! - `StepInvoker` y sus implementaciones (`HttpInvoker`, `SimulatedInvoker`)
//!   junto con la clasificación de errores remotos.
//! - Steps concretos: `RemoteStep` y `NotifyStep` con sus `Publisher`.
//! - `forecast_pipeline`: el grafo del pipeline con sus políticas.
//! - El adaptador de trigger y el supervisor de limpieza.
//! - `PipelineConfig` cargada desde el entorno.

pub mod cleanup;
pub mod config;
pub mod input;
pub mod invoker;
pub mod pipeline;
pub mod steps;
pub mod trigger;

pub use cleanup::{CleanupReport, CleanupSupervisor};
pub use config::{ConfigError, PipelineConfig};
pub use input::WorkflowInput;
pub use invoker::{classify_error, HttpInvoker, Scenario, SimulatedInvoker, StepInvoker};
pub use pipeline::forecast_pipeline;
pub use steps::{LogPublisher, Notification, NotifyStep, Publisher, QueuePublisher, RemoteStep};
pub use trigger::{TriggerAdapter, TriggerError, TriggerFilter};
