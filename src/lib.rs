//! forecast-mlops
//!
//! Librería raíz del workspace:
//! - Expone `errors` con el error de aplicación que agrupa a los crates.
//! - Re-exporta el motor (`engine`), las políticas, el pipeline (`adapters`) y
//!   la tabla de recursos (`infra`).
//! - `validation` corre escenarios simulados de punta a punta.

pub mod errors;
pub mod validation;

pub use errors::AppError;
pub use forecast_adapters as adapters;
pub use forecast_core as engine;
pub use forecast_infra as infra;
pub use forecast_policies as policies;
