//! Validación de punta a punta del pipeline sobre un backend simulado.
//!
//! Cada caso corre una ejecución completa y compara estado final, cadena de
//! borrado y notificaciones contra lo esperado.

use std::sync::Arc;

use forecast_adapters::pipeline::DELETION_CHAIN;
use forecast_adapters::{forecast_pipeline, Notification, PipelineConfig, QueuePublisher, Scenario, SimulatedInvoker};
use forecast_core::{ExecutionStatus, FlowEngine};
use log::info;
use serde_json::json;

use crate::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationCase {
    pub scenario: Scenario,
    pub perform_delete: bool,
    pub expected_status: ExecutionStatus,
    /// Cantidad de funciones de borrado invocadas.
    pub expected_deletes: usize,
    pub expected_notifications: usize,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub case: ValidationCase,
    pub status: ExecutionStatus,
    pub visited: Vec<String>,
    pub events: String,
    pub notifications: Vec<Notification>,
}

/// Casos: cada escenario con y sin borrado.
pub fn default_cases() -> Vec<ValidationCase> {
    let mut cases = Vec::new();
    for scenario in Scenario::ALL {
        for perform_delete in [false, true] {
            let (status, deletes) = match (scenario, perform_delete) {
                (_, false) => (ExecutionStatus::Succeeded, 0),
                (Scenario::DeletionFailed, true) => (ExecutionStatus::Failed, 2),
                (_, true) => (ExecutionStatus::Succeeded, DELETION_CHAIN.len()),
            };
            cases.push(ValidationCase { scenario,
                                        perform_delete,
                                        expected_status: status,
                                        expected_deletes: deletes,
                                        expected_notifications: 1 });
        }
    }
    cases
}

pub async fn run_case(case: ValidationCase, cfg: &PipelineConfig) -> Result<ValidationReport, AppError> {
    let invoker = Arc::new(SimulatedInvoker::for_scenario(case.scenario, cfg));
    let mut publisher = QueuePublisher::new();
    let mut rx = publisher.subscribe(16);
    let engine = FlowEngine::new(forecast_pipeline(invoker.clone(), Arc::new(publisher), cfg)?);

    let state = engine.execute(json!({ "PerformDelete": case.perform_delete, "DatasetName": "validation" }))
                      .await?;
    let mut notifications = Vec::new();
    while let Ok(n) = rx.try_recv() {
        notifications.push(n);
    }
    let deletes = DELETION_CHAIN.iter()
                                .map(|s| invoker.call_count(&cfg.function_name(s)))
                                .sum::<usize>();

    let report = ValidationReport { case,
                                    status: state.status(),
                                    visited: state.visited().iter().map(|s| s.to_string()).collect(),
                                    events: engine.event_variants(state.id()).join(""),
                                    notifications };
    let label = format!("{}/PerformDelete={}", case.scenario.as_str(), case.perform_delete);
    if report.status != case.expected_status {
        return Err(AppError::Validation(format!("{label}: status {:?}, expected {:?}",
                                                report.status, case.expected_status)));
    }
    if deletes != case.expected_deletes {
        return Err(AppError::Validation(format!("{label}: {deletes} deletions, expected {}", case.expected_deletes)));
    }
    if report.notifications.len() != case.expected_notifications {
        return Err(AppError::Validation(format!("{label}: {} notifications, expected {}",
                                                report.notifications.len(),
                                                case.expected_notifications)));
    }
    let summary = engine.replay(state.id());
    if summary.status != report.status {
        return Err(AppError::Validation(format!("{label}: replay status {:?} differs from {:?}",
                                                summary.status, report.status)));
    }
    info!("{label}: {:?} [{}]", report.status, report.events);
    Ok(report)
}

/// Corre todos los casos y valida la tabla de recursos.
pub async fn run_all(cfg: &PipelineConfig) -> Result<Vec<ValidationReport>, AppError> {
    let graph = forecast_pipeline(Arc::new(SimulatedInvoker::new()), Arc::new(forecast_adapters::LogPublisher), cfg)?;
    forecast_infra::validated_stack(cfg, graph.definition_hash())?;

    let mut reports = Vec::new();
    for case in default_cases() {
        reports.push(run_case(case, cfg).await?);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scenario_is_covered_with_and_without_delete() {
        let cases = default_cases();
        assert_eq!(cases.len(), Scenario::ALL.len() * 2);
        assert!(cases.iter()
                     .filter(|c| !c.perform_delete)
                     .all(|c| c.expected_deletes == 0 && c.expected_status == ExecutionStatus::Succeeded));
    }

    #[tokio::test(start_paused = true)]
    async fn deletion_failure_case_reports_failed_status() {
        let case = default_cases().into_iter()
                                  .find(|c| c.scenario == Scenario::DeletionFailed && c.perform_delete)
                                  .unwrap();
        let report = run_case(case, &PipelineConfig::default()).await.unwrap();
        assert_eq!(report.status, ExecutionStatus::Failed);
        assert!(report.events.ends_with('E'));
    }
}
