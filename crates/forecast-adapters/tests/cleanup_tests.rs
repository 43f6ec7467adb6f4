use std::sync::Arc;
use std::time::Duration;

use forecast_adapters::{forecast_pipeline, CleanupSupervisor, LogPublisher, PipelineConfig, Scenario, SimulatedInvoker};
use forecast_core::{ExecutionStatus, FlowEngine};
use serde_json::json;

#[tokio::test(start_paused = true)]
async fn aborted_execution_gets_best_effort_cleanup() {
    let cfg = PipelineConfig::default();
    let invoker = Arc::new(SimulatedInvoker::for_scenario(Scenario::SlowImport, &cfg));
    let graph = forecast_pipeline(invoker.clone(), Arc::new(LogPublisher), &cfg).unwrap();
    let engine = Arc::new(FlowEngine::new(graph));
    let supervisor = CleanupSupervisor::new(invoker.clone(), &cfg);

    let handle = engine.spawn(json!({"PerformDelete": false}));
    let abort = handle.abort.clone();
    let supervised = tokio::spawn(async move { supervisor.supervise(handle).await });

    // ImportData está esperando su primer backoff (1 s)
    tokio::time::sleep(Duration::from_millis(500)).await;
    abort.abort();

    let (state, report) = supervised.await.unwrap().unwrap();
    assert_eq!(state.status(), ExecutionStatus::Aborted);
    let report = report.unwrap();
    assert_eq!(report.attempted.len(), 3);
    assert!(report.is_clean());
    assert_eq!(invoker.call_count("DeleteForecast"), 1);
}

#[tokio::test(start_paused = true)]
async fn succeeded_execution_needs_no_cleanup() {
    let cfg = PipelineConfig::default();
    let invoker = Arc::new(SimulatedInvoker::new());
    let graph = forecast_pipeline(invoker.clone(), Arc::new(LogPublisher), &cfg).unwrap();
    let engine = Arc::new(FlowEngine::new(graph));
    let supervisor = CleanupSupervisor::new(invoker.clone(), &cfg);

    let (state, report) = supervisor.supervise(engine.spawn(json!({"PerformDelete": false}))).await.unwrap();
    assert_eq!(state.status(), ExecutionStatus::Succeeded);
    assert!(report.is_none());
    assert_eq!(invoker.call_count("DeleteForecast"), 0);
}
