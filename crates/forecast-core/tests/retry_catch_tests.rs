mod common;

use std::time::Duration;

use common::{failed, pending, ScriptedStep};
use forecast_core::{CatchRule, ExecutionStatus, FlowEngine, GraphBuilder, RetryRule, StepError, TaskState};
use serde_json::json;

fn job_polling() -> RetryRule {
    RetryRule::new(["ResourcePendingException"]).with_interval(Duration::from_secs(1))
                                                 .with_backoff_rate(1.5)
                                                 .with_max_attempts(100)
}

#[tokio::test(start_paused = true)]
async fn retry_waits_follow_backoff_sequence_then_succeed() {
    let import = ScriptedStep::scripted("import",
                                        vec![Err(pending()),
                                             Err(pending()),
                                             Err(pending()),
                                             Ok(json!({"ImportJobArn": "arn:import"}))]);
    let graph = GraphBuilder::new().start_at("ImportData")
                                   .task("ImportData", TaskState::new(import.clone()).retry(job_polling()).next("Done"))
                                   .succeed("Done")
                                   .build()
                                   .unwrap();
    let engine = FlowEngine::new(graph);
    let state = engine.execute(json!({"PerformDelete": false})).await.unwrap();

    assert_eq!(state.status(), ExecutionStatus::Succeeded);
    assert_eq!(import.call_count(), 4);
    assert_eq!(import.gaps_ms(), vec![1000, 1500, 2250]);
    assert_eq!(state.payload(), &json!({"ImportJobArn": "arn:import"}));

    let variants = engine.event_variants(state.id());
    assert_eq!(variants, vec!["I", "S", "R", "S", "R", "S", "R", "S", "F", "C"]);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_fall_through_to_catch() {
    let step = ScriptedStep::always("predictor", pending(), 10);
    let notify = ScriptedStep::ok("notify");
    let graph = GraphBuilder::new().start_at("CreatePredictor")
                                   .task("CreatePredictor",
                                         TaskState::new(step.clone()).retry(RetryRule::new(["ResourcePendingException"]).with_max_attempts(2))
                                                                     .catch(CatchRule::new(["ResourcePendingException"], "Failed").with_result_path("serviceError"))
                                                                     .next("Done"))
                                   .task("Failed", TaskState::new(notify.clone()).next("Done"))
                                   .succeed("Done")
                                   .build()
                                   .unwrap();
    let engine = FlowEngine::new(graph);
    let state = engine.execute(json!({"DatasetName": "d"})).await.unwrap();

    // primera llamada + 2 reintentos
    assert_eq!(step.call_count(), 3);
    assert_eq!(state.status(), ExecutionStatus::Succeeded);
    assert_eq!(state.visited(), vec!["CreatePredictor", "Failed", "Done"]);
    let received = &notify.payloads()[0];
    assert_eq!(received["DatasetName"], json!("d"));
    assert_eq!(received["serviceError"]["Error"], json!("ResourcePendingException"));

    let summary = engine.replay(state.id());
    assert_eq!(summary.retries, 2);
    assert_eq!(summary.attempts["CreatePredictor"], 3);
}

#[tokio::test(start_paused = true)]
async fn first_matching_catch_rule_wins() {
    let step = ScriptedStep::scripted("dataset", vec![Err(failed())]);
    let graph = GraphBuilder::new().start_at("CreateDataset")
                                   .task("CreateDataset",
                                         TaskState::new(step).catch(CatchRule::new(["ResourceFailedException"], "Done").with_result_path("specific"))
                                                             .catch(CatchRule::all("Done").with_result_path("generic"))
                                                             .next("Done"))
                                   .succeed("Done")
                                   .build()
                                   .unwrap();
    let engine = FlowEngine::new(graph);
    let state = engine.execute(json!({})).await.unwrap();

    assert_eq!(state.status(), ExecutionStatus::Succeeded);
    assert!(state.payload().get("specific").is_some());
    assert!(state.payload().get("generic").is_none());
}

#[tokio::test(start_paused = true)]
async fn unclassified_error_only_matches_catch_all() {
    let step = ScriptedStep::scripted("update", vec![Err(StepError::unclassified("boom"))]);
    let graph = GraphBuilder::new().start_at("UpdateResources")
                                   .task("UpdateResources",
                                         TaskState::new(step).retry(RetryRule::new(["ResourcePendingException"]))
                                                             .catch(CatchRule::new(["ResourceFailedException"], "Done").with_result_path("specific"))
                                                             .catch(CatchRule::all("Done").with_result_path("generic"))
                                                             .next("Done"))
                                   .succeed("Done")
                                   .build()
                                   .unwrap();
    let engine = FlowEngine::new(graph);
    let state = engine.execute(json!({})).await.unwrap();

    assert!(state.payload().get("specific").is_none());
    assert_eq!(state.payload()["generic"]["Error"], json!("States.Unclassified"));
    // sin reintentos: retry sólo aplica a errores transitorios
    assert!(!engine.event_variants(state.id()).contains(&"R"));
}

#[tokio::test(start_paused = true)]
async fn uncaught_error_fails_execution() {
    let step = ScriptedStep::always("delete", failed(), 1);
    let graph = GraphBuilder::new().start_at("DeleteForecast")
                                   .task("DeleteForecast", TaskState::new(step).next("Done"))
                                   .succeed("Done")
                                   .build()
                                   .unwrap();
    let engine = FlowEngine::new(graph);
    let state = engine.execute(json!({})).await.unwrap();

    assert_eq!(state.status(), ExecutionStatus::Failed);
    assert_eq!(state.error(), Some(&failed()));
    assert_eq!(engine.event_variants(state.id()).last(), Some(&"E"));
    assert!(engine.archived(state.id()).is_some());
}

#[tokio::test(start_paused = true)]
async fn step_timeout_surfaces_as_unclassified() {
    #[derive(Debug)]
    struct Hang;

    #[async_trait::async_trait]
    impl forecast_core::StepDefinition for Hang {
        fn id(&self) -> &str {
            "hang"
        }

        fn kind(&self) -> forecast_core::StepKind {
            forecast_core::StepKind::Publish
        }

        async fn invoke(&self, _payload: serde_json::Value) -> Result<serde_json::Value, StepError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(json!({}))
        }
    }

    let graph = GraphBuilder::new().start_at("UpdateResources")
                                   .task("UpdateResources",
                                         TaskState::new(std::sync::Arc::new(Hang)).timeout(Duration::from_secs(30))
                                                                                  .catch(CatchRule::all("Done").with_result_path("serviceError"))
                                                                                  .next("Done"))
                                   .succeed("Done")
                                   .build()
                                   .unwrap();
    let engine = FlowEngine::new(graph);
    let state = engine.execute(json!({})).await.unwrap();
    assert_eq!(state.payload()["serviceError"]["Error"], json!("States.Timeout"));
}
