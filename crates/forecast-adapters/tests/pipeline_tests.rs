use std::sync::Arc;

use forecast_adapters::pipeline::{BRANCH_ON_DELETE_FLAG, CREATE_PREDICTOR, DELETE_FORECAST, DELETE_IMPORT_JOB,
                                  DELETE_PREDICTOR, FAILED, IMPORT_DATA, NOTIFY_SUCCESS, SUCCEED};
use forecast_adapters::{forecast_pipeline, Notification, PipelineConfig, QueuePublisher, Scenario, SimulatedInvoker};
use forecast_core::{ExecutionState, ExecutionStatus, FlowEngine};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;

struct Run {
    state: ExecutionState,
    invoker: Arc<SimulatedInvoker>,
    notifications: Vec<Notification>,
    retries: u32,
}

async fn run(scenario: Scenario, perform_delete: bool) -> Run {
    let cfg = PipelineConfig::default();
    let invoker = Arc::new(SimulatedInvoker::for_scenario(scenario, &cfg));
    let mut publisher = QueuePublisher::new();
    let mut rx: mpsc::Receiver<Notification> = publisher.subscribe(16);
    let graph = forecast_pipeline(invoker.clone(), Arc::new(publisher), &cfg).unwrap();
    let engine = FlowEngine::new(graph);

    let state = engine.execute(json!({"PerformDelete": perform_delete, "DatasetName": "sales"})).await.unwrap();
    let retries = engine.replay(state.id()).retries;
    let mut notifications = Vec::new();
    while let Ok(n) = rx.try_recv() {
        notifications.push(n);
    }
    Run { state,
          invoker,
          notifications,
          retries }
}

#[tokio::test(start_paused = true)]
async fn happy_path_without_delete() {
    let r = run(Scenario::Happy, false).await;
    assert_eq!(r.state.status(), ExecutionStatus::Succeeded);
    assert_eq!(r.notifications.len(), 1);
    assert!(r.notifications[0].subject.contains("completed"));
    assert!(r.invoker.calls().iter().all(|c| !c.starts_with("Delete")));
    assert_eq!(r.state.visited().last(), Some(&SUCCEED));
}

#[tokio::test(start_paused = true)]
async fn happy_path_with_delete_runs_chain_in_order() {
    let r = run(Scenario::Happy, true).await;
    assert_eq!(r.state.status(), ExecutionStatus::Succeeded);
    let deletes: Vec<String> = r.invoker.calls().into_iter().filter(|c| c.starts_with("Delete")).collect();
    assert_eq!(deletes, vec![DELETE_FORECAST, DELETE_PREDICTOR, DELETE_IMPORT_JOB]);
}

#[tokio::test(start_paused = true)]
async fn pending_import_is_polled_until_ready() {
    let r = run(Scenario::SlowImport, false).await;
    assert_eq!(r.state.status(), ExecutionStatus::Succeeded);
    assert_eq!(r.invoker.call_count(IMPORT_DATA), 4);
    assert_eq!(r.retries, 3);
}

#[tokio::test(start_paused = true)]
async fn predictor_failure_notifies_once_and_still_cleans_up() {
    let r = run(Scenario::PredictorFailed, true).await;
    assert_eq!(r.state.status(), ExecutionStatus::Succeeded);
    assert_eq!(r.notifications.len(), 1);
    assert!(r.notifications[0].subject.contains("failed"));
    assert!(r.notifications[0].message.starts_with("ResourceFailedException"));

    let visited = r.state.visited();
    let failed_at = visited.iter().position(|s| *s == FAILED).unwrap();
    assert_eq!(visited[failed_at - 1], CREATE_PREDICTOR);
    assert_eq!(visited[failed_at + 1], BRANCH_ON_DELETE_FLAG);
    assert!(!visited.contains(&NOTIFY_SUCCESS));
    assert_eq!(r.invoker.call_count(DELETE_IMPORT_JOB), 1);
}

#[tokio::test(start_paused = true)]
async fn predictor_failure_without_delete_skips_chain() {
    let r = run(Scenario::PredictorFailed, false).await;
    assert_eq!(r.state.status(), ExecutionStatus::Succeeded);
    assert_eq!(r.notifications.len(), 1);
    assert_eq!(r.invoker.call_count(DELETE_FORECAST), 0);
}

#[tokio::test(start_paused = true)]
async fn deletion_failure_is_fatal_without_notification() {
    let r = run(Scenario::DeletionFailed, true).await;
    assert_eq!(r.state.status(), ExecutionStatus::Failed);
    assert_eq!(r.state.current(), Some(DELETE_PREDICTOR));
    // sólo la notificación de éxito previa a la rama
    assert_eq!(r.notifications.len(), 1);
    assert!(r.notifications[0].subject.contains("completed"));
    assert_eq!(r.invoker.call_count(DELETE_IMPORT_JOB), 0);
}

#[tokio::test(start_paused = true)]
async fn full_notification_queue_still_reaches_the_delete_branch() {
    let cfg = PipelineConfig::default();
    let mut publisher = QueuePublisher::new();
    let mut rx = publisher.subscribe(1);
    let publisher = Arc::new(publisher);

    let mut outcomes = Vec::new();
    for _ in 0..2 {
        let invoker = Arc::new(SimulatedInvoker::for_scenario(Scenario::PredictorFailed, &cfg));
        let engine = FlowEngine::new(forecast_pipeline(invoker.clone(), publisher.clone(), &cfg).unwrap());
        let state = tokio::time::timeout(Duration::from_secs(3600),
                                         engine.execute(json!({"PerformDelete": true, "DatasetName": "sales"})))
                    .await
                    .expect("execution blocked on the notification queue")
                    .unwrap();
        outcomes.push((state, invoker));
    }

    // la cola sólo recibió la primera notificación
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());

    let (second, invoker) = &outcomes[1];
    assert_eq!(second.status(), ExecutionStatus::Succeeded);
    let visited = second.visited();
    let failed_at = visited.iter().position(|s| *s == FAILED).unwrap();
    assert_eq!(visited[failed_at + 1], BRANCH_ON_DELETE_FLAG);
    assert_eq!(invoker.call_count(DELETE_IMPORT_JOB), 1);
    for (state, invoker) in &outcomes {
        assert_eq!(state.status(), ExecutionStatus::Succeeded);
        assert_eq!(invoker.call_count(DELETE_FORECAST), 1);
    }
}
