mod common;

use std::sync::Arc;

use common::{failed, ScriptedStep};
use forecast_core::{CatchRule, ChoiceState, ExecutionStatus, FlowEngine, GraphBuilder, Predicate, RetryRule, TaskState,
                    WorkflowGraph};
use serde_json::json;

struct Steps {
    create: Arc<ScriptedStep>,
    notify_ok: Arc<ScriptedStep>,
    notify_failed: Arc<ScriptedStep>,
    delete_a: Arc<ScriptedStep>,
    delete_b: Arc<ScriptedStep>,
}

fn pipeline(create: Arc<ScriptedStep>, delete_a: Arc<ScriptedStep>) -> (WorkflowGraph, Steps) {
    let steps = Steps { create,
                        notify_ok: ScriptedStep::ok("notify_ok"),
                        notify_failed: ScriptedStep::ok("notify_failed"),
                        delete_a,
                        delete_b: ScriptedStep::ok("delete_b") };
    let graph = GraphBuilder::new().start_at("Create")
                                   .task("Create",
                                         TaskState::new(steps.create.clone()).catch(CatchRule::all("Failed").with_result_path("serviceError"))
                                                                             .next("NotifySuccess"))
                                   .task("NotifySuccess",
                                         TaskState::new(steps.notify_ok.clone()).catch(CatchRule::all("Failed").with_result_path("serviceError"))
                                                                                .next("BranchOnDeleteFlag"))
                                   .task("Failed",
                                         TaskState::new(steps.notify_failed.clone()).catch(CatchRule::all("BranchOnDeleteFlag"))
                                                                                    .next("BranchOnDeleteFlag"))
                                   .choice("BranchOnDeleteFlag",
                                           ChoiceState::new(Predicate::boolean_equals("PerformDelete", true), "DeleteA", "Done"))
                                   .task("DeleteA", TaskState::new(steps.delete_a.clone()).retry(RetryRule::new(["ResourcePendingException"])).next("DeleteB"))
                                   .task("DeleteB", TaskState::new(steps.delete_b.clone()).next("Done"))
                                   .succeed("Done")
                                   .build()
                                   .unwrap();
    (graph, steps)
}

#[tokio::test(start_paused = true)]
async fn perform_delete_false_skips_deletion_chain() {
    let (graph, steps) = pipeline(ScriptedStep::ok("create"), ScriptedStep::ok("delete_a"));
    let engine = FlowEngine::new(graph);
    let state = engine.execute(json!({"PerformDelete": false})).await.unwrap();

    assert_eq!(state.status(), ExecutionStatus::Succeeded);
    assert_eq!(steps.delete_a.call_count(), 0);
    assert_eq!(steps.delete_b.call_count(), 0);
    assert_eq!(state.visited(), vec!["Create", "NotifySuccess", "BranchOnDeleteFlag", "Done"]);
}

#[tokio::test(start_paused = true)]
async fn missing_delete_flag_is_false() {
    let (graph, steps) = pipeline(ScriptedStep::ok("create"), ScriptedStep::ok("delete_a"));
    let engine = FlowEngine::new(graph);
    let state = engine.execute(json!({"PerformDelete": "yes"})).await.unwrap();

    assert_eq!(state.status(), ExecutionStatus::Succeeded);
    assert_eq!(steps.delete_a.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn perform_delete_true_runs_deletions_in_order() {
    let (graph, steps) = pipeline(ScriptedStep::ok("create"), ScriptedStep::ok("delete_a"));
    let engine = FlowEngine::new(graph);
    let state = engine.execute(json!({"PerformDelete": true})).await.unwrap();

    assert_eq!(state.status(), ExecutionStatus::Succeeded);
    assert_eq!(state.visited(),
               vec!["Create", "NotifySuccess", "BranchOnDeleteFlag", "DeleteA", "DeleteB", "Done"]);
    assert_eq!(steps.delete_a.call_count(), 1);
    assert_eq!(steps.delete_b.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn terminal_failure_before_branch_notifies_once_then_branches_on_original_flag() {
    let (graph, steps) = pipeline(ScriptedStep::scripted("create", vec![Err(failed())]), ScriptedStep::ok("delete_a"));
    let engine = FlowEngine::new(graph);
    let state = engine.execute(json!({"PerformDelete": true})).await.unwrap();

    assert_eq!(steps.notify_failed.call_count(), 1);
    assert_eq!(steps.notify_ok.call_count(), 0);
    assert_eq!(steps.notify_failed.payloads()[0]["serviceError"]["Error"], json!("ResourceFailedException"));
    // la rama lee el input original aunque el payload haya cambiado
    assert_eq!(state.visited(), vec!["Create", "Failed", "BranchOnDeleteFlag", "DeleteA", "DeleteB", "Done"]);
    assert_eq!(state.status(), ExecutionStatus::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn failure_inside_deletion_chain_is_fatal_without_notification() {
    let (graph, steps) = pipeline(ScriptedStep::ok("create"), ScriptedStep::scripted("delete_a", vec![Err(failed())]));
    let engine = FlowEngine::new(graph);
    let state = engine.execute(json!({"PerformDelete": true})).await.unwrap();

    assert_eq!(state.status(), ExecutionStatus::Failed);
    assert_eq!(state.current(), Some("DeleteA"));
    assert_eq!(steps.notify_failed.call_count(), 0);
    assert_eq!(steps.delete_b.call_count(), 0);
}
