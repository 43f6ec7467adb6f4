//! Grafo del pipeline de entrenamiento y publicación de forecasts.
//!
//! `CreateDataset → CreateDatasetGroup → ImportData → CreatePredictor →
//! CreateForecast → UpdateResources → NotifySuccess → BranchOnDeleteFlag`.
//! La rama lleva a `Succeed` o a la cadena de borrado. Cualquier falla previa
//! a la rama pasa por `Failed` (notificación) y vuelve a `BranchOnDeleteFlag`.

use std::sync::Arc;

use forecast_core::{ChoiceState, CoreEngineError, GraphBuilder, Predicate, StepKind, TaskState, WorkflowGraph};
use forecast_policies::{catch_to_failure, deletion_polling, job_polling};

use crate::config::PipelineConfig;
use crate::invoker::StepInvoker;
use crate::steps::{NotifyStep, Publisher, RemoteStep};

pub const CREATE_DATASET: &str = "CreateDataset";
pub const CREATE_DATASET_GROUP: &str = "CreateDatasetGroup";
pub const IMPORT_DATA: &str = "ImportData";
pub const CREATE_PREDICTOR: &str = "CreatePredictor";
pub const CREATE_FORECAST: &str = "CreateForecast";
pub const UPDATE_RESOURCES: &str = "UpdateResources";
pub const NOTIFY_SUCCESS: &str = "NotifySuccess";
pub const BRANCH_ON_DELETE_FLAG: &str = "BranchOnDeleteFlag";
pub const DELETE_FORECAST: &str = "DeleteForecast";
pub const DELETE_PREDICTOR: &str = "DeletePredictor";
pub const DELETE_IMPORT_JOB: &str = "DeleteImportJob";
pub const FAILED: &str = "Failed";
pub const SUCCEED: &str = "Succeed";

/// Campo donde los catch de la etapa previa a la rama dejan el error.
pub const FAILURE_RESULT_PATH: &str = "serviceError";
/// Campo donde queda un error del propio notificador de fallas.
pub const NOTIFY_ERROR_PATH: &str = "notifyError";
pub const DELETE_FLAG: &str = "PerformDelete";

/// Orden de la cadena de borrado.
pub const DELETION_CHAIN: [&str; 3] = [DELETE_FORECAST, DELETE_PREDICTOR, DELETE_IMPORT_JOB];

/// Tareas remotas previas a la rama, en orden, con su tipo y si llevan
/// polling de jobs.
const PROVISION_CHAIN: [(&str, StepKind, bool); 6] = [(CREATE_DATASET, StepKind::Provision, false),
                                                      (CREATE_DATASET_GROUP, StepKind::Provision, false),
                                                      (IMPORT_DATA, StepKind::Provision, true),
                                                      (CREATE_PREDICTOR, StepKind::Provision, true),
                                                      (CREATE_FORECAST, StepKind::Provision, true),
                                                      (UPDATE_RESOURCES, StepKind::Publish, false)];

pub fn forecast_pipeline(invoker: Arc<dyn StepInvoker>,
                         publisher: Arc<dyn Publisher>,
                         cfg: &PipelineConfig)
                         -> Result<WorkflowGraph, CoreEngineError> {
    let mut builder = GraphBuilder::new().start_at(CREATE_DATASET);

    for (i, (state, kind, polls)) in PROVISION_CHAIN.iter().enumerate() {
        let next = PROVISION_CHAIN.get(i + 1).map(|(n, _, _)| *n).unwrap_or(NOTIFY_SUCCESS);
        let step = RemoteStep::new(cfg.function_name(state), *kind, Arc::clone(&invoker));
        let mut task = TaskState::new(Arc::new(step)).next(next)
                                                     .catch_all_of(catch_to_failure(FAILED, FAILURE_RESULT_PATH));
        if *polls {
            task = task.retry(job_polling());
        }
        if *state == UPDATE_RESOURCES {
            task = task.timeout(cfg.update_timeout);
        }
        builder = builder.task(*state, task);
    }

    let notify_success = NotifyStep::new(NOTIFY_SUCCESS, &cfg.topic_name, FAILURE_RESULT_PATH, Arc::clone(&publisher));
    let notify_failed = NotifyStep::new(FAILED, &cfg.topic_name, FAILURE_RESULT_PATH, publisher);

    builder = builder.task(NOTIFY_SUCCESS,
                           TaskState::new(Arc::new(notify_success)).next(BRANCH_ON_DELETE_FLAG)
                                                                   .catch_all_of(catch_to_failure(FAILED, FAILURE_RESULT_PATH)))
                     .task(FAILED,
                           TaskState::new(Arc::new(notify_failed)).next(BRANCH_ON_DELETE_FLAG)
                                                                  .catch(forecast_core::CatchRule::all(BRANCH_ON_DELETE_FLAG).with_result_path(NOTIFY_ERROR_PATH)))
                     .choice(BRANCH_ON_DELETE_FLAG,
                             ChoiceState::new(Predicate::boolean_equals(DELETE_FLAG, true), DELETE_FORECAST, SUCCEED));

    for (i, state) in DELETION_CHAIN.iter().enumerate() {
        let next = DELETION_CHAIN.get(i + 1).copied().unwrap_or(SUCCEED);
        let step = RemoteStep::new(cfg.function_name(state), StepKind::Cleanup, Arc::clone(&invoker));
        builder = builder.task(*state, TaskState::new(Arc::new(step)).next(next).retry(deletion_polling()));
    }

    builder.succeed(SUCCEED).build()
}
