//! Tabla de recursos del despliegue del pipeline.

use forecast_adapters::pipeline::{CREATE_DATASET, CREATE_DATASET_GROUP, CREATE_FORECAST, CREATE_PREDICTOR, DELETE_FORECAST,
                                  DELETE_IMPORT_JOB, DELETE_PREDICTOR, IMPORT_DATA, UPDATE_RESOURCES};
use forecast_adapters::PipelineConfig;
use indexmap::IndexMap;

use crate::resources::{ResourceKind, ResourceSpec, ResourceTable, ServicePrincipal};

pub const ARTIFACT_BUCKET: &str = "ArtifactBucket";
pub const QUERY_RESULTS_BUCKET: &str = "QueryResultsBucket";
pub const QUEUE: &str = "ForecastMlopsQueue";
pub const TOPIC: &str = "ForecastMlopsTopic";
pub const SUBSCRIPTION: &str = "ForecastMlopsSubscription";
pub const TRIGGER_ROLE: &str = "TriggerRole";
pub const FORECAST_ROLE: &str = "ForecastRole";
pub const LAMBDA_ROLE: &str = "LambdaRole";
pub const UPDATE_ROLE: &str = "UpdateRole";
pub const STATES_ROLE: &str = "StatesRole";
pub const TRIGGER_FUNCTION: &str = "TriggerFunction";
pub const STATE_MACHINE: &str = "ForecastMlopsStateMachine";
pub const EVENT_SOURCE: &str = "ArtifactUploadTrigger";

const QUEUE_VISIBILITY_SECS: u64 = 300;
const FUNCTION_TIMEOUT_SECS: u64 = 60;

fn role(principal: ServicePrincipal, managed: &[&str], inline: &[&str]) -> ResourceKind {
    ResourceKind::Role { principal,
                         managed_policies: managed.iter().map(|s| s.to_string()).collect(),
                         inline_policies: inline.iter().map(|s| s.to_string()).collect() }
}

/// Construye la tabla de recursos del pipeline. `definition_hash` identifica
/// el grafo desplegado en la state machine.
pub fn forecast_stack(cfg: &PipelineConfig, definition_hash: &str) -> ResourceTable {
    let mut t = ResourceTable::new();
    t.push(ResourceSpec::new(ARTIFACT_BUCKET, ResourceKind::Bucket))
     .push(ResourceSpec::new(QUERY_RESULTS_BUCKET, ResourceKind::Bucket))
     .push(ResourceSpec::new(QUEUE,
                             ResourceKind::Queue { visibility_timeout_secs: QUEUE_VISIBILITY_SECS }))
     .push(ResourceSpec::new(TOPIC, ResourceKind::Topic))
     .push(ResourceSpec::new(SUBSCRIPTION,
                             ResourceKind::Subscription { topic: TOPIC.into(),
                                                          queue: QUEUE.into() }))
     .push(ResourceSpec::new(TRIGGER_ROLE,
                             role(ServicePrincipal::Lambda,
                                  &["AWSStepFunctionsFullAccess", "CloudWatchFullAccess", "AmazonS3FullAccess"],
                                  &["TriggerExecutionPolicy"])))
     .push(ResourceSpec::new(FORECAST_ROLE,
                             role(ServicePrincipal::Forecast, &["CloudWatchFullAccess", "AmazonS3FullAccess"], &[])))
     .push(ResourceSpec::new(LAMBDA_ROLE,
                             role(ServicePrincipal::Lambda,
                                  &["AmazonForecastFullAccess", "CloudWatchFullAccess"],
                                  &["LambdaExecutionPolicy"])))
     .push(ResourceSpec::new(UPDATE_ROLE,
                             role(ServicePrincipal::Lambda,
                                  &["AmazonAthenaFullAccess", "AmazonS3FullAccess", "CloudWatchFullAccess"],
                                  &[])))
     .push(ResourceSpec::new(STATES_ROLE,
                             role(ServicePrincipal::StepFunctions, &["AWSLambdaRole", "AmazonSNSFullAccess"], &[])));

    let steps = [CREATE_DATASET,
                 CREATE_DATASET_GROUP,
                 IMPORT_DATA,
                 CREATE_PREDICTOR,
                 CREATE_FORECAST,
                 UPDATE_RESOURCES,
                 DELETE_FORECAST,
                 DELETE_PREDICTOR,
                 DELETE_IMPORT_JOB];
    let mut functions = Vec::with_capacity(steps.len());
    for step in steps {
        let name = cfg.function_name(step);
        let role = if step == UPDATE_RESOURCES { UPDATE_ROLE } else { LAMBDA_ROLE };
        let mut environment = IndexMap::new();
        environment.insert("FORECAST_ROLE".to_string(), FORECAST_ROLE.to_string());
        if step == UPDATE_RESOURCES {
            environment.insert("QUERY_RESULTS_BUCKET".to_string(), QUERY_RESULTS_BUCKET.to_string());
        }
        t.push(ResourceSpec::new(name.clone(),
                                 ResourceKind::Function { role: role.into(),
                                                          handler: format!("{step}.handler"),
                                                          timeout_secs: FUNCTION_TIMEOUT_SECS,
                                                          environment }));
        functions.push(name);
    }

    let mut trigger_env = IndexMap::new();
    trigger_env.insert("STATE_MACHINE".to_string(), STATE_MACHINE.to_string());
    trigger_env.insert("PARAMETER_PATH".to_string(), cfg.parameter_path.display().to_string());
    t.push(ResourceSpec::new(TRIGGER_FUNCTION,
                             ResourceKind::Function { role: TRIGGER_ROLE.into(),
                                                      handler: "trigger.handler".into(),
                                                      timeout_secs: FUNCTION_TIMEOUT_SECS,
                                                      environment: trigger_env }))
     .push(ResourceSpec::new(STATE_MACHINE,
                             ResourceKind::StateMachine { role: STATES_ROLE.into(),
                                                          functions,
                                                          topic: TOPIC.into(),
                                                          definition_hash: definition_hash.to_string() }))
     .push(ResourceSpec::new(EVENT_SOURCE,
                             ResourceKind::EventSource { bucket: ARTIFACT_BUCKET.into(),
                                                         function: TRIGGER_FUNCTION.into(),
                                                         prefix: cfg.trigger_prefix.clone(),
                                                         suffix: cfg.trigger_suffix.clone() }))
     .push(ResourceSpec::new("WorkflowId", ResourceKind::Output { value_of: STATE_MACHINE.into() }))
     .push(ResourceSpec::new("ArtifactBucketName", ResourceKind::Output { value_of: ARTIFACT_BUCKET.into() }))
     .push(ResourceSpec::new("QueryResultsBucketName",
                             ResourceKind::Output { value_of: QUERY_RESULTS_BUCKET.into() }));
    t
}
