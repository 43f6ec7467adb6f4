//! forecast-infra: recursos del despliegue como datos validados.
//!
//! El cableado de buckets, cola, tópico, roles, funciones, state machine y
//! trigger se declara como una tabla de `ResourceSpec` y pasa por `validate`
//! antes de usarse. El aprovisionamiento real queda fuera de este crate.

pub mod resources;
pub mod stack;
pub mod validate;

pub use resources::{ResourceKind, ResourceSpec, ResourceTable, ResourceType, ServicePrincipal};
pub use stack::forecast_stack;
pub use validate::{validate, InfraError};

/// Construye la tabla del pipeline y la valida.
pub fn validated_stack(cfg: &forecast_adapters::PipelineConfig,
                       definition_hash: &str)
                       -> Result<ResourceTable, Vec<InfraError>> {
    let table = forecast_stack(cfg, definition_hash);
    let problems = validate(&table);
    if problems.is_empty() {
        Ok(table)
    } else {
        Err(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_expose_workflow_and_buckets() {
        let table = validated_stack(&forecast_adapters::PipelineConfig::default(), "h").unwrap();
        let outputs = table.outputs();
        assert_eq!(outputs["WorkflowId"], stack::STATE_MACHINE);
        assert_eq!(outputs["ArtifactBucketName"], stack::ARTIFACT_BUCKET);
        assert_eq!(outputs["QueryResultsBucketName"], stack::QUERY_RESULTS_BUCKET);
        assert_eq!(table.of_type(ResourceType::Function).count(), 10);
    }

    #[test]
    fn table_serializes_with_type_tags() {
        let table = validated_stack(&forecast_adapters::PipelineConfig::default(), "h").unwrap();
        let v = serde_json::to_value(&table).unwrap();
        assert_eq!(v["resources"][0], serde_json::json!({"logical_id": "ArtifactBucket", "type": "Bucket"}));
    }
}
