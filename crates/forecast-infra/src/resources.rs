//! Especificación declarativa de recursos.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Principal de servicio que asume un rol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServicePrincipal {
    Lambda,
    Forecast,
    StepFunctions,
}

impl ServicePrincipal {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServicePrincipal::Lambda => "lambda.amazonaws.com",
            ServicePrincipal::Forecast => "forecast.amazonaws.com",
            ServicePrincipal::StepFunctions => "states.amazonaws.com",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResourceKind {
    Bucket,
    Queue {
        visibility_timeout_secs: u64,
    },
    Topic,
    Subscription {
        topic: String,
        queue: String,
    },
    /// El contenido de las políticas es opaco: sólo nombres.
    Role {
        principal: ServicePrincipal,
        managed_policies: Vec<String>,
        inline_policies: Vec<String>,
    },
    Function {
        role: String,
        handler: String,
        timeout_secs: u64,
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        environment: IndexMap<String, String>,
    },
    StateMachine {
        role: String,
        functions: Vec<String>,
        topic: String,
        definition_hash: String,
    },
    EventSource {
        bucket: String,
        function: String,
        prefix: String,
        suffix: String,
    },
    Output {
        value_of: String,
    },
}

/// Tipo sin datos, usado para validar referencias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Bucket,
    Queue,
    Topic,
    Subscription,
    Role,
    Function,
    StateMachine,
    EventSource,
    Output,
}

impl ResourceKind {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ResourceKind::Bucket => ResourceType::Bucket,
            ResourceKind::Queue { .. } => ResourceType::Queue,
            ResourceKind::Topic => ResourceType::Topic,
            ResourceKind::Subscription { .. } => ResourceType::Subscription,
            ResourceKind::Role { .. } => ResourceType::Role,
            ResourceKind::Function { .. } => ResourceType::Function,
            ResourceKind::StateMachine { .. } => ResourceType::StateMachine,
            ResourceKind::EventSource { .. } => ResourceType::EventSource,
            ResourceKind::Output { .. } => ResourceType::Output,
        }
    }

    /// Referencias salientes con el tipo esperado del destino. `None` como
    /// tipo significa "cualquier recurso".
    pub fn references(&self) -> Vec<(&str, Option<ResourceType>)> {
        match self {
            ResourceKind::Subscription { topic, queue } => {
                vec![(topic.as_str(), Some(ResourceType::Topic)), (queue.as_str(), Some(ResourceType::Queue))]
            }
            ResourceKind::Function { role, .. } => vec![(role.as_str(), Some(ResourceType::Role))],
            ResourceKind::StateMachine { role, functions, topic, .. } => {
                let mut refs = vec![(role.as_str(), Some(ResourceType::Role)), (topic.as_str(), Some(ResourceType::Topic))];
                refs.extend(functions.iter().map(|f| (f.as_str(), Some(ResourceType::Function))));
                refs
            }
            ResourceKind::EventSource { bucket, function, .. } => {
                vec![(bucket.as_str(), Some(ResourceType::Bucket)), (function.as_str(), Some(ResourceType::Function))]
            }
            ResourceKind::Output { value_of } => vec![(value_of.as_str(), None)],
            ResourceKind::Bucket | ResourceKind::Queue { .. } | ResourceKind::Topic | ResourceKind::Role { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub logical_id: String,
    #[serde(flatten)]
    pub kind: ResourceKind,
}

impl ResourceSpec {
    pub fn new(logical_id: impl Into<String>, kind: ResourceKind) -> Self {
        Self { logical_id: logical_id.into(),
               kind }
    }
}

/// Tabla de recursos en orden de declaración. Los ids duplicados se
/// conservan para que la validación los reporte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTable {
    pub resources: Vec<ResourceSpec>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, spec: ResourceSpec) -> &mut Self {
        self.resources.push(spec);
        self
    }

    pub fn get(&self, logical_id: &str) -> Option<&ResourceSpec> {
        self.resources.iter().find(|r| r.logical_id == logical_id)
    }

    pub fn of_type(&self, ty: ResourceType) -> impl Iterator<Item = &ResourceSpec> {
        self.resources.iter().filter(move |r| r.kind.resource_type() == ty)
    }

    /// Outputs expuestos: id lógico → recurso referido.
    pub fn outputs(&self) -> IndexMap<&str, &str> {
        self.resources
            .iter()
            .filter_map(|r| match &r.kind {
                ResourceKind::Output { value_of } => Some((r.logical_id.as_str(), value_of.as_str())),
                _ => None,
            })
            .collect()
    }
}
