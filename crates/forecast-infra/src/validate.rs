//! Pasada de validación de la tabla de recursos.

use std::collections::HashSet;

use log::debug;
use thiserror::Error;

use crate::resources::{ResourceKind, ResourceTable, ResourceType};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InfraError {
    #[error("duplicate logical id '{0}'")] DuplicateId(String),
    #[error("'{from}' references unknown resource '{to}'")] UnknownReference { from: String, to: String },
    #[error("'{from}' references '{to}' which is a {actual:?}, expected {expected:?}")]
    WrongType {
        from: String,
        to: String,
        expected: ResourceType,
        actual: ResourceType,
    },
    #[error("queue '{queue}' visibility timeout {visibility}s is shorter than function '{function}' timeout {timeout}s")]
    VisibilityTooShort {
        queue: String,
        visibility: u64,
        function: String,
        timeout: u64,
    },
    #[error("event source '{0}' has an empty prefix or suffix filter")] EmptyFilter(String),
}

/// Valida la tabla completa y devuelve todos los problemas encontrados.
pub fn validate(table: &ResourceTable) -> Vec<InfraError> {
    let mut problems = Vec::new();

    let mut seen = HashSet::new();
    for r in &table.resources {
        if !seen.insert(r.logical_id.as_str()) {
            problems.push(InfraError::DuplicateId(r.logical_id.clone()));
        }
    }

    for r in &table.resources {
        for (target, expected) in r.kind.references() {
            match table.get(target) {
                None => problems.push(InfraError::UnknownReference { from: r.logical_id.clone(),
                                                                     to: target.to_string() }),
                Some(found) => {
                    let actual = found.kind.resource_type();
                    if let Some(expected) = expected.filter(|e| *e != actual) {
                        problems.push(InfraError::WrongType { from: r.logical_id.clone(),
                                                              to: target.to_string(),
                                                              expected,
                                                              actual });
                    }
                }
            }
        }
        if let ResourceKind::EventSource { prefix, suffix, .. } = &r.kind {
            if prefix.is_empty() || suffix.is_empty() {
                problems.push(InfraError::EmptyFilter(r.logical_id.clone()));
            }
        }
    }

    let longest = table.of_type(ResourceType::Function)
                       .filter_map(|f| match &f.kind {
                           ResourceKind::Function { timeout_secs, .. } => Some((f.logical_id.as_str(), *timeout_secs)),
                           _ => None,
                       })
                       .max_by_key(|(_, t)| *t);
    if let Some((function, timeout)) = longest {
        for q in table.of_type(ResourceType::Queue) {
            if let ResourceKind::Queue { visibility_timeout_secs } = q.kind {
                if visibility_timeout_secs < timeout {
                    problems.push(InfraError::VisibilityTooShort { queue: q.logical_id.clone(),
                                                                   visibility: visibility_timeout_secs,
                                                                   function: function.to_string(),
                                                                   timeout });
                }
            }
        }
    }

    debug!("validated {} resources, {} problems", table.resources.len(), problems.len());
    problems
}
