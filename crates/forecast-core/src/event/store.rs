use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::{FlowEvent, FlowEventKind};

/// Almacenamiento de eventos append-only.
///
/// La implementación en memoria crece con cada ejecución; un proceso de larga
/// vida debe llamar `remove` (o `FlowEngine::evict`) sobre las terminadas.
///
/// Compartido entre ejecuciones concurrentes; cada ejecución sólo escribe en
/// su propio `execution_id`.
pub trait EventStore: Send + Sync {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&self, execution_id: Uuid, kind: FlowEventKind) -> FlowEvent;
    /// Lista eventos de una ejecución (orden ascendente por seq).
    fn list(&self, execution_id: Uuid) -> Vec<FlowEvent>;
    /// Ids de ejecución conocidos.
    fn executions(&self) -> Vec<Uuid>;
    /// Descarta los eventos de una ejecución; devuelve cuántos había.
    fn remove(&self, execution_id: Uuid) -> usize;
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    inner: DashMap<Uuid, Vec<FlowEvent>>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&self, execution_id: Uuid, kind: FlowEventKind) -> FlowEvent {
        let mut events = self.inner.entry(execution_id).or_default();
        let ev = FlowEvent { seq: events.len() as u64,
                             execution_id,
                             kind,
                             ts: Utc::now() };
        events.push(ev.clone());
        ev
    }

    fn list(&self, execution_id: Uuid) -> Vec<FlowEvent> {
        self.inner.get(&execution_id).map(|e| e.value().clone()).unwrap_or_default()
    }

    fn executions(&self) -> Vec<Uuid> {
        self.inner.iter().map(|e| *e.key()).collect()
    }

    fn remove(&self, execution_id: Uuid) -> usize {
        self.inner.remove(&execution_id).map(|(_, events)| events.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_per_execution() {
        let store = InMemoryEventStore::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let kind = FlowEventKind::ExecutionAborted { state: "s".into() };
        assert_eq!(store.append_kind(a, kind.clone()).seq, 0);
        assert_eq!(store.append_kind(a, kind.clone()).seq, 1);
        assert_eq!(store.append_kind(b, kind).seq, 0);
        assert_eq!(store.list(a).len(), 2);
        assert_eq!(store.executions().len(), 2);
        assert_eq!(store.remove(a), 2);
        assert!(store.list(a).is_empty());
        assert_eq!(store.executions(), vec![b]);
    }
}
