use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::{InvocationEvent, InvocationEventKind};

/// Almacenamiento de eventos append-only.
///
/// Toma `&self`: un mismo store recibe eventos de invocaciones concurrentes.
pub trait EventStore: Send + Sync + std::fmt::Debug {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&self, invocation_id: Uuid, kind: InvocationEventKind) -> InvocationEvent;
    /// Lista eventos de una invocación (orden ascendente por seq).
    fn list(&self, invocation_id: Uuid) -> Vec<InvocationEvent>;
}

/// Store en memoria, particionado por invocación.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    inner: DashMap<Uuid, Vec<InvocationEvent>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids de invocaciones registradas (sin orden definido).
    pub fn invocation_ids(&self) -> Vec<Uuid> {
        self.inner.iter().map(|e| *e.key()).collect()
    }

    /// Descarta los eventos de una invocación.
    pub fn forget(&self, invocation_id: Uuid) {
        self.inner.remove(&invocation_id);
    }
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&self, invocation_id: Uuid, kind: InvocationEventKind) -> InvocationEvent {
        let mut events = self.inner.entry(invocation_id).or_default();
        let ev = InvocationEvent { seq: events.len() as u64,
                                   invocation_id,
                                   kind,
                                   ts: Utc::now() };
        events.push(ev.clone());
        ev
    }

    fn list(&self, invocation_id: Uuid) -> Vec<InvocationEvent> {
        self.inner.get(&invocation_id).map(|e| e.value().clone()).unwrap_or_default()
    }
}

/// Store que no retiene nada: las invocaciones no dejan estado entre requests.
/// Los eventos sólo se reflejan en el log a nivel `trace`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventStore;

impl EventStore for NoopEventStore {
    fn append_kind(&self, invocation_id: Uuid, kind: InvocationEventKind) -> InvocationEvent {
        log::trace!("invocation {invocation_id}: {kind:?}");
        InvocationEvent { seq: 0,
                          invocation_id,
                          kind,
                          ts: Utc::now() }
    }

    fn list(&self, _invocation_id: Uuid) -> Vec<InvocationEvent> {
        Vec::new()
    }
}
