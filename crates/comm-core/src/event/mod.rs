//! Definiciones de eventos de invocación y trait EventStore.

mod store;
mod types;

pub use store::{EventStore, InMemoryEventStore, NoopEventStore};
pub use types::{InvocationEvent, InvocationEventKind};
