use std::collections::HashMap;
use std::sync::Arc;

use super::{Generation, GenerativeWorker};
use crate::errors::WorkerFailure;

/// Registro de workers con nombre. Se construye antes de la primera
/// invocación y no se muta después (se comparte dentro de un `Arc`).
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    workers: HashMap<String, Arc<dyn GenerativeWorker>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un worker bajo `name`, reemplazando uno previo con el mismo nombre.
    pub fn register(&mut self, name: impl Into<String>, worker: Arc<dyn GenerativeWorker>) -> &mut Self {
        let name = name.into();
        if self.workers.insert(name.clone(), worker).is_some() {
            log::warn!("worker `{name}` registered twice; keeping the last one");
        }
        self
    }

    /// Variante encadenable de `register`.
    pub fn with(mut self, name: impl Into<String>, worker: impl GenerativeWorker + 'static) -> Self {
        self.register(name, Arc::new(worker));
        self
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn GenerativeWorker>, WorkerFailure> {
        self.workers
            .get(name)
            .cloned()
            .ok_or_else(|| WorkerFailure::NotRegistered { name: name.to_string() })
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.workers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

/// Servicios entregados a `Step::run`. Clonarlo es barato.
#[derive(Debug, Clone, Default)]
pub struct Services {
    workers: Arc<WorkerRegistry>,
}

impl Services {
    pub fn new(workers: WorkerRegistry) -> Self {
        Self { workers: Arc::new(workers) }
    }

    pub fn from_shared(workers: Arc<WorkerRegistry>) -> Self {
        Self { workers }
    }

    pub fn workers(&self) -> &WorkerRegistry {
        &self.workers
    }

    pub fn worker(&self, name: &str) -> Result<Arc<dyn GenerativeWorker>, WorkerFailure> {
        self.workers.resolve(name)
    }

    /// Resuelve `name` y genera con `prompt`.
    pub async fn generate(&self, name: &str, prompt: &str) -> Result<Generation, WorkerFailure> {
        let worker = self.worker(name)?;
        log::debug!("worker `{name}` generating ({} chars of prompt)", prompt.len());
        worker.generate(prompt).await
    }
}
