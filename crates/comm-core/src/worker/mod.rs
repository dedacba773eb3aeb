//! Seam hacia los Generative Workers.
//!
//! Los steps no buscan workers en un registro global: reciben un `Services`
//! explícito y resuelven el worker por nombre en tiempo de ejecución. El
//! registro se puebla una sola vez al arrancar y luego es de sólo lectura.

mod registry;

pub use registry::{Services, WorkerRegistry};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::WorkerFailure;

/// Texto generado por un worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Colaborador externo de generación de texto.
///
/// Las implementaciones deben ser `Send + Sync`: el mismo worker puede ser
/// llamado en paralelo por varios steps y varias invocaciones.
#[async_trait]
pub trait GenerativeWorker: Send + Sync + std::fmt::Debug {
    async fn generate(&self, prompt: &str) -> Result<Generation, WorkerFailure>;
}
