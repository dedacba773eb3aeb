use async_trait::async_trait;
use serde_json::Value;

use crate::contract::Contract;
use crate::errors::StepFailure;
use crate::worker::Services;

/// Trait que define un Step.
///
/// `run` recibe un input que ya satisface `input_contract` (lo garantiza el
/// invoker; no se revalida aquí). Si alguna llamada a un worker falla, el step
/// falla completo: nunca devuelve un output parcial. Un step no tiene acceso a
/// la topología ni al estado de otros steps.
#[async_trait]
pub trait Step: Send + Sync + std::fmt::Debug {
    /// Identificador estable y único dentro del pipeline.
    fn id(&self) -> &str;

    /// Nombre opcional amigable.
    fn name(&self) -> &str {
        self.id()
    }

    fn input_contract(&self) -> &Contract;

    fn output_contract(&self) -> &Contract;

    async fn run(&self, input: Value, services: &Services) -> Result<Value, StepFailure>;
}
