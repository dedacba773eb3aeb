use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::Step;
use crate::contract::Contract;
use crate::errors::StepFailure;
use crate::worker::Services;

/// Interfaz de alto nivel para definir Steps con tipos fuertes.
///
/// Implementadores escriben `run_typed` con structs serde concretos; el
/// adaptador de abajo convierte esa ejecución a la interfaz neutra `Step`.
/// Los contracts siguen siendo explícitos: son los que chequea `commit()`.
#[async_trait]
pub trait TypedStep: Send + Sync + std::fmt::Debug {
    type Input: DeserializeOwned + Send;
    type Output: Serialize + Send;

    fn id(&self) -> &str;

    fn name(&self) -> &str {
        TypedStep::id(self)
    }

    fn input_contract(&self) -> &Contract;

    fn output_contract(&self) -> &Contract;

    async fn run_typed(&self, input: Self::Input, services: &Services) -> Result<Self::Output, StepFailure>;
}

// -------------------------------------------------------------
// Adaptador: cualquier `TypedStep` implementa `Step` neutro.
// -------------------------------------------------------------
#[async_trait]
impl<T> Step for T where T: TypedStep
{
    fn id(&self) -> &str {
        TypedStep::id(self)
    }

    fn name(&self) -> &str {
        TypedStep::name(self)
    }

    fn input_contract(&self) -> &Contract {
        TypedStep::input_contract(self)
    }

    fn output_contract(&self) -> &Contract {
        TypedStep::output_contract(self)
    }

    async fn run(&self, input: Value, services: &Services) -> Result<Value, StepFailure> {
        let typed: T::Input = serde_json::from_value(input).map_err(|e| {
                                  StepFailure::Internal(format!("step `{}` input decode: {e}", TypedStep::id(self)))
                              })?;
        let out = self.run_typed(typed, services).await?;
        serde_json::to_value(out).map_err(|e| {
                                     StepFailure::Internal(format!("step `{}` output encode: {e}", TypedStep::id(self)))
                                 })
    }
}
