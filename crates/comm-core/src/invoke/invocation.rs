use serde_json::Value;
use uuid::Uuid;

use crate::errors::InvocationFailure;

/// Output validado de un stage, tal como se fusionó en el contexto.
#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    pub index: usize,
    pub step_ids: Vec<String>,
    pub output: Value,
    pub output_hash: String,
}

/// Registro efímero de una invocación: input, outputs intermedios y
/// resultado final. No sobrevive a la request que lo creó.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub id: Uuid,
    pub pipeline_id: String,
    pub input: Value,
    pub stages: Vec<StageRecord>,
    pub outcome: Result<Value, InvocationFailure>,
}

impl Invocation {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn output(&self) -> Option<&Value> {
        self.outcome.as_ref().ok()
    }

    pub fn failure(&self) -> Option<&InvocationFailure> {
        self.outcome.as_ref().err()
    }

    pub fn into_result(self) -> Result<Value, InvocationFailure> {
        self.outcome
    }
}
