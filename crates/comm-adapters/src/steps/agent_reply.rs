//! AgentReplyStep
//!
//! - Lee un campo de texto del contexto (`source`) y se lo pasa como prompt
//!   al agente del rol.
//! - Publica el texto generado en `target`.
//! - Un fallo del agente hace fallar el step completo.

use async_trait::async_trait;
use comm_core::{Contract, FieldKind, Services, Step, StepFailure};
use serde_json::{Map, Value};

use crate::agents::AgentRole;

#[derive(Debug, Clone)]
pub struct AgentReplyStep {
    id: String,
    role: AgentRole,
    source: String,
    target: String,
    input: Contract,
    output: Contract,
}

impl AgentReplyStep {
    pub fn new(id: impl Into<String>, role: AgentRole, source: impl Into<String>, target: impl Into<String>) -> Self {
        let id = id.into();
        let source = source.into();
        let target = target.into();
        let input = Contract::new(format!("{id}.input")).field(source.clone(), FieldKind::String);
        let output = Contract::new(format!("{id}.output")).field(target.clone(), FieldKind::String);
        Self { id,
               role,
               source,
               target,
               input,
               output }
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }
}

#[async_trait]
impl Step for AgentReplyStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        self.role.display_name()
    }

    fn input_contract(&self) -> &Contract {
        &self.input
    }

    fn output_contract(&self) -> &Contract {
        &self.output
    }

    async fn run(&self, input: Value, services: &Services) -> Result<Value, StepFailure> {
        let prompt = input.get(&self.source)
                          .and_then(Value::as_str)
                          .ok_or_else(|| StepFailure::Internal(format!("field `{}` is not a string", self.source)))?;
        let generation = services.generate(self.role.registry_name(), prompt).await?;
        let mut out = Map::new();
        out.insert(self.target.clone(), Value::String(generation.text));
        Ok(Value::Object(out))
    }
}
