//! MediatorStep (TypedStep)
//!
//! Recibe el texto del usuario y las dos respuestas del stage paralelo, arma
//! el contexto de mediación y produce `mediatorResponse`. Las respuestas de
//! supporter y examiner ya están en el contexto de la invocación; no hace
//! falta reenviarlas.

use async_trait::async_trait;
use comm_core::{contract, Contract, Services, StepFailure, TypedStep};
use serde::{Deserialize, Serialize};

use crate::agents::AgentRole;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediatorInput {
    pub user_message: String,
    pub supporter_response: String,
    pub examiner_response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediatorOutput {
    pub mediator_response: String,
}

/// Prompt que recibe el mediador.
pub fn mediation_prompt(input: &MediatorInput) -> String {
    format!("User text: \"{}\"\nSupporter feedback: \"{}\"\nExaminer feedback: \"{}\"\n\nWith these in mind, fulfil your role.",
            input.user_message, input.supporter_response, input.examiner_response)
}

#[derive(Debug, Clone)]
pub struct MediatorStep {
    input: Contract,
    output: Contract,
}

impl MediatorStep {
    pub const ID: &'static str = "mediator-reply";

    pub fn new() -> Self {
        Self { input: contract!("mediator-reply.input" => {
                   userMessage: String,
                   supporterResponse: String,
                   examinerResponse: String,
               }),
               output: contract!("mediator-reply.output" => { mediatorResponse: String }) }
    }
}

impl Default for MediatorStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TypedStep for MediatorStep {
    type Input = MediatorInput;
    type Output = MediatorOutput;

    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        AgentRole::Mediator.display_name()
    }

    fn input_contract(&self) -> &Contract {
        &self.input
    }

    fn output_contract(&self) -> &Contract {
        &self.output
    }

    async fn run_typed(&self, input: MediatorInput, services: &Services) -> Result<MediatorOutput, StepFailure> {
        let generation = services.generate(AgentRole::Mediator.registry_name(), &mediation_prompt(&input))
                                 .await?;
        Ok(MediatorOutput { mediator_response: generation.text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::offline_agent_registry;
    use comm_core::Step;
    use serde_json::json;

    #[test]
    fn prompt_carries_all_three_texts() {
        let prompt = mediation_prompt(&MediatorInput { user_message: "I has a pen.".into(),
                                                       supporter_response: "Nice try!".into(),
                                                       examiner_response: "Subject-verb agreement.".into() });
        assert!(prompt.starts_with("User text: \"I has a pen.\""));
        assert!(prompt.contains("Supporter feedback: \"Nice try!\""));
        assert!(prompt.contains("Examiner feedback: \"Subject-verb agreement.\""));
    }

    #[tokio::test]
    async fn runs_through_the_untyped_adapter() {
        let step: &dyn Step = &MediatorStep::new();
        let services = Services::new(offline_agent_registry());
        let out = step.run(json!({
                               "userMessage": "I has a pen.",
                               "supporterResponse": "s",
                               "examinerResponse": "e",
                           }),
                           &services)
                      .await
                      .unwrap();
        assert_eq!(out, json!({"mediatorResponse": "[Mediator] User text: \"I has a pen.\""}));
    }

    #[tokio::test]
    async fn undecodable_input_is_an_internal_failure() {
        let step: &dyn Step = &MediatorStep::new();
        let services = Services::new(offline_agent_registry());
        let err = step.run(json!({"userMessage": "x"}), &services).await.unwrap_err();
        assert!(matches!(err, StepFailure::Internal(_)));
    }
}
