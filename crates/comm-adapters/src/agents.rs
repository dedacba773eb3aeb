//! Agentes con rol.
//!
//! Todos comparten modelo e instrucciones comunes (feedback sobre textos en
//! inglés escritos por estudiantes); cada rol agrega su bloque propio. El
//! contenido de las instrucciones no es un objetivo de calidad del crate.

use std::fmt;
use std::sync::Arc;

use comm_core::{WorkerFailure, WorkerRegistry};

use crate::workers::{ChatCompletionsWorker, ChatEndpoint, EchoWorker};

const COMMON_INSTRUCTIONS: &str = "\
You give feedback on English text written by a learner.
- Target level: natural, formal English suitable for a university report (CEFR C1).
- Judge only the text, never the writer. No sarcasm or personal attacks.
- Never invent errors that are not in the text.
- Each point must quote the original passage and propose an improvement.

Output format:
1. Overall assessment (one sentence)
2. Points to improve (original passage / suggestion / one-sentence reason)
3. The full corrected text";

const BASELINE_ROLE: &str = "\
Role: Baseline (no persona).
Only correct the text into natural and accurate English.";

const SUPPORTER_ROLE: &str = "\
Role: Supporter (empathetic teacher).
Put the learner's motivation first: the overall assessment must mention their effort
or a strength of the text, and every suggestion must be phrased warmly. Emoji are welcome.";

const EXAMINER_ROLE: &str = "\
Role: Examiner (strict teacher).
Put accuracy and logical consistency first. State the assessment factually, with no praise.
Prioritise grammar, usage, tense, agreement and structure; unnatural phrasing is also an error.";

const MEDIATOR_ROLE: &str = "\
Role: Mediator.
You receive the learner's text, the Supporter's feedback and the Examiner's feedback,
and integrate them into the final feedback. Do not add new findings: adopt, drop, rephrase
or prioritise theirs. Keep the Examiner's points that change meaning, drop nitpicks, fold
the Supporter's praise into the one-sentence assessment and phrase everything forward-looking.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    Baseline,
    Supporter,
    Examiner,
    Mediator,
}

impl AgentRole {
    pub const ALL: [AgentRole; 4] = [AgentRole::Baseline,
                                     AgentRole::Supporter,
                                     AgentRole::Examiner,
                                     AgentRole::Mediator];

    /// Nombre con el que los steps resuelven al agente en el registro.
    pub fn registry_name(self) -> &'static str {
        match self {
            AgentRole::Baseline => "baselineAgent",
            AgentRole::Supporter => "supporterAgent",
            AgentRole::Examiner => "examinerAgent",
            AgentRole::Mediator => "mediatorAgent",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AgentRole::Baseline => "Baseline",
            AgentRole::Supporter => "Supporter",
            AgentRole::Examiner => "Examiner",
            AgentRole::Mediator => "Mediator",
        }
    }

    fn role_instructions(self) -> &'static str {
        match self {
            AgentRole::Baseline => BASELINE_ROLE,
            AgentRole::Supporter => SUPPORTER_ROLE,
            AgentRole::Examiner => EXAMINER_ROLE,
            AgentRole::Mediator => MEDIATOR_ROLE,
        }
    }

    /// Instrucciones comunes + bloque del rol.
    pub fn instructions(self) -> String {
        format!("{COMMON_INSTRUCTIONS}\n\n{}", self.role_instructions())
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Registro con los cuatro agentes sobre el mismo endpoint y un único
/// cliente HTTP.
pub fn build_agent_registry(endpoint: &ChatEndpoint) -> Result<WorkerRegistry, WorkerFailure> {
    let client = endpoint.client()?;
    let mut registry = WorkerRegistry::new();
    for role in AgentRole::ALL {
        let worker = ChatCompletionsWorker::with_client(client.clone(),
                                                        endpoint.clone(),
                                                        role.registry_name(),
                                                        role.instructions());
        registry.register(role.registry_name(), Arc::new(worker));
    }
    log::info!("registered {} agents against {} (model {})",
               registry.len(),
               endpoint.base_url,
               endpoint.model);
    Ok(registry)
}

/// Registro con `EchoWorker` para cada agente.
pub fn offline_agent_registry() -> WorkerRegistry {
    AgentRole::ALL.into_iter()
                  .fold(WorkerRegistry::new(), |registry, role| {
                      registry.with(role.registry_name(), EchoWorker::new(role.display_name()))
                  })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_shares_the_common_block() {
        for role in AgentRole::ALL {
            let text = role.instructions();
            assert!(text.starts_with(COMMON_INSTRUCTIONS));
            assert!(text.contains(&format!("Role: {}", role.display_name())));
        }
    }

    #[test]
    fn registries_expose_all_agent_names() {
        let expected = vec!["baselineAgent", "examinerAgent", "mediatorAgent", "supporterAgent"];
        assert_eq!(offline_agent_registry().names(), expected);
        let online = build_agent_registry(&ChatEndpoint::default()).expect("client builds");
        assert_eq!(online.names(), expected);
    }
}
