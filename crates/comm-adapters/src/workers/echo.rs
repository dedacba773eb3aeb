use async_trait::async_trait;
use comm_core::{Generation, GenerativeWorker, WorkerFailure};

/// Worker determinista para correr sin red: responde `[agente] <primera
/// línea no vacía del prompt>`.
#[derive(Debug, Clone)]
pub struct EchoWorker {
    agent: String,
}

impl EchoWorker {
    pub fn new(agent: impl Into<String>) -> Self {
        Self { agent: agent.into() }
    }
}

#[async_trait]
impl GenerativeWorker for EchoWorker {
    async fn generate(&self, prompt: &str) -> Result<Generation, WorkerFailure> {
        let first = prompt.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or_default();
        Ok(Generation::new(format!("[{}] {first}", self.agent)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echoes_first_non_empty_line() {
        let worker = EchoWorker::new("Mediator");
        let out = tokio_test::block_on(worker.generate("\n   \n  User text: hi\nmore")).unwrap();
        assert_eq!(out.text, "[Mediator] User text: hi");
    }
}
