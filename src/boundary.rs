//! Frontera del invoker hacia quien consume el pipeline (CLI, tests, un
//! futuro servidor HTTP).
//!
//! - `ChatRequest { userMessage }` entra.
//! - `ChatResponse { supporterResponse, examinerResponse, mediatorResponse }`
//!   o `ChatFailure { code, stage, detail }` sale. Nunca un output parcial.
//!
//! Todo se serializa en camelCase.

use std::sync::Arc;

use comm_adapters::{build_agent_registry, offline_agent_registry, PipelineKind};
use comm_core::{CommittedPipeline, InvocationFailure, Invoker, Services, TopologyError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::WorkerConfig;
use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub user_message: String,
}

impl ChatRequest {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self { user_message: user_message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub supporter_response: String,
    pub examiner_response: String,
    pub mediator_response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatFailure {
    pub code: String,
    /// Id del step donde se originó el fallo, si aplica.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    pub detail: String,
}

impl From<&InvocationFailure> for ChatFailure {
    fn from(failure: &InvocationFailure) -> Self {
        Self { code: failure.code().to_string(),
               stage: failure.step_id().map(str::to_string),
               detail: failure.to_string() }
    }
}

impl From<InvocationFailure> for ChatFailure {
    fn from(failure: InvocationFailure) -> Self {
        Self::from(&failure)
    }
}

impl From<&TopologyError> for ChatFailure {
    fn from(error: &TopologyError) -> Self {
        let stage = match error {
            TopologyError::DuplicateStepId { step } | TopologyError::UnsatisfiedInput { step, .. } => Some(step.clone()),
            _ => None,
        };
        Self { code: "topology_error".to_string(),
               stage,
               detail: error.to_string() }
    }
}

/// Pipeline comprometido + invoker listos para atender requests.
#[derive(Debug, Clone)]
pub struct ChatService {
    kind: PipelineKind,
    pipeline: CommittedPipeline,
    invoker: Invoker,
}

impl ChatService {
    pub fn new(kind: PipelineKind, pipeline: CommittedPipeline, invoker: Invoker) -> Self {
        Self { kind,
               pipeline,
               invoker }
    }

    /// Arma registro de agentes, pipeline e invoker a partir de la configuración.
    pub fn from_config(kind: PipelineKind, config: &WorkerConfig) -> Result<Self, AppError> {
        let registry = if config.offline {
            log::info!("offline mode: agents answer with deterministic echoes");
            offline_agent_registry()
        } else {
            config.ensure_usable()?;
            build_agent_registry(&config.endpoint())?
        };
        let pipeline = kind.build(config.strictness())?;
        let mut invoker = Invoker::new(Services::from_shared(Arc::new(registry)));
        if let Some(deadline) = config.deadline {
            invoker = invoker.with_deadline(deadline);
        }
        Ok(Self::new(kind, pipeline, invoker))
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    pub fn pipeline(&self) -> &CommittedPipeline {
        &self.pipeline
    }

    /// Invoca el pipeline y devuelve su output tal cual (sirve para cualquier
    /// `PipelineKind`).
    pub async fn respond(&self, request: &ChatRequest) -> Result<Value, ChatFailure> {
        let input = serde_json::to_value(request).map_err(|e| ChatFailure { code: "validation_error".into(),
                                                                             stage: None,
                                                                             detail: e.to_string() })?;
        self.invoker.invoke(&self.pipeline, input).await.map_err(ChatFailure::from)
    }

    /// Variante tipada para el pipeline `check-en`.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ChatFailure> {
        let output = self.respond(request).await?;
        serde_json::from_value(output).map_err(|e| ChatFailure { code: "validation_error".into(),
                                                                 stage: None,
                                                                 detail: format!("pipeline `{}` output is not a chat response: {e}",
                                                                                 self.pipeline.id()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comm_core::{Boundary, FailureReason, WorkerFailure};
    use serde_json::json;

    #[test]
    fn request_and_response_use_camel_case() {
        let req: ChatRequest = serde_json::from_value(json!({"userMessage": "hi"})).unwrap();
        assert_eq!(req, ChatRequest::new("hi"));
        let res = ChatResponse { supporter_response: "s".into(),
                                 examiner_response: "e".into(),
                                 mediator_response: "m".into() };
        assert_eq!(serde_json::to_value(&res).unwrap(),
                   json!({"supporterResponse": "s", "examinerResponse": "e", "mediatorResponse": "m"}));
    }

    #[test]
    fn invocation_failures_map_to_codes() {
        let worker = InvocationFailure::Worker { stage: 0,
                                                 step: "examiner-reply".into(),
                                                 failure: WorkerFailure::Timeout };
        let f = ChatFailure::from(&worker);
        assert_eq!(f.code, "worker_failure");
        assert_eq!(f.stage.as_deref(), Some("examiner-reply"));

        let input = InvocationFailure::Validation { boundary: Boundary::PipelineInput,
                                                    reason: FailureReason::MissingField { path: "userMessage".into() } };
        let json = serde_json::to_value(ChatFailure::from(input)).unwrap();
        assert_eq!(json,
                   json!({"code": "validation_error",
                          "detail": "validation failed at pipeline input: missing field `userMessage`"}));
    }

    #[test]
    fn topology_errors_map_to_topology_code() {
        let f = ChatFailure::from(&TopologyError::DuplicateStepId { step: "mediator-reply".into() });
        assert_eq!(f.code, "topology_error");
        assert_eq!(f.stage.as_deref(), Some("mediator-reply"));
    }
}
