//! comm-adapters: piezas concretas sobre `comm-core`.
//!
//! Este crate provee:
//! - Workers: `ChatCompletionsWorker` (HTTP, API compatible con OpenAI) y
//!   `EchoWorker` (determinista, sin red).
//! - Agentes con rol (`AgentRole`) y el armado del registro de workers.
//! - Steps: `AgentReplyStep` (un agente responde a un campo del contexto) y
//!   `MediatorStep` (integra las respuestas del stage paralelo).
//! - Fábricas de pipelines: `check-en` y `baseline`.
//!
//! El core no sabe nada de agentes ni de HTTP; todo eso vive aquí.

pub mod agents;
pub mod pipelines;
pub mod steps;
pub mod workers;

pub use agents::{build_agent_registry, offline_agent_registry, AgentRole};
pub use pipelines::{baseline_pipeline, check_en_pipeline, PipelineKind, UnknownPipeline};
pub use steps::{AgentReplyStep, MediatorStep};
pub use workers::{ChatCompletionsWorker, ChatEndpoint, EchoWorker};
