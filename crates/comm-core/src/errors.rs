//! Errores del core.
//!
//! Taxonomía:
//! - `FailureReason`: un payload no cumple un `Contract`.
//! - `TopologyError`: defecto de construcción detectado en `commit()`.
//! - `WorkerFailure`: falló una llamada a un `GenerativeWorker`.
//! - `StepFailure`: fallo atómico de un step (envuelve `WorkerFailure`).
//! - `InvocationFailure`: lo que recibe quien invoca un pipeline. Nunca
//!   acompaña un output parcial.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Motivo por el cual un payload (o un contract) no satisface a otro contract.
/// `path` es la ruta punteada del campo (`$` para la raíz).
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailureReason {
    #[error("`{path}` is not an object (found {found})")]
    NotAnObject { path: String, found: String },
    #[error("missing field `{path}`")]
    MissingField { path: String },
    #[error("field `{path}` expected {expected}, found {found}")]
    KindMismatch { path: String, expected: String, found: String },
    #[error("unknown field `{path}`")]
    UnknownField { path: String },
}

impl FailureReason {
    pub fn path(&self) -> &str {
        match self {
            FailureReason::NotAnObject { path, .. }
            | FailureReason::MissingField { path }
            | FailureReason::KindMismatch { path, .. }
            | FailureReason::UnknownField { path } => path,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopologyError {
    #[error("pipeline `{pipeline}` is already committed")]
    AlreadyCommitted { pipeline: String },
    #[error("pipeline `{pipeline}` has no stages")]
    EmptyPipeline { pipeline: String },
    #[error("stage {stage} is an empty parallel group")]
    EmptyParallelGroup { stage: usize },
    #[error("duplicate step id `{step}`")]
    DuplicateStepId { step: String },
    #[error("stage {stage} step `{step}` input is not satisfiable: {reason}")]
    UnsatisfiedInput { stage: usize, step: String, reason: FailureReason },
    #[error("ambiguous merge on field `{field}`: {left} vs {right}")]
    AmbiguousMerge { field: String, left: String, right: String },
    #[error("pipeline output is not satisfiable: {reason}")]
    UnsatisfiedOutput { reason: FailureReason },
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerFailure {
    /// Error de configuración: nombre no registrado.
    #[error("worker `{name}` is not registered")]
    NotRegistered { name: String },
    #[error("worker unreachable: {0}")]
    Unreachable(String),
    #[error("worker timed out")]
    Timeout,
    #[error("worker returned status {code}: {body}")]
    Status { code: u16, body: String },
    #[error("malformed worker response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StepFailure {
    #[error(transparent)]
    Worker(#[from] WorkerFailure),
    #[error("{0}")]
    Internal(String),
}

/// Frontera donde se validó un payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "at", rename_all = "snake_case")]
pub enum Boundary {
    PipelineInput,
    StageInput { stage: usize, step: String },
    StageOutput { stage: usize, step: String },
    PipelineOutput,
}

impl Boundary {
    pub fn step(&self) -> Option<&str> {
        match self {
            Boundary::StageInput { step, .. } | Boundary::StageOutput { step, .. } => Some(step),
            _ => None,
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::PipelineInput => write!(f, "pipeline input"),
            Boundary::StageInput { stage, step } => write!(f, "stage {stage} input of `{step}`"),
            Boundary::StageOutput { stage, step } => write!(f, "stage {stage} output of `{step}`"),
            Boundary::PipelineOutput => write!(f, "pipeline output"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvocationFailure {
    #[error("validation failed at {boundary}: {reason}")]
    Validation { boundary: Boundary, reason: FailureReason },
    #[error("stage {stage} step `{step}` worker failure: {failure}")]
    Worker { stage: usize, step: String, failure: WorkerFailure },
    #[error("stage {stage} step `{step}` failed: {message}")]
    Step { stage: usize, step: String, message: String },
    #[error("invocation exceeded its deadline of {limit_ms} ms")]
    DeadlineExceeded { limit_ms: u64 },
    #[error("pipeline `{pipeline}` has not been committed")]
    NotCommitted { pipeline: String },
}

impl InvocationFailure {
    pub(crate) fn from_step(stage: usize, step: &str, failure: StepFailure) -> Self {
        match failure {
            StepFailure::Worker(failure) => InvocationFailure::Worker { stage, step: step.to_string(), failure },
            StepFailure::Internal(message) => InvocationFailure::Step { stage, step: step.to_string(), message },
        }
    }

    /// Código estable expuesto en la frontera del invoker.
    pub fn code(&self) -> &'static str {
        match self {
            InvocationFailure::Validation { .. } => "validation_error",
            InvocationFailure::Worker { .. } | InvocationFailure::DeadlineExceeded { .. } => "worker_failure",
            InvocationFailure::Step { .. } => "step_failure",
            InvocationFailure::NotCommitted { .. } => "not_committed",
        }
    }

    /// Id del step donde se originó el fallo, si aplica.
    pub fn step_id(&self) -> Option<&str> {
        match self {
            InvocationFailure::Validation { boundary, .. } => boundary.step(),
            InvocationFailure::Worker { step, .. } | InvocationFailure::Step { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Índice del stage donde se originó el fallo, si aplica.
    pub fn stage_index(&self) -> Option<usize> {
        match self {
            InvocationFailure::Validation { boundary:
                                                Boundary::StageInput { stage, .. } | Boundary::StageOutput { stage, .. },
                                            .. }
            | InvocationFailure::Worker { stage, .. }
            | InvocationFailure::Step { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
