//! Tipos de evento de una invocación.
//!
//! Rol:
//! - Cada `invoke` emite eventos a un `EventStore` append-only.
//! - Permiten observar el orden real de ejecución (qué stage arrancó, cuál
//!   falló) sin acoplarse al estado interno del invoker.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationEventKind {
    /// Primer evento de toda invocación.
    InvocationStarted { pipeline_id: String, topology_hash: String },
    /// Un stage comenzó. `step_ids` lista todos los miembros del grupo.
    StageStarted { stage_index: usize, step_ids: Vec<String> },
    /// Un stage terminó y su output (fusionado) pasó validación.
    StageFinished { stage_index: usize, output_hash: String },
    /// Un stage falló; la invocación no continúa.
    StageFailed { stage_index: usize, step_id: Option<String>, code: String, reason: String },
    /// Cierre exitoso con fingerprint agregado de los outputs.
    InvocationCompleted { fingerprint: String },
    /// Cierre con fallo (incluye fallos de frontera de pipeline).
    InvocationFailed { code: String, reason: String },
}

impl InvocationEventKind {
    /// Variante compacta de una letra, útil para asertar secuencias.
    pub fn code(&self) -> &'static str {
        match self {
            InvocationEventKind::InvocationStarted { .. } => "I",
            InvocationEventKind::StageStarted { .. } => "S",
            InvocationEventKind::StageFinished { .. } => "F",
            InvocationEventKind::StageFailed { .. } => "X",
            InvocationEventKind::InvocationCompleted { .. } => "C",
            InvocationEventKind::InvocationFailed { .. } => "E",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationEvent {
    pub seq: u64, // asignado por el store (orden append)
    pub invocation_id: Uuid,
    pub kind: InvocationEventKind,
    pub ts: DateTime<Utc>,
}
