//! Stubs compartidos por los tests de integración de comm-core.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use comm_core::{contract, FnStep, Generation, GenerativeWorker, Step, StepFailure, WorkerFailure};
use serde_json::json;
use tokio::sync::Barrier;

/// Worker que devuelve siempre la misma respuesta y cuenta llamadas.
#[derive(Debug)]
pub struct ScriptedWorker {
    reply: Result<String, WorkerFailure>,
    pub calls: AtomicUsize,
}

impl ScriptedWorker {
    pub fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self { reply: Ok(text.to_string()),
                        calls: AtomicUsize::new(0) })
    }

    pub fn failing(failure: WorkerFailure) -> Arc<Self> {
        Arc::new(Self { reply: Err(failure),
                        calls: AtomicUsize::new(0) })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeWorker for ScriptedWorker {
    async fn generate(&self, _prompt: &str) -> Result<Generation, WorkerFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map(Generation::new)
    }
}

/// Worker que devuelve el prompt recibido.
#[derive(Debug, Default)]
pub struct EchoWorker {
    pub calls: AtomicUsize,
}

impl EchoWorker {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeWorker for EchoWorker {
    async fn generate(&self, prompt: &str) -> Result<Generation, WorkerFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Generation::new(prompt))
    }
}

/// Worker que no responde hasta que todos los participantes de la barrera
/// hayan sido invocados.
#[derive(Debug)]
pub struct GatedWorker {
    barrier: Arc<Barrier>,
    reply: String,
}

impl GatedWorker {
    pub fn new(barrier: Arc<Barrier>, reply: &str) -> Arc<Self> {
        Arc::new(Self { barrier,
                        reply: reply.to_string() })
    }
}

#[async_trait]
impl GenerativeWorker for GatedWorker {
    async fn generate(&self, _prompt: &str) -> Result<Generation, WorkerFailure> {
        self.barrier.wait().await;
        Ok(Generation::new(self.reply.clone()))
    }
}

/// Pone la bandera en `true` cuando el futuro que lo contiene se descarta.
pub struct DropFlag(pub Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Worker que nunca responde; marca la bandera si su llamada se cancela.
#[derive(Debug, Default)]
pub struct HangingWorker {
    pub cancelled: Arc<AtomicBool>,
}

#[async_trait]
impl GenerativeWorker for HangingWorker {
    async fn generate(&self, _prompt: &str) -> Result<Generation, WorkerFailure> {
        let _flag = DropFlag(self.cancelled.clone());
        std::future::pending::<Result<Generation, WorkerFailure>>().await
    }
}

/// Atajo para armar grupos paralelos en los tests.
pub trait Shared {
    fn shared(self) -> Arc<dyn Step>;
}

impl<S: Step + 'static> Shared for S {
    fn shared(self) -> Arc<dyn Step> {
        Arc::new(self)
    }
}

/// Step que pasa `x` al worker `worker` y publica la respuesta en `field`.
pub fn worker_step(id: &'static str, worker: &'static str, field: &'static str) -> FnStep {
    let output = comm_core::Contract::new(format!("{id}_out")).field(field, comm_core::FieldKind::String);
    FnStep::new(id, contract!(format!("{id}_in") => { x: String }), output, move |input, services| async move {
        let prompt = input["x"].as_str().unwrap_or_default().to_string();
        let generation = services.generate(worker, &prompt).await?;
        Ok::<_, StepFailure>(json!({ field: generation.text }))
    })
}

/// Step de fan-in: `c = wc(a + "|" + b)`.
pub fn fan_in_step() -> FnStep {
    FnStep::new("c",
                contract!("c_in" => { a: String, b: String }),
                contract!("c_out" => { c: String }),
                |input, services| async move {
                    let prompt = format!("{}|{}",
                                         input["a"].as_str().unwrap_or_default(),
                                         input["b"].as_str().unwrap_or_default());
                    let generation = services.generate("wc", &prompt).await?;
                    Ok::<_, StepFailure>(json!({ "c": generation.text }))
                })
}
