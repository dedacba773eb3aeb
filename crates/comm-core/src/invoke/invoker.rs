//! Core Invoker implementation
//!
//! Algoritmo de `invoke`:
//! 1. Validar el input contra el contract de entrada del pipeline.
//! 2. Recorrer los stages en orden, con un "contexto" que arranca siendo el
//!    input. Cada stage valida su input, ejecuta, valida el output de cada
//!    step contra su contract y lo fusiona en el contexto.
//! 3. Validar el contexto final contra el contract de salida y devolver sólo
//!    la proyección de esos campos.
//!
//! Cualquier fallo aborta la invocación; no hay reintentos aquí (la política
//! de reintentos, si existe, pertenece al worker).
//!
//! Fan-out: los miembros de un grupo paralelo se lanzan en un `JoinSet` sobre
//! el mismo snapshot del contexto. El grupo sólo tiene éxito si todos tienen
//! éxito; ante el primer fallo se abortan los miembros restantes. Descartar
//! el futuro de `invoke` descarta el `JoinSet` y cancela las llamadas en vuelo.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};
use tokio::task::JoinSet;
use uuid::Uuid;

use super::invocation::{Invocation, StageRecord};
use super::merge::merge_json;
use crate::constants::ENGINE_VERSION;
use crate::errors::{Boundary, InvocationFailure};
use crate::event::{EventStore, InvocationEventKind, NoopEventStore};
use crate::hashing::hash_value;
use crate::pipeline::{AsCommitted, CommittedPipeline, CommittedStage};
use crate::step::Step;
use crate::worker::Services;

/// Ejecuta pipelines comprometidos. No guarda estado por invocación, así que
/// un mismo `Invoker` puede atender invocaciones concurrentes.
#[derive(Debug, Clone)]
pub struct Invoker {
    services: Services,
    events: Arc<dyn EventStore>,
    deadline: Option<Duration>,
}

impl Invoker {
    pub fn new(services: Services) -> Self {
        Self { services,
               events: Arc::new(NoopEventStore),
               deadline: None }
    }

    /// Registra los eventos de cada invocación en `store`.
    pub fn with_event_store(mut self, store: Arc<dyn EventStore>) -> Self {
        self.events = store;
        self
    }

    /// Límite de tiempo total por invocación. Al vencer se cancelan las
    /// llamadas a workers en vuelo.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Ejecuta `pipeline` con `input` y devuelve sólo el output final.
    pub async fn invoke<P>(&self, pipeline: &P, input: Value) -> Result<Value, InvocationFailure>
        where P: AsCommitted + ?Sized
    {
        self.invoke_traced(pipeline, input).await.into_result()
    }

    /// Como `invoke`, pero devuelve el registro completo de la invocación.
    pub async fn invoke_traced<P>(&self, pipeline: &P, input: Value) -> Invocation
        where P: AsCommitted + ?Sized
    {
        let id = Uuid::new_v4();
        let pipeline_id = pipeline.pipeline_id().to_string();

        let committed = match pipeline.as_committed() {
            Ok(committed) => committed,
            Err(failure) => {
                log::error!("invocation {id}: {failure}");
                return Invocation { id,
                                    pipeline_id,
                                    input,
                                    stages: Vec::new(),
                                    outcome: Err(failure) };
            }
        };

        self.events
            .append_kind(id,
                         InvocationEventKind::InvocationStarted { pipeline_id: pipeline_id.clone(),
                                                                  topology_hash: committed.topology_hash().to_string() });
        log::debug!("invocation {id}: pipeline `{pipeline_id}` started");

        let mut stages = Vec::with_capacity(committed.stage_count());
        let run = self.run_stages(id, &committed, &input, &mut stages);
        let outcome = match self.deadline {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(outcome) => outcome,
                Err(_) => Err(InvocationFailure::DeadlineExceeded { limit_ms: limit.as_millis() as u64 }),
            },
            None => run.await,
        };

        match &outcome {
            Ok(_) => {
                let fingerprint = Self::fingerprint(&committed, &stages);
                self.events
                    .append_kind(id, InvocationEventKind::InvocationCompleted { fingerprint });
                log::debug!("invocation {id}: pipeline `{pipeline_id}` completed");
            }
            Err(failure) => {
                self.events.append_kind(id,
                                        InvocationEventKind::InvocationFailed { code: failure.code().to_string(),
                                                                                reason: failure.to_string() });
                log::warn!("invocation {id}: pipeline `{pipeline_id}` failed: {failure}");
            }
        }

        Invocation { id,
                     pipeline_id,
                     input,
                     stages,
                     outcome }
    }

    async fn run_stages(&self,
                        id: Uuid,
                        pipeline: &CommittedPipeline,
                        input: &Value,
                        records: &mut Vec<StageRecord>)
                        -> Result<Value, InvocationFailure> {
        pipeline.input_contract()
                .validate(input)
                .map_err(|reason| InvocationFailure::Validation { boundary: Boundary::PipelineInput, reason })?;

        let mut context = input.clone();
        for stage in pipeline.stages() {
            let step_ids: Vec<String> = stage.steps.iter().map(|s| s.id().to_string()).collect();
            self.events.append_kind(id,
                                    InvocationEventKind::StageStarted { stage_index: stage.index,
                                                                        step_ids: step_ids.clone() });
            log::debug!("invocation {id}: stage {} started {:?}", stage.index, step_ids);

            let output = match self.run_stage(stage, &context).await {
                Ok(output) => output,
                Err(failure) => {
                    self.events.append_kind(id,
                                            InvocationEventKind::StageFailed { stage_index: stage.index,
                                                                               step_id: failure.step_id()
                                                                                               .map(str::to_string),
                                                                               code: failure.code().to_string(),
                                                                               reason: failure.to_string() });
                    return Err(failure);
                }
            };

            let output_hash = hash_value(&output);
            self.events.append_kind(id,
                                    InvocationEventKind::StageFinished { stage_index: stage.index,
                                                                         output_hash: output_hash.clone() });
            log::debug!("invocation {id}: stage {} finished with {:?}",
                        stage.index,
                        stage.output_contract.field_names());

            context = merge_json(&context, &output);
            records.push(StageRecord { index: stage.index,
                                       step_ids,
                                       output,
                                       output_hash });
        }

        let contract = pipeline.output_contract();
        let output = contract.project(&context);
        contract.validate(&output)
                .map_err(|reason| InvocationFailure::Validation { boundary: Boundary::PipelineOutput, reason })?;
        Ok(output)
    }

    async fn run_stage(&self, stage: &CommittedStage, context: &Value) -> Result<Value, InvocationFailure> {
        for step in &stage.steps {
            step.input_contract()
                .validate(context)
                .map_err(|reason| InvocationFailure::Validation { boundary: Boundary::StageInput { stage: stage.index,
                                                                                                  step: step.id()
                                                                                                            .to_string() },
                                                                  reason })?;
        }

        if stage.parallel {
            return self.fan_out(stage, context).await;
        }

        let step = &stage.steps[0];
        let output = step.run(context.clone(), &self.services)
                         .await
                         .map_err(|failure| InvocationFailure::from_step(stage.index, step.id(), failure))?;
        check_output(stage.index, step.as_ref(), output)
    }

    /// Lanza todos los miembros del grupo en paralelo (todo o nada).
    async fn fan_out(&self, stage: &CommittedStage, context: &Value) -> Result<Value, InvocationFailure> {
        let mut set = JoinSet::new();
        for (position, step) in stage.steps.iter().enumerate() {
            let step = Arc::clone(step);
            let input = context.clone();
            let services = self.services.clone();
            set.spawn(async move {
                   let result = step.run(input, &services).await;
                   (position, result)
               });
        }

        let mut outputs: Vec<Option<Value>> = vec![None; stage.steps.len()];
        while let Some(joined) = set.join_next().await {
            let checked = match joined {
                Ok((position, result)) => {
                    let step = &stage.steps[position];
                    result.map_err(|failure| InvocationFailure::from_step(stage.index, step.id(), failure))
                          .and_then(|output| check_output(stage.index, step.as_ref(), output))
                          .map(|output| (position, output))
                }
                Err(e) => {
                    Err(InvocationFailure::Step { stage: stage.index,
                                                  step: stage.steps
                                                             .iter()
                                                             .map(|s| s.id())
                                                             .collect::<Vec<_>>()
                                                             .join("+"),
                                                  message: format!("member task did not complete: {e}") })
                }
            };
            match checked {
                Ok((position, output)) => outputs[position] = Some(output),
                Err(failure) => {
                    set.abort_all();
                    return Err(failure);
                }
            }
        }

        Ok(outputs.into_iter()
                  .flatten()
                  .fold(Value::Object(Map::new()), |acc, output| merge_json(&acc, &output)))
    }

    fn fingerprint(pipeline: &CommittedPipeline, stages: &[StageRecord]) -> String {
        let hashes: Vec<&str> = stages.iter().map(|s| s.output_hash.as_str()).collect();
        hash_value(&json!({
            "engine_version": ENGINE_VERSION,
            "topology_hash": pipeline.topology_hash(),
            "stage_output_hashes": hashes,
        }))
    }
}

/// Valida el output de un step contra su contract y lo proyecta a los campos
/// declarados.
fn check_output(stage: usize, step: &dyn Step, output: Value) -> Result<Value, InvocationFailure> {
    let contract = step.output_contract();
    contract.validate(&output)
            .map_err(|reason| InvocationFailure::Validation { boundary: Boundary::StageOutput { stage,
                                                                                               step: step.id()
                                                                                                         .to_string() },
                                                              reason })?;
    Ok(contract.project(&output))
}
