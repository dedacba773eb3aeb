//! Pipeline: composición ordenada de stages.
//!
//! Ciclo de vida:
//! 1. `Pipeline::new` + `add_stage` / `then` / `parallel` (build-time, mutable).
//! 2. `commit()` valida la topología completa y la congela en un
//!    `CommittedPipeline` (inmutable, `Send + Sync`, compartible entre
//!    invocaciones concurrentes).
//! 3. Tras `commit()`, `add_stage` falla con `AlreadyCommitted`.
//!
//! Chequeos de `commit()`:
//! - al menos un stage, ningún grupo paralelo vacío, ids de steps únicos;
//! - el input de cada step es satisfacible por el contexto acumulado
//!   (input del pipeline superpuesto con los outputs previos);
//! - los outputs de un grupo paralelo se pueden fusionar sin ambigüedad;
//! - el contexto final satisface el output declarado del pipeline (un output
//!   estricto se comprueba sobre la proyección que recibe el llamador).

mod stage;
mod topology;

pub use stage::Stage;
pub use topology::{StageMode, StageSnapshot, StepSnapshot, TopologySnapshot};

use std::collections::HashSet;
use std::sync::Arc;

use crate::contract::{Contract, Strictness};
use crate::errors::{InvocationFailure, TopologyError};
use crate::step::Step;

/// Builder de un pipeline (estado previo a `commit()`).
#[derive(Debug)]
pub struct Pipeline {
    id: String,
    description: String,
    input_contract: Contract,
    output_contract: Contract,
    stages: Vec<Stage>,
    /// Primer error diferido por las variantes encadenables (`then`, `parallel`).
    deferred: Option<TopologyError>,
    frozen: Option<CommittedPipeline>,
}

impl Pipeline {
    pub fn new(id: impl Into<String>, description: impl Into<String>, input: Contract, output: Contract) -> Self {
        Self { id: id.into(),
               description: description.into(),
               input_contract: input,
               output_contract: output,
               stages: Vec::new(),
               deferred: None,
               frozen: None }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_committed(&self) -> bool {
        self.frozen.is_some()
    }

    /// Añade un stage al final. Falla si el pipeline ya fue comprometido.
    pub fn add_stage(&mut self, stage: Stage) -> Result<(), TopologyError> {
        if self.frozen.is_some() {
            return Err(TopologyError::AlreadyCommitted { pipeline: self.id.clone() });
        }
        self.stages.push(stage);
        Ok(())
    }

    /// Variante encadenable de `add_stage` para un único step. Un error se
    /// difiere hasta el próximo `commit()`.
    pub fn then(mut self, step: impl Step + 'static) -> Self {
        self.push_deferred(Stage::single(step));
        self
    }

    /// Variante encadenable de `add_stage` para un grupo paralelo.
    pub fn parallel(mut self, steps: Vec<Arc<dyn Step>>) -> Self {
        self.push_deferred(Stage::parallel(steps));
        self
    }

    fn push_deferred(&mut self, stage: Stage) {
        if let Err(e) = self.add_stage(stage) {
            log::warn!("{e}");
            self.deferred.get_or_insert(e);
        }
    }

    /// Valida la topología y la congela.
    ///
    /// Llamar `commit()` de nuevo sin cambios devuelve el mismo pipeline
    /// comprometido.
    pub fn commit(&mut self) -> Result<CommittedPipeline, TopologyError> {
        if let Some(e) = self.deferred.take() {
            return Err(e);
        }
        if let Some(frozen) = &self.frozen {
            return Ok(frozen.clone());
        }

        let stage_outputs = self.check_topology()?;
        let snapshot = self.describe();
        let stages = self.stages
                         .iter()
                         .zip(stage_outputs)
                         .enumerate()
                         .map(|(index, (stage, output_contract))| CommittedStage { index,
                                                                                  parallel: stage.is_parallel(),
                                                                                  steps: stage.steps().to_vec(),
                                                                                  output_contract })
                         .collect();

        let committed = CommittedPipeline { inner: Arc::new(Frozen { id: self.id.clone(),
                                                                     input_contract: self.input_contract.clone(),
                                                                     output_contract: self.output_contract.clone(),
                                                                     stages,
                                                                     snapshot }) };
        log::debug!("pipeline `{}` committed ({} stages, topology {})",
                    self.id,
                    self.stages.len(),
                    committed.topology_hash());
        self.frozen = Some(committed.clone());
        Ok(committed)
    }

    /// Devuelve el contract de output (fusionado) de cada stage.
    fn check_topology(&self) -> Result<Vec<Contract>, TopologyError> {
        if self.stages.is_empty() {
            return Err(TopologyError::EmptyPipeline { pipeline: self.id.clone() });
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut available = self.input_contract.clone();
        let mut outputs = Vec::with_capacity(self.stages.len());

        for (index, stage) in self.stages.iter().enumerate() {
            if stage.steps().is_empty() {
                return Err(TopologyError::EmptyParallelGroup { stage: index });
            }
            for step in stage.steps() {
                if !seen.insert(step.id()) {
                    return Err(TopologyError::DuplicateStepId { step: step.id().to_string() });
                }
                available.satisfies(step.input_contract())
                         .map_err(|reason| TopologyError::UnsatisfiedInput { stage: index,
                                                                             step: step.id().to_string(),
                                                                             reason })?;
            }
            let produced = stage.output_contract(index)?;
            available = available.overlay(&produced);
            outputs.push(produced);
        }

        // El output devuelto es la proyección del contexto, así que aquí sólo
        // cuentan presencia y tipos; la estrictez se aplica a la proyección.
        let returned = self.output_contract.clone().with_strictness(Strictness::Lenient);
        available.satisfies(&returned)
                 .map_err(|reason| TopologyError::UnsatisfiedOutput { reason })?;
        Ok(outputs)
    }

    /// Snapshot de la topología actual (no ejecuta nada).
    pub fn describe(&self) -> TopologySnapshot {
        TopologySnapshot::capture(&self.id,
                                  &self.description,
                                  &self.input_contract,
                                  &self.output_contract,
                                  &self.stages)
    }
}

/// Stage congelado con su contract de output ya fusionado.
#[derive(Debug)]
pub(crate) struct CommittedStage {
    pub(crate) index: usize,
    pub(crate) parallel: bool,
    pub(crate) steps: Vec<Arc<dyn Step>>,
    pub(crate) output_contract: Contract,
}

#[derive(Debug)]
struct Frozen {
    id: String,
    input_contract: Contract,
    output_contract: Contract,
    stages: Vec<CommittedStage>,
    snapshot: TopologySnapshot,
}

/// Pipeline comprometido: inmutable y barato de clonar.
#[derive(Debug, Clone)]
pub struct CommittedPipeline {
    inner: Arc<Frozen>,
}

impl CommittedPipeline {
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn input_contract(&self) -> &Contract {
        &self.inner.input_contract
    }

    pub fn output_contract(&self) -> &Contract {
        &self.inner.output_contract
    }

    pub fn topology_hash(&self) -> &str {
        &self.inner.snapshot.topology_hash
    }

    pub fn describe(&self) -> TopologySnapshot {
        self.inner.snapshot.clone()
    }

    pub fn stage_count(&self) -> usize {
        self.inner.stages.len()
    }

    pub(crate) fn stages(&self) -> &[CommittedStage] {
        &self.inner.stages
    }
}

/// Algo que el invoker puede ejecutar. Un `Pipeline` sin comprometer
/// devuelve `NotCommitted`.
pub trait AsCommitted {
    fn pipeline_id(&self) -> &str;

    fn as_committed(&self) -> Result<CommittedPipeline, InvocationFailure>;
}

impl AsCommitted for CommittedPipeline {
    fn pipeline_id(&self) -> &str {
        self.id()
    }

    fn as_committed(&self) -> Result<CommittedPipeline, InvocationFailure> {
        Ok(self.clone())
    }
}

impl AsCommitted for Pipeline {
    fn pipeline_id(&self) -> &str {
        self.id()
    }

    fn as_committed(&self) -> Result<CommittedPipeline, InvocationFailure> {
        self.frozen
            .clone()
            .ok_or_else(|| InvocationFailure::NotCommitted { pipeline: self.id.clone() })
    }
}
