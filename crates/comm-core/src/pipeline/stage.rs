use std::sync::Arc;

use crate::contract::Contract;
use crate::errors::TopologyError;
use crate::step::Step;

/// Una posición en el orden de ejecución del pipeline.
#[derive(Debug, Clone)]
pub enum Stage {
    /// Un único step.
    Single(Arc<dyn Step>),
    /// Grupo de steps que comparten el mismo input y corren en paralelo.
    /// Sus outputs se fusionan campo a campo.
    Parallel(Vec<Arc<dyn Step>>),
}

impl Stage {
    pub fn single(step: impl Step + 'static) -> Self {
        Stage::Single(Arc::new(step))
    }

    pub fn parallel(steps: Vec<Arc<dyn Step>>) -> Self {
        Stage::Parallel(steps)
    }

    pub fn steps(&self) -> &[Arc<dyn Step>] {
        match self {
            Stage::Single(step) => std::slice::from_ref(step),
            Stage::Parallel(steps) => steps,
        }
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, Stage::Parallel(_))
    }

    pub fn step_ids(&self) -> Vec<&str> {
        self.steps().iter().map(|s| s.id()).collect()
    }

    /// Contract del output del stage: el del step, o la fusión de los
    /// contracts de todos los miembros del grupo. `index` es la posición del
    /// stage en el pipeline y sólo se usa para reportar errores.
    pub fn output_contract(&self, index: usize) -> Result<Contract, TopologyError> {
        let mut steps = self.steps().iter();
        let first = steps.next().ok_or(TopologyError::EmptyParallelGroup { stage: index })?;
        let mut merged = first.output_contract().clone();
        for step in steps {
            merged = merged.merge(step.output_contract())?;
        }
        Ok(merged)
    }
}

/// Helper para construir grupos paralelos heterogéneos sin escribir
/// `Arc::new(...) as Arc<dyn Step>` en cada miembro.
#[macro_export]
macro_rules! parallel {
    ($($step:expr),+ $(,)?) => {
        $crate::pipeline::Stage::Parallel(vec![$(::std::sync::Arc::new($step) as ::std::sync::Arc<dyn $crate::step::Step>),+])
    };
}
