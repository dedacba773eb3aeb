//! Snapshot de sólo lectura de la topología de un pipeline.
//!
//! Sirve para diagnóstico y tests: orden de stages, ids de steps y contracts.
//! Incluye un `topology_hash` determinista (canonical JSON + blake3) que no
//! depende de si el pipeline ya fue comprometido.

use serde::Serialize;
use serde_json::json;

use super::Stage;
use crate::constants::ENGINE_VERSION;
use crate::contract::Contract;
use crate::hashing::hash_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageMode {
    Single,
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSnapshot {
    pub id: String,
    pub input_contract: Contract,
    pub output_contract: Contract,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageSnapshot {
    pub index: usize,
    pub mode: StageMode,
    pub steps: Vec<StepSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopologySnapshot {
    pub pipeline_id: String,
    pub description: String,
    pub input_contract: Contract,
    pub output_contract: Contract,
    pub stages: Vec<StageSnapshot>,
    pub topology_hash: String,
}

impl TopologySnapshot {
    pub(crate) fn capture(id: &str,
                          description: &str,
                          input: &Contract,
                          output: &Contract,
                          stages: &[Stage])
                          -> Self {
        let stages: Vec<StageSnapshot> =
            stages.iter()
                  .enumerate()
                  .map(|(index, stage)| StageSnapshot { index,
                                                        mode: if stage.is_parallel() {
                                                            StageMode::Parallel
                                                        } else {
                                                            StageMode::Single
                                                        },
                                                        steps: stage.steps()
                                                                    .iter()
                                                                    .map(|s| StepSnapshot { id: s.id().to_string(),
                                                                                            input_contract: s.input_contract().clone(),
                                                                                            output_contract: s.output_contract().clone() })
                                                                    .collect() })
                  .collect();

        let topology_hash = hash_value(&json!({
            "engine_version": ENGINE_VERSION,
            "pipeline_id": id,
            "input_contract": input,
            "output_contract": output,
            "stages": stages,
        }));

        Self { pipeline_id: id.to_string(),
               description: description.to_string(),
               input_contract: input.clone(),
               output_contract: output.clone(),
               stages,
               topology_hash }
    }

    /// Ids de steps por stage, en orden. Útil para aserciones compactas.
    pub fn step_ids(&self) -> Vec<Vec<&str>> {
        self.stages
            .iter()
            .map(|s| s.steps.iter().map(|st| st.id.as_str()).collect())
            .collect()
    }
}
