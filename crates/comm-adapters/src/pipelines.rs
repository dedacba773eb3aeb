//! Fábricas de pipelines.
//!
//! - `check-en` (id `chat`): supporter y examiner responden en paralelo al
//!   texto del usuario; luego el mediador integra ambas respuestas.
//! - `baseline`: un único agente sin persona, para comparar.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use comm_core::{contract, CommittedPipeline, Contract, Pipeline, Step, Strictness, TopologyError};
use thiserror::Error;

use crate::agents::AgentRole;
use crate::steps::{AgentReplyStep, MediatorStep};

pub const CHECK_EN_PIPELINE_ID: &str = "chat";
pub const BASELINE_PIPELINE_ID: &str = "baseline";

fn chat_input(strictness: Strictness) -> Contract {
    contract!("chat.input" => { userMessage: String }).with_strictness(strictness)
}

/// Pipeline de feedback multi-agente.
pub fn check_en_pipeline(strictness: Strictness) -> Result<CommittedPipeline, TopologyError> {
    let supporter: Arc<dyn Step> =
        Arc::new(AgentReplyStep::new("supporter-reply", AgentRole::Supporter, "userMessage", "supporterResponse"));
    let examiner: Arc<dyn Step> =
        Arc::new(AgentReplyStep::new("examiner-reply", AgentRole::Examiner, "userMessage", "examinerResponse"));

    Pipeline::new(CHECK_EN_PIPELINE_ID,
                  "Supporter and examiner agents review the user's English in parallel; the mediator integrates both",
                  chat_input(strictness),
                  contract!("chat.output" => {
                      supporterResponse: String,
                      examinerResponse: String,
                      mediatorResponse: String,
                  })).parallel(vec![supporter, examiner])
                     .then(MediatorStep::new())
                     .commit()
}

/// Pipeline de un solo agente sin persona.
pub fn baseline_pipeline(strictness: Strictness) -> Result<CommittedPipeline, TopologyError> {
    Pipeline::new(BASELINE_PIPELINE_ID,
                  "Baseline agent reviews the user's English",
                  chat_input(strictness),
                  contract!("baseline.output" => { baselineResponse: String }))
        .then(AgentReplyStep::new("baseline-reply", AgentRole::Baseline, "userMessage", "baselineResponse"))
        .commit()
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown pipeline `{0}` (expected check-en or baseline)")]
pub struct UnknownPipeline(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineKind {
    #[default]
    CheckEn,
    Baseline,
}

impl PipelineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineKind::CheckEn => "check-en",
            PipelineKind::Baseline => "baseline",
        }
    }

    pub fn build(self, strictness: Strictness) -> Result<CommittedPipeline, TopologyError> {
        match self {
            PipelineKind::CheckEn => check_en_pipeline(strictness),
            PipelineKind::Baseline => baseline_pipeline(strictness),
        }
    }
}

impl FromStr for PipelineKind {
    type Err = UnknownPipeline;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "check-en" | "chat" => Ok(PipelineKind::CheckEn),
            "baseline" => Ok(PipelineKind::Baseline),
            other => Err(UnknownPipeline(other.to_string())),
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
