//! comm-core: executor de pipelines de steps tipados.
//!
//! Piezas, de la hoja hacia arriba:
//! - `contract`: forma declarada (campo -> tipo) de un payload.
//! - `step`: unidad de trabajo con contracts de entrada/salida.
//! - `pipeline`: stages ordenados con fan-out/fan-in y `commit()`.
//! - `invoke`: ejecución de un pipeline comprometido.
//! - `worker`: seam hacia los Generative Workers (registro + servicios).
pub mod constants;
pub mod contract;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod invoke;
pub mod pipeline;
pub mod step;
pub mod worker;

pub use contract::{Contract, FieldKind, Strictness};
pub use errors::{Boundary, FailureReason, InvocationFailure, StepFailure, TopologyError, WorkerFailure};
pub use event::{EventStore, InMemoryEventStore, InvocationEvent, InvocationEventKind, NoopEventStore};
pub use invoke::{merge_json, Invocation, Invoker, StageRecord};
pub use pipeline::{AsCommitted, CommittedPipeline, Pipeline, Stage, TopologySnapshot};
pub use step::{FnStep, Step, TypedStep};
pub use worker::{Generation, GenerativeWorker, Services, WorkerRegistry};

// Las macros `contract!` y `parallel!` se exportan en la raíz del crate.

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    // Pipeline mínimo de un solo stage para verificar el flujo completo.
    fn upper() -> FnStep {
        FnStep::new("upper",
                    contract!("upper_in" => { text: String }),
                    contract!("upper_out" => { shout: String }),
                    |input, _services| async move {
                        let text = input["text"].as_str().unwrap_or_default().to_uppercase();
                        Ok(json!({ "shout": text, "ignored": true }))
                    })
    }

    #[tokio::test]
    async fn single_stage_pipeline_projects_final_output() {
        let mut pipeline = Pipeline::new("shout",
                                         "uppercases text",
                                         contract!("in" => { text: String }),
                                         contract!("out" => { shout: String })).then(upper());
        let committed = pipeline.commit().expect("valid topology");

        let store = Arc::new(InMemoryEventStore::new());
        let invoker = Invoker::new(Services::default()).with_event_store(store.clone());
        let invocation = invoker.invoke_traced(&committed, json!({"text": "hi", "extra": 1})).await;

        assert_eq!(invocation.output(), Some(&json!({"shout": "HI"})));
        assert_eq!(invocation.stages.len(), 1);
        // el output del step se proyecta a su contract antes de entrar al contexto
        assert_eq!(invocation.stages[0].output, json!({"shout": "HI"}));

        let codes: Vec<_> = store.list(invocation.id).iter().map(|e| e.kind.code()).collect();
        assert_eq!(codes, vec!["I", "S", "F", "C"]);
    }

    #[tokio::test]
    async fn invoking_an_uncommitted_pipeline_is_rejected() {
        let pipeline = Pipeline::new("shout",
                                     "",
                                     contract!("in" => { text: String }),
                                     contract!("out" => { shout: String })).then(upper());
        let err = Invoker::new(Services::default()).invoke(&pipeline, json!({"text": "hi"}))
                                                   .await
                                                   .unwrap_err();
        assert_eq!(err, InvocationFailure::NotCommitted { pipeline: "shout".into() });
    }

    #[tokio::test]
    async fn invoking_through_the_builder_after_commit_works() {
        let mut pipeline = Pipeline::new("shout",
                                         "",
                                         contract!("in" => { text: String }),
                                         contract!("out" => { shout: String })).then(upper());
        pipeline.commit().expect("valid topology");
        let out = Invoker::new(Services::default()).invoke(&pipeline, json!({"text": "ok"}))
                                                   .await
                                                   .expect("committed");
        assert_eq!(out, json!({"shout": "OK"}));
    }

    #[tokio::test]
    async fn input_contract_violation_fails_fast() {
        let mut pipeline = Pipeline::new("shout",
                                         "",
                                         contract!("in" => { text: String }),
                                         contract!("out" => { shout: String })).then(upper());
        let committed = pipeline.commit().expect("valid topology");
        let err = Invoker::new(Services::default()).invoke(&committed, json!({"text": 3}))
                                                   .await
                                                   .unwrap_err();
        assert!(matches!(err, InvocationFailure::Validation { boundary: Boundary::PipelineInput, .. }));
    }
}
