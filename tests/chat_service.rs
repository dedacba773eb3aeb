//! Tests de la frontera `ChatService` con workers en memoria.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use comm_adapters::{check_en_pipeline, AgentRole, EchoWorker, PipelineKind};
use comm_core::{Generation, GenerativeWorker, Invoker, Services, Strictness, WorkerFailure, WorkerRegistry};
use commflow_rust::{ChatRequest, ChatResponse, ChatService, RevealSchedule, WorkerConfig};
use serde_json::json;

#[derive(Debug)]
struct Slow;

#[async_trait]
impl GenerativeWorker for Slow {
    async fn generate(&self, prompt: &str) -> Result<Generation, WorkerFailure> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Generation::new(prompt))
    }
}

fn offline_config() -> WorkerConfig {
    WorkerConfig { offline: true,
                   ..WorkerConfig::default() }
}

#[tokio::test]
async fn offline_service_answers_with_all_three_agents() {
    let service = ChatService::from_config(PipelineKind::CheckEn, &offline_config()).expect("service");
    let response = service.chat(&ChatRequest::new("She don't like it.")).await.expect("chat");

    assert_eq!(response,
               ChatResponse { supporter_response: "[Supporter] She don't like it.".into(),
                              examiner_response: "[Examiner] She don't like it.".into(),
                              mediator_response: "[Mediator] User text: \"She don't like it.\"".into() });
}

#[tokio::test]
async fn baseline_output_is_not_a_chat_response() {
    let service = ChatService::from_config(PipelineKind::Baseline, &offline_config()).expect("service");
    let raw = service.respond(&ChatRequest::new("hi")).await.expect("respond");
    assert_eq!(raw, json!({"baselineResponse": "[Baseline] hi"}));

    let failure = service.chat(&ChatRequest::new("hi")).await.unwrap_err();
    assert_eq!(failure.code, "validation_error");
}

#[tokio::test]
async fn deadline_is_reported_as_worker_failure() {
    let mut registry = WorkerRegistry::new();
    registry.register(AgentRole::Supporter.registry_name(), Arc::new(Slow))
            .register(AgentRole::Examiner.registry_name(), Arc::new(EchoWorker::new("Examiner")))
            .register(AgentRole::Mediator.registry_name(), Arc::new(EchoWorker::new("Mediator")));
    let invoker = Invoker::new(Services::new(registry)).with_deadline(Duration::from_millis(50));
    let service = ChatService::new(PipelineKind::CheckEn, check_en_pipeline(Strictness::Lenient).unwrap(), invoker);

    let failure = service.chat(&ChatRequest::new("hi")).await.unwrap_err();
    assert_eq!(failure.code, "worker_failure");
    assert_eq!(failure.stage, None);
    assert_eq!(failure.detail, "invocation exceeded its deadline of 50 ms");
}

#[tokio::test]
async fn missing_agent_is_a_worker_failure_with_stage() {
    // registro sin mediador
    let registry = ["baselineAgent", "supporterAgent", "examinerAgent"].into_iter()
                                                                      .fold(WorkerRegistry::new(), |r, name| {
                                                                          r.with(name, EchoWorker::new(name))
                                                                      });
    assert!(registry.resolve("mediatorAgent").is_err());

    let service = ChatService::new(PipelineKind::CheckEn,
                                   check_en_pipeline(Strictness::Lenient).unwrap(),
                                   Invoker::new(Services::new(registry)));
    let failure = service.chat(&ChatRequest::new("hi")).await.unwrap_err();
    let body = serde_json::to_value(&failure).unwrap();
    assert_eq!(body,
               json!({
                   "code": "worker_failure",
                   "stage": "mediator-reply",
                   "detail": "stage 1 step `mediator-reply` worker failure: worker `mediatorAgent` is not registered",
               }));
}

#[tokio::test]
async fn paced_reveal_follows_the_schedule_not_completion_order() {
    let service = ChatService::from_config(PipelineKind::CheckEn, &offline_config()).unwrap();
    let output = service.respond(&ChatRequest::new("Me and him goes.")).await.unwrap();

    let mut roles = Vec::new();
    RevealSchedule::check_en().with_delay(Duration::ZERO)
                              .play(&output, |reveal| roles.push(reveal.role))
                              .await;
    assert_eq!(roles, vec![AgentRole::Supporter, AgentRole::Examiner, AgentRole::Mediator]);
}
