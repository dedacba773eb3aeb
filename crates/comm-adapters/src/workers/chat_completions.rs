//! Worker HTTP contra un endpoint `/chat/completions` compatible con OpenAI.
//!
//! Cada worker representa un agente: sus instrucciones viajan como mensaje
//! `system` y el prompt del step como mensaje `user`. Varios agentes pueden
//! compartir el mismo `reqwest::Client` (pool de conexiones).
//!
//! Mapeo de fallos:
//! - error de transporte → `Unreachable` (o `Timeout` si venció el plazo)
//! - status no 2xx → `Status { code, body }`
//! - cuerpo sin `choices[0].message.content` → `Malformed`

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use comm_core::{Generation, GenerativeWorker, WorkerFailure};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Dónde y con qué modelo generar.
#[derive(Clone, PartialEq, Eq)]
pub struct ChatEndpoint {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl Default for ChatEndpoint {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_BASE.to_string(),
               api_key: None,
               model: DEFAULT_MODEL.to_string(),
               timeout: DEFAULT_TIMEOUT }
    }
}

impl ChatEndpoint {
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Cliente HTTP con el timeout del endpoint.
    pub fn client(&self) -> Result<Client, WorkerFailure> {
        Client::builder().timeout(self.timeout)
                         .build()
                         .map_err(|e| WorkerFailure::Unreachable(format!("http client: {e}")))
    }
}

// La API key no se imprime en logs.
impl fmt::Debug for ChatEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatEndpoint")
         .field("base_url", &self.base_url)
         .field("api_key", &self.api_key.as_ref().map(|_| "***"))
         .field("model", &self.model)
         .field("timeout", &self.timeout)
         .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatCompletionsWorker {
    client: Client,
    endpoint: ChatEndpoint,
    agent: String,
    instructions: String,
}

impl ChatCompletionsWorker {
    pub fn new(endpoint: ChatEndpoint,
               agent: impl Into<String>,
               instructions: impl Into<String>)
               -> Result<Self, WorkerFailure> {
        let client = endpoint.client()?;
        Ok(Self::with_client(client, endpoint, agent, instructions))
    }

    /// Reutiliza un cliente ya construido (compartido entre agentes).
    pub fn with_client(client: Client,
                       endpoint: ChatEndpoint,
                       agent: impl Into<String>,
                       instructions: impl Into<String>)
                       -> Self {
        Self { client,
               endpoint,
               agent: agent.into(),
               instructions: instructions.into() }
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn endpoint(&self) -> &ChatEndpoint {
        &self.endpoint
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> CompletionRequest<'a> {
        CompletionRequest { model: &self.endpoint.model,
                            messages: [ChatMessage { role: "system",
                                                     content: &self.instructions },
                                       ChatMessage { role: "user",
                                                     content: prompt }] }
    }
}

fn transport_failure(e: reqwest::Error) -> WorkerFailure {
    if e.is_timeout() {
        WorkerFailure::Timeout
    } else {
        WorkerFailure::Unreachable(e.to_string())
    }
}

/// Extrae el texto generado de un cuerpo de respuesta de chat completions.
pub fn parse_completion(body: &str) -> Result<Generation, WorkerFailure> {
    let parsed: CompletionResponse =
        serde_json::from_str(body).map_err(|e| WorkerFailure::Malformed(format!("invalid completion body: {e}")))?;
    parsed.choices
          .into_iter()
          .next()
          .and_then(|choice| choice.message.content)
          .map(Generation::new)
          .ok_or_else(|| WorkerFailure::Malformed("missing choices[0].message.content".to_string()))
}

#[async_trait]
impl GenerativeWorker for ChatCompletionsWorker {
    async fn generate(&self, prompt: &str) -> Result<Generation, WorkerFailure> {
        let url = self.endpoint.completions_url();
        log::debug!("agent `{}` -> POST {url} (model {})", self.agent, self.endpoint.model);

        let mut request = self.client.post(&url).json(&self.request_body(prompt));
        if let Some(key) = &self.endpoint.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await.map_err(transport_failure)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_failure)?;
        if !status.is_success() {
            log::warn!("agent `{}` got status {status}", self.agent);
            return Err(WorkerFailure::Status { code: status.as_u16(),
                                               body });
        }
        parse_completion(&body)
    }
}
