use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::Step;
use crate::contract::Contract;
use crate::errors::StepFailure;
use crate::worker::Services;

type StepFuture = Pin<Box<dyn Future<Output = Result<Value, StepFailure>> + Send>>;
type StepFn = dyn Fn(Value, Services) -> StepFuture + Send + Sync;

/// Step declarado en línea a partir de un closure async.
///
/// ```ignore
/// let echo = FnStep::new("echo", input, output, |input, _services| async move {
///     Ok(serde_json::json!({ "echo": input["x"] }))
/// });
/// ```
#[derive(Clone)]
pub struct FnStep {
    id: String,
    input: Contract,
    output: Contract,
    exec: Arc<StepFn>,
}

impl FnStep {
    pub fn new<F, Fut>(id: impl Into<String>, input: Contract, output: Contract, exec: F) -> Self
        where F: Fn(Value, Services) -> Fut + Send + Sync + 'static,
              Fut: Future<Output = Result<Value, StepFailure>> + Send + 'static
    {
        Self { id: id.into(),
               input,
               output,
               exec: Arc::new(move |input, services| Box::pin(exec(input, services))) }
    }
}

impl fmt::Debug for FnStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStep")
         .field("id", &self.id)
         .field("input", &self.input.name())
         .field("output", &self.output.name())
         .finish()
    }
}

#[async_trait]
impl Step for FnStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn input_contract(&self) -> &Contract {
        &self.input
    }

    fn output_contract(&self) -> &Contract {
        &self.output
    }

    async fn run(&self, input: Value, services: &Services) -> Result<Value, StepFailure> {
        (self.exec)(input, services.clone()).await
    }
}
