pub mod chat_completions;
pub mod echo;

pub use chat_completions::{parse_completion, ChatCompletionsWorker, ChatEndpoint};
pub use echo::EchoWorker;
