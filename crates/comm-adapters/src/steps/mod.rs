pub mod agent_reply;
pub mod mediator;

pub use agent_reply::AgentReplyStep;
pub use mediator::{mediation_prompt, MediatorInput, MediatorOutput, MediatorStep};
