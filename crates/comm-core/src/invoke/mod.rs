//! Invoker: ejecuta un pipeline comprometido contra un input concreto.

mod invocation;
mod invoker;
pub mod merge;

pub use invocation::{Invocation, StageRecord};
pub use invoker::Invoker;
pub use merge::merge_json;
