//! Definiciones relacionadas a Steps.
//!
//! Un Step es una unidad de trabajo con nombre que declara un contract de
//! entrada y uno de salida. Este módulo define:
//! - `Step`: interfaz neutra (JSON) usada por el invoker.
//! - `TypedStep`: interfaz de alto nivel con tipos serde; se adapta a `Step`.
//! - `FnStep`: step declarado con un closure async.

pub mod definition;
pub mod func;
pub mod typed;

pub use definition::Step;
pub use func::FnStep;
pub use typed::TypedStep;
