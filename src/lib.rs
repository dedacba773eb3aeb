//! CommFlow Rust Library
//!
//! Capa de aplicación sobre `comm-core` y `comm-adapters`:
//! - `config`: variables de entorno (.env) → configuración de workers.
//! - `errors`: errores de la aplicación y códigos de salida.
//! - `boundary`: tipos de request/response/failure y `ChatService`.
//! - `pacing`: ritmo de presentación de las respuestas de los agentes.
//!
//! Puede usarse desde `main.rs` o por otros clientes.

pub mod boundary;
pub mod config;
pub mod errors;
pub mod pacing;

pub use boundary::{ChatFailure, ChatRequest, ChatResponse, ChatService};
pub use config::WorkerConfig;
pub use errors::AppError;
pub use pacing::{Reveal, RevealSchedule};
