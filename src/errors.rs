use comm_core::{TopologyError, WorkerFailure};
use thiserror::Error;

/// Errores de la aplicación (fuera de una invocación).
///
/// Los fallos de una invocación no pasan por aquí: se reportan como
/// `boundary::ChatFailure`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Uso inválido: {0}")]
    Usage(String),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error de serialización: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Topología inválida: {0}")]
    Topology(#[from] TopologyError),
    #[error("Error al preparar workers: {0}")]
    Worker(#[from] WorkerFailure),
}

impl AppError {
    /// Código de salida del binario: 2 = uso, 5 = configuración/interno.
    /// (4 queda reservado para invocaciones fallidas.)
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Usage(_) => 2,
            _ => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_variant_format() {
        let err = AppError::Config("mala configuración".into());
        assert_eq!(err.to_string(), "Error de configuración: mala configuración");
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn io_variant_from() {
        let err: AppError = std::io::Error::other("falló IO").into();
        assert_eq!(err.to_string(), "Error en IO: falló IO");
    }

    #[test]
    fn topology_variant_from() {
        let err: AppError = TopologyError::EmptyPipeline { pipeline: "chat".into() }.into();
        assert_eq!(err.to_string(), "Topología inválida: pipeline `chat` has no stages");
    }

    #[test]
    fn usage_exit_code() {
        assert_eq!(AppError::Usage("--pipeline".into()).exit_code(), 2);
    }
}
