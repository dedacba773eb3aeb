//! Constantes del motor core.
//!
//! Valores estáticos que participan en el cálculo de hashes de topología y
//! fingerprints de invocación.

/// Versión lógica del executor. Forma parte del input de los hashes, de modo
/// que un cambio de versión invalida los fingerprints aunque la topología y
/// los datos no cambien.
pub const ENGINE_VERSION: &str = "P1.0";
