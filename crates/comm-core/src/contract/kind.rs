use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Contract;

/// Tipo primitivo declarado para un campo de un `Contract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    /// Objeto anidado con su propio contract.
    Object(Contract),
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Object(_) => "object",
        }
    }

    /// Compara sólo la forma (tipos y campos), ignorando nombres y strictness
    /// de contracts anidados.
    pub fn same_shape(&self, other: &FieldKind) -> bool {
        match (self, other) {
            (FieldKind::Object(a), FieldKind::Object(b)) => {
                a.len() == b.len()
                && a.fields()
                    .all(|(name, kind)| b.get(name).map(|k| k.same_shape(kind)).unwrap_or(false))
            }
            (a, b) => a.name() == b.name(),
        }
    }
}

/// Nombre del tipo JSON de un valor, para mensajes de error.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
