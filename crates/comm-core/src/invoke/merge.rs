//! Fusión determinista de registros JSON.
//!
//! Merge "shallow": las claves de `b` reemplazan a las de `a`. Es la regla con
//! la que el output de un stage se incorpora al contexto de la invocación y
//! con la que se unen los outputs de un grupo paralelo (en orden posicional).

use serde_json::Value;

/// Merge shallow: keys from `b` override keys from `a` when both are objects.
/// Cuando alguno de los dos valores no es objeto, `b` tiene precedencia.
pub fn merge_json(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Object(ma), Value::Object(mb)) => {
            let mut out = ma.clone();
            for (k, v) in mb.iter() {
                out.insert(k.clone(), v.clone());
            }
            Value::Object(out)
        }
        // Non-objects: override
        (_, other) => other.clone(),
    }
}
