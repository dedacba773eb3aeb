//! Contracts de esquema.
//!
//! Un `Contract` es un mapa ordenado `campo -> FieldKind`. Se chequea en
//! fronteras bien definidas (entrada/salida de pipeline y de cada stage) en
//! lugar de validaciones ad hoc dentro de los steps.
//!
//! - `validate`: payload contra contract (runtime, sin efectos).
//! - `satisfies`: contract contra contract (estático, usado por `commit()`).
//! - `merge`: unión de campos para grupos paralelos; un mismo campo con tipos
//!   distintos es un merge ambiguo.

mod kind;
pub mod macros;

pub use kind::FieldKind;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{FailureReason, TopologyError};
use kind::value_kind;

/// Política frente a campos no declarados.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Campos extra se toleran.
    #[default]
    Lenient,
    /// Campos extra se rechazan con `UnknownField`.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    name: String,
    fields: IndexMap<String, FieldKind>,
    #[serde(default)]
    strictness: Strictness,
}

impl Contract {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               fields: IndexMap::new(),
               strictness: Strictness::Lenient }
    }

    /// Declara (o redeclara) un campo.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn strict(self) -> Self {
        self.with_strictness(Strictness::Strict)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    pub fn get(&self, field: &str) -> Option<&FieldKind> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldKind)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Valida `payload` contra el contract, recursivamente.
    pub fn validate(&self, payload: &Value) -> Result<(), FailureReason> {
        self.validate_at(payload, None)
    }

    fn validate_at(&self, payload: &Value, prefix: Option<&str>) -> Result<(), FailureReason> {
        let map = payload.as_object()
                         .ok_or_else(|| FailureReason::NotAnObject { path: prefix.unwrap_or("$").to_string(),
                                                                     found: value_kind(payload).to_string() })?;
        for (name, kind) in &self.fields {
            let path = join_path(prefix, name);
            let value = map.get(name).ok_or_else(|| FailureReason::MissingField { path: path.clone() })?;
            match kind {
                FieldKind::Object(inner) => inner.validate_at(value, Some(&path))?,
                primitive => {
                    let found = value_kind(value);
                    if primitive.name() != found {
                        return Err(FailureReason::KindMismatch { path,
                                                                 expected: primitive.name().to_string(),
                                                                 found: found.to_string() });
                    }
                }
            }
        }
        if self.strictness == Strictness::Strict {
            if let Some(extra) = map.keys().find(|k| !self.fields.contains_key(*k)) {
                return Err(FailureReason::UnknownField { path: join_path(prefix, extra) });
            }
        }
        Ok(())
    }

    /// Comprueba estáticamente que cualquier payload válido bajo `self`
    /// también es válido bajo `required`.
    pub fn satisfies(&self, required: &Contract) -> Result<(), FailureReason> {
        self.satisfies_at(required, None)
    }

    fn satisfies_at(&self, required: &Contract, prefix: Option<&str>) -> Result<(), FailureReason> {
        for (name, needed) in &required.fields {
            let path = join_path(prefix, name);
            let have = self.fields.get(name).ok_or_else(|| FailureReason::MissingField { path: path.clone() })?;
            match (have, needed) {
                (FieldKind::Object(have), FieldKind::Object(needed)) => have.satisfies_at(needed, Some(&path))?,
                (have, needed) if have.name() == needed.name() => {}
                (have, needed) => {
                    return Err(FailureReason::KindMismatch { path,
                                                             expected: needed.name().to_string(),
                                                             found: have.name().to_string() })
                }
            }
        }
        if required.strictness == Strictness::Strict {
            if let Some(extra) = self.fields.keys().find(|k| !required.fields.contains_key(*k)) {
                return Err(FailureReason::UnknownField { path: join_path(prefix, extra) });
            }
        }
        Ok(())
    }

    /// Unión de campos de dos contracts. Falla si un mismo campo se declara
    /// con tipos distintos.
    pub fn merge(&self, other: &Contract) -> Result<Contract, TopologyError> {
        let mut fields = self.fields.clone();
        for (name, kind) in &other.fields {
            match fields.get(name) {
                Some(existing) if !existing.same_shape(kind) => {
                    return Err(TopologyError::AmbiguousMerge { field: name.clone(),
                                                               left: format!("{}:{}", self.name, existing.name()),
                                                               right: format!("{}:{}", other.name, kind.name()) })
                }
                Some(_) => {}
                None => {
                    fields.insert(name.clone(), kind.clone());
                }
            }
        }
        Ok(Contract { name: format!("{}+{}", self.name, other.name),
                      fields,
                      strictness: Strictness::Lenient })
    }

    /// Contract resultante de superponer los campos de `top` sobre `self`.
    /// Es la contraparte estática de fusionar el output de un stage en el
    /// contexto: los campos de `top` reemplazan a los existentes.
    pub fn overlay(&self, top: &Contract) -> Contract {
        let mut fields = self.fields.clone();
        for (name, kind) in &top.fields {
            fields.insert(name.clone(), kind.clone());
        }
        Contract { name: self.name.clone(),
                   fields,
                   strictness: Strictness::Lenient }
    }

    /// Proyección del payload a los campos declarados (recursiva).
    /// Campos ausentes se omiten; se asume que el payload ya fue validado.
    pub fn project(&self, payload: &Value) -> Value {
        let mut out = Map::new();
        if let Some(map) = payload.as_object() {
            for (name, kind) in &self.fields {
                if let Some(value) = map.get(name) {
                    let projected = match kind {
                        FieldKind::Object(inner) => inner.project(value),
                        _ => value.clone(),
                    };
                    out.insert(name.clone(), projected);
                }
            }
        }
        Value::Object(out)
    }
}

fn join_path(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(p) => format!("{p}.{name}"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract;
    use serde_json::json;

    fn chat_input() -> Contract {
        contract!("chat_input" => { userMessage: String })
    }

    #[test]
    fn validate_accepts_declared_shape_and_tolerates_extras() {
        let c = chat_input();
        assert!(c.validate(&json!({"userMessage": "hi"})).is_ok());
        assert!(c.validate(&json!({"userMessage": "hi", "lang": "en"})).is_ok());
    }

    #[test]
    fn validate_reports_missing_and_mismatched_fields() {
        let c = chat_input();
        assert_eq!(c.validate(&json!({})),
                   Err(FailureReason::MissingField { path: "userMessage".into() }));
        assert_eq!(c.validate(&json!({"userMessage": 5})),
                   Err(FailureReason::KindMismatch { path: "userMessage".into(),
                                                     expected: "string".into(),
                                                     found: "number".into() }));
        assert_eq!(c.validate(&json!("hi")),
                   Err(FailureReason::NotAnObject { path: "$".into(), found: "string".into() }));
        assert!(matches!(c.validate(&json!({"userMessage": null})), Err(FailureReason::KindMismatch { .. })));
    }

    #[test]
    fn strict_mode_rejects_unknown_fields() {
        let c = chat_input().strict();
        assert!(c.validate(&json!({"userMessage": "hi"})).is_ok());
        assert_eq!(c.validate(&json!({"userMessage": "hi", "lang": "en"})),
                   Err(FailureReason::UnknownField { path: "lang".into() }));
    }

    #[test]
    fn nested_contracts_validate_recursively() {
        let c = contract!("scored" => { text: String, score: { value: Number, done: Boolean } });
        assert!(c.validate(&json!({"text": "t", "score": {"value": 0.5, "done": true}})).is_ok());
        assert_eq!(c.validate(&json!({"text": "t", "score": {"value": "high", "done": true}})),
                   Err(FailureReason::KindMismatch { path: "score.value".into(),
                                                     expected: "number".into(),
                                                     found: "string".into() }));
        assert_eq!(c.validate(&json!({"text": "t", "score": 3})),
                   Err(FailureReason::NotAnObject { path: "score".into(), found: "number".into() }));
    }

    #[test]
    fn merge_unions_disjoint_fields() {
        let a = contract!("a" => { a: String });
        let b = contract!("b" => { b: String });
        let merged = a.merge(&b).expect("disjoint merge");
        assert_eq!(merged.field_names(), vec!["a", "b"]);
        assert_eq!(merged.name(), "a+b");
    }

    #[test]
    fn merge_accepts_same_field_same_kind_and_rejects_conflicts() {
        let a = contract!("a" => { shared: String, a: Number });
        let same = contract!("b" => { shared: String });
        assert_eq!(a.merge(&same).expect("same kind").len(), 2);

        let conflict = contract!("c" => { shared: Boolean });
        let err = a.merge(&conflict).unwrap_err();
        assert!(matches!(err, TopologyError::AmbiguousMerge { ref field, .. } if field == "shared"));
    }

    #[test]
    fn satisfies_checks_contract_to_contract() {
        let available = contract!("ctx" => { userMessage: String, supporterResponse: String });
        assert!(available.satisfies(&chat_input()).is_ok());
        let needs_number = contract!("n" => { userMessage: Number });
        assert!(matches!(available.satisfies(&needs_number), Err(FailureReason::KindMismatch { .. })));
        let needs_missing = contract!("m" => { examinerResponse: String });
        assert_eq!(available.satisfies(&needs_missing),
                   Err(FailureReason::MissingField { path: "examinerResponse".into() }));
        assert!(matches!(available.satisfies(&chat_input().strict()), Err(FailureReason::UnknownField { .. })));
    }

    #[test]
    fn project_keeps_only_declared_fields() {
        let out = contract!("out" => { c: String });
        assert_eq!(out.project(&json!({"x": "hi", "c": "done"})), json!({"c": "done"}));
    }
}
