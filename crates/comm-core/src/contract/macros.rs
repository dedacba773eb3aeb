//! Macro utilitaria para declarar contracts sin boilerplate.
//!
//! ```
//! use comm_core::contract;
//!
//! let c = contract!("chat_input" => { userMessage: String, meta: { turn: Number } });
//! assert_eq!(c.field_names(), vec!["userMessage", "meta"]);
//! ```
//!
//! Tipos soportados: `String`, `Number`, `Boolean` y objetos anidados `{ ... }`
//! (el contract anidado toma el nombre del campo).

#[macro_export]
macro_rules! contract {
    ($name:expr => { $($field:ident : $kind:tt),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut c = $crate::contract::Contract::new($name);
        $( c = c.field(stringify!($field), $crate::__contract_kind!($field, $kind)); )*
        c
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __contract_kind {
    ($field:ident, String) => { $crate::contract::FieldKind::String };
    ($field:ident, Number) => { $crate::contract::FieldKind::Number };
    ($field:ident, Boolean) => { $crate::contract::FieldKind::Boolean };
    ($field:ident, { $($inner:tt)* }) => {
        $crate::contract::FieldKind::Object($crate::contract!(stringify!($field) => { $($inner)* }))
    };
}
