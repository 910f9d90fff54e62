//! The value graph the JSON layer reads and writes.

use std::{fmt, rc::Rc};

use crate::{
    error::Error,
    object::{ArrayRef, ObjectRef},
    runtime::Runtime,
    string::Str,
};

/// A native function: `(runtime, this, args) -> value`.
///
/// Replacers, revivers, and `toJSON` hooks are all `NativeFn`s.
pub type NativeFn = Rc<dyn Fn(&Runtime, &Value, &[Value]) -> Result<Value, Error>>;

/// A language value.
///
/// Composite values (`Array`, `Object`) are shared references: two `Value`s
/// may point at the same underlying container, and graphs may contain
/// cycles. The JSON exporter detects cycles and refuses them; everything
/// else in this crate treats values as opaque.
#[derive(Clone)]
pub enum Value {
    /// The undefined value. Not representable in JSON text; `stringify`
    /// skips or nulls it depending on position.
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Str),
    Array(ArrayRef),
    Object(ObjectRef),
    /// A callable. Treated like `Undefined` by the exporter.
    Function(NativeFn),
}

impl Value {
    /// Returns `true` if the value is [`Undefined`](Value::Undefined).
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns `true` if the value is [`Null`](Value::Null).
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if the value is a callable function.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Function(..))
    }

    /// Returns `true` for `Array` and `Object` values.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Array(..) | Self::Object(..))
    }

    /// Reference identity for composites and functions; `false` for
    /// everything else.
    #[must_use]
    pub fn same_ref(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Structural equality: numbers by `f64` equality, strings by contents,
    /// composites element by element in enumeration order, functions by
    /// identity.
    ///
    /// Recurses over the graph's depth and must only be handed acyclic
    /// values; it exists for tests and assertions, not for the exporter.
    #[must_use]
    pub fn deep_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Array(a), Self::Array(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.deep_eq(y))
            }
            (Self::Object(a), Self::Object(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                if a.len() != b.len() {
                    return false;
                }
                // Compare in enumeration order: numeric keys sort ahead of
                // names, so a round-tripped object stays deep-equal even
                // when its insertion order differed.
                let keys = a.own_keys();
                keys == b.own_keys() && keys.iter().all(|k| a.get(k).deep_eq(&b.get(k)))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("Undefined"),
            Self::Null => f.write_str("Null"),
            Self::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            // Composites may be cyclic; keep Debug shallow.
            Self::Array(a) => write!(f, "Array(len {})", a.borrow().len()),
            Self::Object(o) => write!(f, "Object(len {})", o.borrow().len()),
            Self::Function(_) => f.write_str("Function(native)"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<Str> for Value {
    fn from(v: Str) -> Self {
        Self::String(v)
    }
}
