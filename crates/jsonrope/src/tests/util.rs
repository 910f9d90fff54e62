//! Shared helpers for the test suite.

use std::{cell::RefCell, rc::Rc};

use crate::{Error, Object, PropKey, Runtime, Str, Value};

pub(crate) fn s(rt: &Runtime, text: &str) -> Str {
    rt.str_from_str(text)
}

pub(crate) fn key(rt: &Runtime, name: &str) -> PropKey {
    PropKey::from_name(&s(rt, name))
}

pub(crate) fn arr(items: Vec<Value>) -> Value {
    Value::Array(Rc::new(RefCell::new(items)))
}

pub(crate) fn obj(rt: &Runtime, props: &[(&str, Value)]) -> Value {
    let mut object = Object::new();
    for (name, value) in props {
        object.set(key(rt, name), value.clone());
    }
    Value::Object(object.into_ref())
}

pub(crate) fn native(
    f: impl Fn(&Runtime, &Value, &[Value]) -> Result<Value, Error> + 'static,
) -> Value {
    Value::Function(Rc::new(f))
}

/// Compact stringify straight to UTF-8, panicking on error or "no text".
pub(crate) fn json(rt: &Runtime, value: &Value) -> String {
    crate::stringify(rt, value, None, None)
        .expect("stringify failed")
        .expect("value is not exportable")
        .to_string_lossy()
}

/// Parse helper from a Rust string literal.
pub(crate) fn parse_str(rt: &Runtime, text: &str) -> Result<Value, Error> {
    crate::parse(rt, &s(rt, text), None)
}
