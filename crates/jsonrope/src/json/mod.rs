//! JSON text ↔ value-graph conversion.
//!
//! Both directions replace native recursion with explicit heap-allocated
//! frame stacks, so input nesting depth can never overflow the call stack.
//! The text format is ES5.1 `JSON`: the exporter honors `toJSON` hooks,
//! replacer functions and arrays, and indentation; the parser enforces the
//! strict JSON grammar and supports a post-parse reviver walk.

mod escape;
mod parse;
mod stringify;

use crate::{error::Error, runtime::Runtime, string::Str, value::Value};

/// Converts a value graph to JSON text.
///
/// Returns `Ok(None)` — "no text", not an empty string — when the top-level
/// value reduces to something JSON cannot represent (undefined or a
/// callable).
///
/// `replacer` may be a function (invoked per value with the holder as
/// `this`) or an array of property names to keep; anything else is ignored.
/// `space` may be a number (clamped to 0..=10 spaces) or a string (first 10
/// units) and turns on per-level indentation.
///
/// # Errors
///
/// `Error::Type` when the graph is cyclic, plus whatever a replacer or
/// `toJSON` hook returns.
///
/// # Examples
///
/// ```
/// use jsonrope::{Object, PropKey, Runtime, Value, stringify};
///
/// let rt = Runtime::new();
/// let mut obj = Object::new();
/// obj.set(
///     PropKey::from_name(&rt.str_from_str("a")),
///     Value::Number(1.0),
/// );
/// let text = stringify(&rt, &Value::Object(obj.into_ref()), None, None)
///     .unwrap()
///     .unwrap();
/// assert_eq!(text.to_string_lossy(), r#"{"a":1}"#);
///
/// assert!(stringify(&rt, &Value::Undefined, None, None).unwrap().is_none());
/// ```
pub fn stringify(
    rt: &Runtime,
    value: &Value,
    replacer: Option<&Value>,
    space: Option<&Value>,
) -> Result<Option<Str>, Error> {
    stringify::stringify_value(rt, value, replacer, space)
}

/// Parses JSON text into a value graph.
///
/// When `reviver` is callable it is run bottom-up over every parsed
/// property; returning undefined from it deletes the property.
///
/// # Errors
///
/// `Error::Syntax` with a message and source context on malformed input;
/// whatever the reviver returns if it fails.
///
/// # Examples
///
/// ```
/// use jsonrope::{Runtime, Value, parse};
///
/// let rt = Runtime::new();
/// let value = parse(&rt, &rt.str_from_str(r#"{"a":[1,2,3]}"#), None).unwrap();
/// let Value::Object(obj) = value else { panic!() };
/// let a = obj.borrow().get(&jsonrope::PropKey::from_name(&rt.str_from_str("a")));
/// let Value::Array(items) = a else { panic!() };
/// assert_eq!(items.borrow().len(), 3);
/// ```
pub fn parse(rt: &Runtime, text: &Str, reviver: Option<&Value>) -> Result<Value, Error> {
    parse::parse_text(rt, text, reviver)
}
