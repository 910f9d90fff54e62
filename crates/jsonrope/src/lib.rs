//! A UTF-16 rope string kernel with a bounded-stack JSON writer and parser.
//!
//! The crate has two halves that grew up together:
//!
//! - **Strings**: [`Str`] is an immutable, cheaply cloned UTF-16 string
//!   handle. It may be a view into one flat buffer or a *segmented*
//!   composite of several, so concatenation and substring never copy;
//!   flattening happens lazily when contiguous memory is actually needed.
//!   Mutation is confined to [`StrBuilder`], which owns its buffer
//!   exclusively — the type system, not caller discipline, rules out
//!   appending through an aliased buffer.
//! - **JSON**: [`stringify`] and [`parse`] convert between JSON text and a
//!   [`Value`] graph. Both use explicit heap-allocated frame stacks instead
//!   of native recursion, so adversarially deep input cannot overflow the
//!   call stack. Replacer functions and arrays, revivers, `toJSON` hooks,
//!   indentation, and cycle detection follow ES5.1 `JSON` semantics.
//!
//! Every string-producing operation takes a [`Runtime`], which owns the
//! per-instance intern table for short strings.
//!
//! ```
//! use jsonrope::{Runtime, Value, parse, stringify};
//!
//! let rt = Runtime::new();
//! let value = parse(&rt, &rt.str_from_str(r#"{"a":1,"b":[true,null,"x"]}"#), None).unwrap();
//! let text = stringify(&rt, &value, None, None).unwrap().unwrap();
//! assert_eq!(text.to_string_lossy(), r#"{"a":1,"b":[true,null,"x"]}"#);
//! ```

mod error;
mod json;
mod object;
mod runtime;
mod string;
mod value;

#[cfg(test)]
mod tests;

pub use error::{Error, ParseError};
pub use json::{parse, stringify};
pub use object::{ArrayRef, Object, ObjectRef, PropKey};
pub use runtime::Runtime;
pub use string::{CodeUnits, Rope, Str, StrBuilder, Units};
pub use value::{NativeFn, Value};
