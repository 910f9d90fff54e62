//! Per-instance runtime services.

use crate::{
    error::Error,
    object::PropKey,
    string::{Interner, Storage, Str, StrBuilder, to_u32},
    value::Value,
};

/// A runtime instance: owns the string intern table and dispatches native
/// function invocation.
///
/// Every string-producing operation takes a `&Runtime` so short strings can
/// be folded to their canonical interned instances. Runtimes are independent
/// of each other; strings built against different runtimes still compare by
/// contents.
///
/// # Examples
///
/// ```
/// use jsonrope::Runtime;
///
/// let rt = Runtime::new();
/// let a = rt.str_from_str("a");
/// let b = rt.str_from_str("a");
/// assert!(a.identical(&b)); // interned
/// ```
pub struct Runtime {
    interner: Interner,
}

impl Runtime {
    /// Creates a runtime and builds its intern table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
        }
    }

    pub(crate) fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Copies `units` into a new string. The empty string and single code
    /// units in the canonical range come back as interned instances.
    #[must_use]
    pub fn str_from_units(&self, units: &[u16]) -> Str {
        if let Some(s) = self.interner.get(units) {
            return s;
        }
        Str::flat(Storage::from_units(units), 0, to_u32(units.len()))
    }

    /// Encodes `text` as UTF-16 and builds a string from it.
    #[must_use]
    pub fn str_from_str(&self, text: &str) -> Str {
        let units: Vec<u16> = text.encode_utf16().collect();
        if let Some(s) = self.interner.get(&units) {
            return s;
        }
        let len = to_u32(units.len());
        Str::flat(Storage::from_vec(units), 0, len)
    }

    /// Decimal string form of an array index. Single digits come straight
    /// from the intern table.
    #[must_use]
    pub fn index_str(&self, index: u32) -> Str {
        if index < 10 {
            return self.interner.single(u16::from(b'0') + index as u16);
        }
        let mut b = StrBuilder::with_capacity(10);
        b.push_ascii(&index.to_string());
        b.finish(self)
    }

    pub(crate) fn prop_key_str(&self, key: &PropKey) -> Str {
        match key {
            PropKey::Index(i) => self.index_str(*i),
            PropKey::Name(s) => s.clone(),
        }
    }

    /// Calls `callee` with the given `this` value and arguments.
    ///
    /// # Errors
    ///
    /// `Error::Type` when `callee` is not callable; otherwise whatever the
    /// native function returns.
    pub fn invoke(&self, callee: &Value, this: &Value, args: &[Value]) -> Result<Value, Error> {
        match callee {
            Value::Function(f) => f(self, this, args),
            _ => Err(Error::Type("value is not callable".into())),
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
