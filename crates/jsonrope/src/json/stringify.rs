//! JSON text production.
//!
//! The exporter drives an explicit heap-allocated frame stack instead of
//! native recursion: value-graph depth is input-controlled and must not be
//! able to exhaust the native call stack. Each frame remembers where
//! iteration stands inside one composite value; indentation depth is the
//! stack depth.

use indexmap::IndexSet;

use crate::{
    error::Error,
    object::{Object, PropKey, holder_get},
    runtime::Runtime,
    string::{Str, StrBuilder},
    value::{NativeFn, Value},
};

const QUOTE: u16 = b'"' as u16;

/// Converts `value` to JSON text.
///
/// `Ok(None)` is the "no text" result: the top-level value reduced to
/// something JSON cannot represent (undefined or a callable). It is distinct
/// from an empty string.
pub(crate) fn stringify_value(
    rt: &Runtime,
    value: &Value,
    replacer: Option<&Value>,
    space: Option<&Value>,
) -> Result<Option<Str>, Error> {
    let (replacer_fn, property_list) = classify_replacer(rt, replacer);
    let gap = compute_gap(space);

    // Synthetic holder {"": value} so the replacer sees the root the same
    // way as any nested property.
    let root_key = PropKey::Name(rt.interner().empty());
    let mut holder = Object::new();
    holder.set(root_key.clone(), value.clone());
    let holder = Value::Object(holder.into_ref());

    let exporter = Exporter {
        rt,
        out: StrBuilder::new(),
        stack: Vec::new(),
        replacer: replacer_fn,
        property_list,
        gap,
    };
    exporter.run(&holder, &root_key)
}

fn classify_replacer(
    rt: &Runtime,
    replacer: Option<&Value>,
) -> (Option<NativeFn>, Option<Vec<PropKey>>) {
    match replacer {
        Some(Value::Function(f)) => (Some(f.clone()), None),
        Some(Value::Array(list)) => {
            // Property list: string/number members (and their wrappers),
            // order-preserving dedup.
            let mut keys: IndexSet<PropKey> = IndexSet::new();
            for item in list.borrow().iter() {
                let name = match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(number_str(rt, *n)),
                    Value::Object(obj) => match obj.borrow().to_primitive() {
                        Some(Value::String(s)) => Some(s),
                        Some(Value::Number(n)) => Some(number_str(rt, n)),
                        _ => None,
                    },
                    _ => None,
                };
                if let Some(name) = name {
                    keys.insert(PropKey::from_name(&name));
                }
            }
            (None, Some(keys.into_iter().collect()))
        }
        // Any other replacer is ignored, as JSON semantics require.
        _ => (None, None),
    }
}

fn compute_gap(space: Option<&Value>) -> Vec<u16> {
    let Some(space) = space else {
        return Vec::new();
    };
    let space = match space {
        Value::Object(obj) => match obj.borrow().to_primitive() {
            Some(p) => p,
            None => return Vec::new(),
        },
        other => other.clone(),
    };
    match space {
        Value::Number(n) => {
            let count = if n.is_nan() { 0.0 } else { n.clamp(0.0, 10.0) };
            vec![u16::from(b' '); count as usize]
        }
        Value::String(s) => s.code_units().take(10).collect(),
        _ => Vec::new(),
    }
}

enum Frame {
    Array {
        holder: Value,
        index: usize,
        len: usize,
    },
    Object {
        holder: Value,
        keys: Vec<PropKey>,
        index: usize,
        emitted: usize,
    },
}

impl Frame {
    fn holder(&self) -> &Value {
        match self {
            Frame::Array { holder, .. } | Frame::Object { holder, .. } => holder,
        }
    }
}

enum Step {
    CloseArray { nonempty: bool },
    CloseObject { emitted: bool },
    ArrayElem { holder: Value, index: usize },
    ObjectProp { holder: Value, key: PropKey },
}

struct Exporter<'rt> {
    rt: &'rt Runtime,
    out: StrBuilder,
    stack: Vec<Frame>,
    replacer: Option<NativeFn>,
    property_list: Option<Vec<PropKey>>,
    gap: Vec<u16>,
}

impl Exporter<'_> {
    fn run(mut self, holder: &Value, root_key: &PropKey) -> Result<Option<Str>, Error> {
        let first = self.prepare(holder, root_key)?;
        if !self.begin_value(&first)? {
            return Ok(None);
        }
        while !self.stack.is_empty() {
            self.step()?;
        }
        Ok(Some(self.out.finish(self.rt)))
    }

    fn step(&mut self) -> Result<(), Error> {
        let depth = self.stack.len();
        let Some(top) = self.stack.last_mut() else {
            return Ok(());
        };
        let step = match top {
            Frame::Array { holder, index, len } => {
                if *index == *len {
                    Step::CloseArray { nonempty: *len > 0 }
                } else {
                    let i = *index;
                    *index += 1;
                    Step::ArrayElem {
                        holder: holder.clone(),
                        index: i,
                    }
                }
            }
            Frame::Object {
                holder,
                keys,
                index,
                emitted,
            } => {
                if *index == keys.len() {
                    Step::CloseObject {
                        emitted: *emitted > 0,
                    }
                } else {
                    let key = keys[*index].clone();
                    *index += 1;
                    Step::ObjectProp {
                        holder: holder.clone(),
                        key,
                    }
                }
            }
        };
        match step {
            Step::CloseArray { nonempty } => {
                self.stack.pop();
                if nonempty {
                    self.newline_indent(depth - 1);
                }
                self.out.push_unit(u16::from(b']'));
                Ok(())
            }
            Step::CloseObject { emitted } => {
                self.stack.pop();
                if emitted {
                    self.newline_indent(depth - 1);
                }
                self.out.push_unit(u16::from(b'}'));
                Ok(())
            }
            Step::ArrayElem { holder, index } => {
                if index > 0 {
                    self.out.push_unit(u16::from(b','));
                }
                self.newline_indent(depth);
                let value = self.prepare(&holder, &PropKey::Index(index as u32))?;
                if !self.begin_value(&value)? {
                    // Holes and non-exportable elements keep their slot.
                    self.out.push_str(&self.rt.interner().lit_null());
                }
                Ok(())
            }
            Step::ObjectProp { holder, key } => {
                let value = self.prepare(&holder, &key)?;
                if matches!(value, Value::Undefined | Value::Function(_)) {
                    // Skipped entirely: no separator, no key.
                    return Ok(());
                }
                let emitted_before = match self.stack.last_mut() {
                    Some(Frame::Object { emitted, .. }) => {
                        let before = *emitted;
                        *emitted += 1;
                        before
                    }
                    _ => 0,
                };
                if emitted_before > 0 {
                    self.out.push_unit(u16::from(b','));
                }
                self.newline_indent(depth);
                let key_str = self.rt.prop_key_str(&key);
                self.quote(&key_str);
                self.out.push_unit(u16::from(b':'));
                if !self.gap.is_empty() {
                    self.out.push_unit(u16::from(b' '));
                }
                let serialized = self.begin_value(&value)?;
                debug_assert!(serialized);
                Ok(())
            }
        }
    }

    /// Fetches `holder[key]` and applies the per-value substitutions in
    /// order: `toJSON`, then the replacer function, then wrapper-object
    /// unwrapping.
    fn prepare(&mut self, holder: &Value, key: &PropKey) -> Result<Value, Error> {
        let mut value = holder_get(holder, key);
        if let Value::Object(obj) = &value {
            let to_json = obj
                .borrow()
                .get(&PropKey::Name(self.rt.interner().to_json()));
            if to_json.is_callable() {
                let key_str = Value::String(self.rt.prop_key_str(key));
                value = self.rt.invoke(&to_json, &value, &[key_str])?;
            }
        }
        if let Some(replacer) = &self.replacer {
            let key_str = Value::String(self.rt.prop_key_str(key));
            value = replacer(self.rt, holder, &[key_str, value])?;
        }
        if let Value::Object(obj) = &value {
            if let Some(primitive) = obj.borrow().to_primitive() {
                value = primitive;
            }
        }
        Ok(value)
    }

    /// Emits a scalar or opens a composite. Returns `false` when the value
    /// has no JSON representation (undefined or callable).
    fn begin_value(&mut self, value: &Value) -> Result<bool, Error> {
        match value {
            Value::Undefined | Value::Function(_) => Ok(false),
            Value::Null => {
                self.out.push_str(&self.rt.interner().lit_null());
                Ok(true)
            }
            Value::Boolean(b) => {
                let lit = if *b {
                    self.rt.interner().lit_true()
                } else {
                    self.rt.interner().lit_false()
                };
                self.out.push_str(&lit);
                Ok(true)
            }
            Value::Number(n) => {
                if n.is_finite() {
                    self.out.push_ascii(&number_text(*n));
                } else {
                    self.out.push_str(&self.rt.interner().lit_null());
                }
                Ok(true)
            }
            Value::String(s) => {
                self.quote(s);
                Ok(true)
            }
            Value::Array(arr) => {
                self.check_cycle(value)?;
                let len = arr.borrow().len();
                self.out.push_unit(u16::from(b'['));
                self.stack.push(Frame::Array {
                    holder: value.clone(),
                    index: 0,
                    len,
                });
                Ok(true)
            }
            Value::Object(obj) => {
                self.check_cycle(value)?;
                let keys = match &self.property_list {
                    Some(list) => list.clone(),
                    None => obj.borrow().own_keys(),
                };
                self.out.push_unit(u16::from(b'{'));
                self.stack.push(Frame::Object {
                    holder: value.clone(),
                    keys,
                    index: 0,
                    emitted: 0,
                });
                Ok(true)
            }
        }
    }

    /// Walks the live frames for the candidate's identity before descending
    /// into it.
    fn check_cycle(&self, candidate: &Value) -> Result<(), Error> {
        if self
            .stack
            .iter()
            .any(|frame| frame.holder().same_ref(candidate))
        {
            return Err(Error::Type("not an acyclic structure".into()));
        }
        Ok(())
    }

    fn newline_indent(&mut self, levels: usize) {
        if self.gap.is_empty() {
            return;
        }
        self.out.push_unit(u16::from(b'\n'));
        for _ in 0..levels {
            self.out.push_units(&self.gap);
        }
    }

    /// JSON string quoting.
    ///
    /// Named escapes for the common controls, `\u00xx` for the rest of the
    /// C0 range and DEL, backslash escapes for `"` and `\`; everything else
    /// passes through unchanged. A clean string is appended verbatim.
    fn quote(&mut self, s: &Str) {
        self.out.push_unit(QUOTE);
        if s.code_units().any(needs_escape) {
            for unit in s.code_units() {
                self.push_escaped(unit);
            }
        } else {
            self.out.push_str(s);
        }
        self.out.push_unit(QUOTE);
    }

    fn push_escaped(&mut self, unit: u16) {
        match unit {
            0x08 => self.out.push_ascii("\\b"),
            0x09 => self.out.push_ascii("\\t"),
            0x0A => self.out.push_ascii("\\n"),
            0x0C => self.out.push_ascii("\\f"),
            0x0D => self.out.push_ascii("\\r"),
            0x22 => self.out.push_ascii("\\\""),
            0x5C => self.out.push_ascii("\\\\"),
            u if u < 0x20 || u == 0x7F => {
                const HEX: &[u8; 16] = b"0123456789abcdef";
                self.out.push_ascii("\\u00");
                self.out.push_unit(u16::from(HEX[usize::from(u >> 4)]));
                self.out.push_unit(u16::from(HEX[usize::from(u & 0xF)]));
            }
            u => self.out.push_unit(u),
        }
    }
}

fn needs_escape(unit: u16) -> bool {
    unit < 0x20 || unit == 0x22 || unit == 0x5C || unit == 0x7F
}

/// Decimal text for a number: shortest round-trip representation, with the
/// ECMAScript edge cases pinned down (`-0` prints as `0`).
fn number_text(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    n.to_string()
}

fn number_str(rt: &Runtime, n: f64) -> Str {
    let mut b = StrBuilder::new();
    b.push_ascii(&number_text(n));
    b.finish(rt)
}
