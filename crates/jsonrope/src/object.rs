//! The in-crate object model: insertion-ordered objects, arrays, and
//! property keys.
//!
//! The JSON layer consumes objects through a narrow surface — own-key
//! enumeration, get/set/delete, wrapper unwrapping — so the model stays
//! deliberately small: no prototypes, no attributes, no classes beyond the
//! wrapper primitive slot.

use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;

use crate::{string::Str, value::Value};

/// Shared, mutable object reference.
pub type ObjectRef = Rc<RefCell<Object>>;

/// Shared, mutable array reference. `Undefined` elements are holes.
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// A property key.
///
/// Canonical array indices (all digits, no leading zero, below 2³² − 1) are
/// kept as integers; everything else as strings. This is an internal keying
/// optimization — enumeration order stays index-keys-ascending-first, then
/// name keys in insertion order, exactly as if every key were a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropKey {
    /// A canonical array index.
    Index(u32),
    /// Any other property name.
    Name(Str),
}

impl PropKey {
    /// Classifies a property name, folding canonical array indices into
    /// integer keys.
    #[must_use]
    pub fn from_name(name: &Str) -> PropKey {
        match canonical_index(name) {
            Some(i) => PropKey::Index(i),
            None => PropKey::Name(name.clone()),
        }
    }
}

fn canonical_index(name: &Str) -> Option<u32> {
    let len = name.len();
    if len == 0 || len > 10 {
        return None;
    }
    let mut value: u64 = 0;
    for (i, unit) in name.code_units().enumerate() {
        if !(0x30..=0x39).contains(&unit) {
            return None;
        }
        let digit = u64::from(unit - 0x30);
        if i == 0 && digit == 0 && len > 1 {
            return None; // leading zero
        }
        value = value * 10 + digit;
    }
    // Array indices stop one short of 2^32 - 1.
    if value < u64::from(u32::MAX) {
        Some(value as u32)
    } else {
        None
    }
}

/// An ordinary object: own enumerable properties in insertion order, plus an
/// optional wrapper primitive for Boolean/Number/String wrapper objects.
#[derive(Default)]
pub struct Object {
    props: IndexMap<PropKey, Value>,
    primitive: Option<Value>,
}

impl Object {
    /// Creates an empty plain object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a wrapper object carrying `primitive` as its
    /// `[[PrimitiveValue]]`.
    #[must_use]
    pub fn wrapper(primitive: Value) -> Self {
        Self {
            props: IndexMap::new(),
            primitive: Some(primitive),
        }
    }

    pub(crate) fn from_props(props: IndexMap<PropKey, Value>) -> Self {
        Self {
            props,
            primitive: None,
        }
    }

    /// Wraps the object in a shared reference.
    #[must_use]
    pub fn into_ref(self) -> ObjectRef {
        Rc::new(RefCell::new(self))
    }

    /// Number of own properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Returns `true` if the object has no own properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// The property's value, or `Undefined` when absent.
    #[must_use]
    pub fn get(&self, key: &PropKey) -> Value {
        self.props.get(key).cloned().unwrap_or(Value::Undefined)
    }

    /// Creates or overwrites a property. An existing key keeps its position
    /// in enumeration order.
    pub fn set(&mut self, key: PropKey, value: Value) {
        self.props.insert(key, value);
    }

    /// Removes a property, preserving the order of the rest. Returns `true`
    /// if the property existed.
    pub fn delete(&mut self, key: &PropKey) -> bool {
        self.props.shift_remove(key).is_some()
    }

    /// The wrapper primitive, if this is a wrapper object.
    #[must_use]
    pub fn to_primitive(&self) -> Option<Value> {
        self.primitive.clone()
    }

    /// Own enumerable keys: integer keys in ascending numeric order first,
    /// then name keys in insertion order.
    #[must_use]
    pub fn own_keys(&self) -> Vec<PropKey> {
        let mut indices: Vec<u32> = Vec::new();
        let mut names: Vec<Str> = Vec::new();
        for key in self.props.keys() {
            match key {
                PropKey::Index(i) => indices.push(*i),
                PropKey::Name(s) => names.push(s.clone()),
            }
        }
        indices.sort_unstable();
        indices
            .into_iter()
            .map(PropKey::Index)
            .chain(names.into_iter().map(PropKey::Name))
            .collect()
    }

    /// Iterates `(key, value)` pairs in insertion order. For the
    /// enumeration order contract use [`Object::own_keys`].
    pub fn entries(&self) -> impl Iterator<Item = (&PropKey, &Value)> {
        self.props.iter()
    }

    pub(crate) fn take_props(&mut self) -> IndexMap<PropKey, Value> {
        std::mem::take(&mut self.props)
    }
}

/// Own enumerable keys of a composite holder (object or array).
pub(crate) fn own_keys_of(holder: &Value) -> Vec<PropKey> {
    match holder {
        Value::Object(obj) => obj.borrow().own_keys(),
        Value::Array(arr) => {
            let len = arr.borrow().len();
            (0..len).map(|i| PropKey::Index(i as u32)).collect()
        }
        _ => Vec::new(),
    }
}

/// Reads `holder[key]`; `Undefined` when absent or the holder is not a
/// container.
pub(crate) fn holder_get(holder: &Value, key: &PropKey) -> Value {
    match (holder, key) {
        (Value::Object(obj), _) => obj.borrow().get(key),
        (Value::Array(arr), PropKey::Index(i)) => arr
            .borrow()
            .get(*i as usize)
            .cloned()
            .unwrap_or(Value::Undefined),
        _ => Value::Undefined,
    }
}

/// Writes `holder[key] = value`, extending arrays with holes if needed.
pub(crate) fn holder_set(holder: &Value, key: &PropKey, value: Value) {
    match (holder, key) {
        (Value::Object(obj), _) => obj.borrow_mut().set(key.clone(), value),
        (Value::Array(arr), PropKey::Index(i)) => {
            let mut arr = arr.borrow_mut();
            let i = *i as usize;
            if i >= arr.len() {
                arr.resize(i + 1, Value::Undefined);
            }
            arr[i] = value;
        }
        _ => {}
    }
}

/// Deletes `holder[key]`. Array slots become `Undefined` holes so sibling
/// indices keep their positions.
pub(crate) fn holder_delete(holder: &Value, key: &PropKey) {
    match (holder, key) {
        (Value::Object(obj), _) => {
            obj.borrow_mut().delete(key);
        }
        (Value::Array(arr), PropKey::Index(i)) => {
            let mut arr = arr.borrow_mut();
            let i = *i as usize;
            if i < arr.len() {
                arr[i] = Value::Undefined;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    fn key(rt: &Runtime, name: &str) -> PropKey {
        PropKey::from_name(&rt.str_from_str(name))
    }

    #[test]
    fn canonical_indices_fold_to_integers() {
        let rt = Runtime::new();
        assert_eq!(key(&rt, "0"), PropKey::Index(0));
        assert_eq!(key(&rt, "42"), PropKey::Index(42));
        assert_eq!(key(&rt, "4294967294"), PropKey::Index(4_294_967_294));
    }

    #[test]
    fn non_canonical_names_stay_strings() {
        let rt = Runtime::new();
        for name in ["", "01", "-1", "1.5", "4294967295", "a", "1a", "٣"] {
            assert!(
                matches!(key(&rt, name), PropKey::Name(_)),
                "{name} must not be an index"
            );
        }
    }

    #[test]
    fn own_keys_orders_indices_first_ascending() {
        let rt = Runtime::new();
        let mut obj = Object::new();
        obj.set(key(&rt, "b"), Value::Null);
        obj.set(key(&rt, "10"), Value::Null);
        obj.set(key(&rt, "a"), Value::Null);
        obj.set(key(&rt, "2"), Value::Null);
        let keys = obj.own_keys();
        assert_eq!(keys[0], PropKey::Index(2));
        assert_eq!(keys[1], PropKey::Index(10));
        assert_eq!(keys[2], key(&rt, "b"));
        assert_eq!(keys[3], key(&rt, "a"));
    }

    #[test]
    fn delete_preserves_insertion_order() {
        let rt = Runtime::new();
        let mut obj = Object::new();
        obj.set(key(&rt, "x"), Value::Null);
        obj.set(key(&rt, "y"), Value::Null);
        obj.set(key(&rt, "z"), Value::Null);
        assert!(obj.delete(&key(&rt, "y")));
        let keys = obj.own_keys();
        assert_eq!(keys, vec![key(&rt, "x"), key(&rt, "z")]);
    }
}
