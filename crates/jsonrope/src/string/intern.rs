//! Canonical instances for short and well-known strings.

use std::rc::Rc;

use super::{Str, storage::Storage};

/// Per-runtime table of canonical string instances.
///
/// Built once when the [`Runtime`](crate::Runtime) is created and immutable
/// afterwards. The empty string and every single-unit string in the Latin-1
/// range share one 256-unit storage; repeated construction of the same short
/// string yields identity-equal handles. This is a memory and allocation
/// optimization, not something the abstract string model depends on.
pub(crate) struct Interner {
    empty: Str,
    singles: Vec<Str>,
    to_json: Str,
    lit_true: Str,
    lit_false: Str,
    lit_null: Str,
}

impl Interner {
    pub(crate) fn new() -> Self {
        let units: Vec<u16> = (0..=0xFF).collect();
        let storage = Storage::from_vec(units);
        let singles = (0..=0xFFu32)
            .map(|u| Str::flat(Rc::clone(&storage), u, 1))
            .collect();
        let empty = Str::flat(Rc::clone(&storage), 0, 0);
        Self {
            empty,
            singles,
            to_json: Self::named("toJSON"),
            lit_true: Self::named("true"),
            lit_false: Self::named("false"),
            lit_null: Self::named("null"),
        }
    }

    fn named(text: &str) -> Str {
        let units: Vec<u16> = text.encode_utf16().collect();
        let len = units.len();
        Str::flat(Storage::from_vec(units), 0, len as u32)
    }

    /// The canonical instance for `units`, if it has one: the empty string,
    /// or a single code unit below 0x100.
    pub(crate) fn get(&self, units: &[u16]) -> Option<Str> {
        match *units {
            [] => Some(self.empty.clone()),
            [u] if u < 0x100 => Some(self.singles[usize::from(u)].clone()),
            _ => None,
        }
    }

    pub(crate) fn empty(&self) -> Str {
        self.empty.clone()
    }

    pub(crate) fn single(&self, unit: u16) -> Str {
        debug_assert!(unit < 0x100);
        self.singles[usize::from(unit)].clone()
    }

    pub(crate) fn to_json(&self) -> Str {
        self.to_json.clone()
    }

    pub(crate) fn lit_true(&self) -> Str {
        self.lit_true.clone()
    }

    pub(crate) fn lit_false(&self) -> Str {
        self.lit_false.clone()
    }

    pub(crate) fn lit_null(&self) -> Str {
        self.lit_null.clone()
    }
}
