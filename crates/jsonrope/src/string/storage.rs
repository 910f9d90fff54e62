//! Flat, frozen UTF-16 code unit storage.

use std::rc::Rc;

/// An exact-size buffer of UTF-16 code units, shared between handles via
/// `Rc`.
///
/// Storage is immutable once built; all growth happens in
/// [`StrBuilder`](super::StrBuilder) before freezing. Any number of handles
/// may view disjoint or overlapping ranges of the same storage.
#[derive(Debug)]
pub(crate) struct Storage {
    units: Box<[u16]>,
}

impl Storage {
    pub(crate) fn from_vec(units: Vec<u16>) -> Rc<Self> {
        Rc::new(Self { units: units.into_boxed_slice() })
    }

    pub(crate) fn from_units(units: &[u16]) -> Rc<Self> {
        Rc::new(Self { units: units.into() })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.units.len()
    }

    #[inline]
    pub(crate) fn units(&self) -> &[u16] {
        &self.units
    }

    pub(crate) fn into_vec(self) -> Vec<u16> {
        self.units.into_vec()
    }
}
