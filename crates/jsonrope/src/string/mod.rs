//! UTF-16 rope string kernel.
//!
//! [`Str`] is the crate's primitive string value: an immutable handle onto
//! shared storage. A handle is either *flat* (a view of one contiguous
//! buffer) or *segmented* (a concatenation of several buffer views that has
//! not been copied together yet). Segmented strings make concatenation-heavy
//! construction cheap and are realized — flattened into one fresh buffer —
//! lazily, the first time an operation needs contiguous memory.
//!
//! Mutation lives in a separate type: [`StrBuilder`] owns its buffer
//! exclusively, so appending can never corrupt another handle that shares
//! storage with the append target.

mod builder;
mod intern;
mod segment;
mod storage;

use std::{
    cell::{Cell, RefCell},
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
    rc::Rc,
};

pub use builder::StrBuilder;
pub use segment::Rope;

pub(crate) use intern::Interner;
pub(crate) use storage::Storage;
use segment::Segment;

use crate::runtime::Runtime;

/// Narrows a length to the handle's 32-bit field. Strings are bounded at
/// `u32::MAX` code units.
pub(crate) fn to_u32(n: usize) -> u32 {
    assert!(n <= u32::MAX as usize, "string length overflow");
    n as u32
}

#[derive(Clone)]
enum Repr {
    Flat { storage: Rc<Storage>, offset: u32 },
    Segmented(Rc<[Segment]>),
}

/// An immutable UTF-16 string handle.
///
/// Handles are cheap to clone (reference-counted storage) and compare by
/// contents. The internal representation may change from segmented to flat
/// behind a shared reference (see [`Str::units`]); length, equality,
/// ordering, and the cached hash are unaffected by realization.
pub struct Str {
    len: u32,
    repr: RefCell<Repr>,
    // Cached DJB2 hash; 0 marks "not yet computed".
    hash: Cell<u32>,
}

impl Clone for Str {
    fn clone(&self) -> Self {
        Self {
            len: self.len,
            repr: RefCell::new(self.repr.borrow().clone()),
            hash: Cell::new(self.hash.get()),
        }
    }
}

impl Str {
    pub(crate) fn flat(storage: Rc<Storage>, offset: u32, len: u32) -> Self {
        debug_assert!(offset as usize + len as usize <= storage.len());
        Self {
            len,
            repr: RefCell::new(Repr::Flat { storage, offset }),
            hash: Cell::new(0),
        }
    }

    pub(crate) fn segmented(segments: Rc<[Segment]>, len: u32) -> Self {
        debug_assert_eq!(
            segments.iter().map(|s| s.len as usize).sum::<usize>(),
            len as usize
        );
        Self {
            len,
            repr: RefCell::new(Repr::Segmented(segments)),
            hash: Cell::new(0),
        }
    }

    /// Length in UTF-16 code units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns `true` for the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Contiguous view of the code units.
    ///
    /// A segmented string is realized first: its pieces are copied into one
    /// fresh flat buffer and the handle's internal representation is
    /// replaced. That side effect is invisible to `len`, equality, ordering,
    /// and hashing, but it does allocate; prefer [`Str::code_units`] for
    /// sequential reads.
    #[must_use]
    pub fn units(&self) -> Units {
        self.realize();
        match &*self.repr.borrow() {
            Repr::Flat { storage, offset } => Units {
                storage: Rc::clone(storage),
                start: *offset as usize,
                len: self.len as usize,
            },
            Repr::Segmented(_) => unreachable!("realized above"),
        }
    }

    /// Code unit at `index`, realizing a segmented string.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn unit_at(&self, index: usize) -> u16 {
        self.units()[index]
    }

    fn realize(&self) {
        let mut repr = self.repr.borrow_mut();
        if let Repr::Segmented(segments) = &*repr {
            let mut units = Vec::with_capacity(self.len as usize);
            for seg in segments.iter() {
                units.extend_from_slice(seg.units());
            }
            *repr = Repr::Flat {
                storage: Storage::from_vec(units),
                offset: 0,
            };
        }
    }

    fn flat_units(&self) -> Option<Units> {
        match &*self.repr.borrow() {
            Repr::Flat { storage, offset } => Some(Units {
                storage: Rc::clone(storage),
                start: *offset as usize,
                len: self.len as usize,
            }),
            Repr::Segmented(_) => None,
        }
    }

    /// Iterates the code units in order without realizing a segmented
    /// string.
    #[must_use]
    pub fn code_units(&self) -> CodeUnits {
        let state = match &*self.repr.borrow() {
            Repr::Flat { storage, offset } => IterState::Flat {
                storage: Rc::clone(storage),
                pos: *offset as usize,
            },
            Repr::Segmented(segments) => IterState::Segmented {
                segments: Rc::clone(segments),
                seg: 0,
                pos: 0,
            },
        };
        CodeUnits {
            state,
            remaining: self.len as usize,
        }
    }

    /// DJB2 hash over the code units, computed once and cached on the
    /// handle. Segmented strings hash segment by segment with the same
    /// running accumulator; flat and segmented forms of equal text hash
    /// equal.
    #[must_use]
    pub fn hash_code(&self) -> u32 {
        let cached = self.hash.get();
        if cached != 0 {
            return cached;
        }
        let mut h: u32 = 5381;
        for unit in self.code_units() {
            h = h.wrapping_mul(33).wrapping_add(u32::from(unit));
        }
        // 0 is the "not yet computed" sentinel
        if h == 0 {
            h = 5381;
        }
        self.hash.set(h);
        h
    }

    /// Lexicographic UTF-16 code unit order; on a common-prefix tie the
    /// shorter string sorts first.
    #[must_use]
    pub fn cmp_ordinal(&self, other: &Str) -> Ordering {
        self.code_units().cmp(other.code_units())
    }

    /// Representation-level identity: `true` when both handles view the
    /// same storage range or the same segment list. Interned strings are
    /// identical across constructions; equal strings in distinct storage
    /// are not.
    #[must_use]
    pub fn identical(&self, other: &Str) -> bool {
        if self.len != other.len {
            return false;
        }
        match (&*self.repr.borrow(), &*other.repr.borrow()) {
            (
                Repr::Flat {
                    storage: a,
                    offset: oa,
                },
                Repr::Flat {
                    storage: b,
                    offset: ob,
                },
            ) => Rc::ptr_eq(a, b) && oa == ob,
            (Repr::Segmented(a), Repr::Segmented(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Zero-copy substring view of `start..start + len` code units.
    ///
    /// A substring of a flat string is a view into the same storage; a
    /// substring of a segmented string slices the segment list. Results of
    /// length ≤ 1 in the canonical range come from the intern table.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    #[must_use]
    pub fn substring(&self, rt: &Runtime, start: usize, len: usize) -> Str {
        assert!(start + len <= self.len(), "substring out of bounds");
        if len == 0 {
            return rt.interner().empty();
        }
        if len == 1 {
            let unit = self.unit_at_no_realize(start);
            if let Some(s) = rt.interner().get(&[unit]) {
                return s;
            }
        }
        match &*self.repr.borrow() {
            Repr::Flat { storage, offset } => {
                Str::flat(Rc::clone(storage), offset + to_u32(start), to_u32(len))
            }
            Repr::Segmented(segments) => slice_segments(segments, start, len),
        }
    }

    fn unit_at_no_realize(&self, index: usize) -> u16 {
        match &*self.repr.borrow() {
            Repr::Flat { storage, offset } => storage.units()[*offset as usize + index],
            Repr::Segmented(segments) => {
                let mut skip = index;
                for seg in segments.iter() {
                    if skip < seg.len as usize {
                        return seg.units()[skip];
                    }
                    skip -= seg.len as usize;
                }
                unreachable!("index checked by caller")
            }
        }
    }

    /// Concatenates two strings as a segmented composite; neither input is
    /// copied.
    #[must_use]
    pub fn concat(rt: &Runtime, left: &Str, right: &Str) -> Str {
        let mut rope = Rope::new();
        rope.push(left);
        rope.push(right);
        rope.finish(rt)
    }

    /// Converts this handle into an exclusive [`StrBuilder`].
    ///
    /// When the handle is the sole owner of its full storage, the buffer is
    /// reused without copying. A shared or partial view is copied first, so
    /// other handles over the same storage are never disturbed.
    #[must_use]
    pub fn into_builder(self) -> StrBuilder {
        let len = self.len as usize;
        match self.repr.into_inner() {
            Repr::Flat { storage, offset } if offset == 0 && storage.len() == len => {
                match Rc::try_unwrap(storage) {
                    Ok(storage) => StrBuilder::from_vec(storage.into_vec()),
                    Err(shared) => StrBuilder::from_units(shared.units()),
                }
            }
            Repr::Flat { storage, offset } => {
                let start = offset as usize;
                StrBuilder::from_units(&storage.units()[start..start + len])
            }
            Repr::Segmented(segments) => {
                let mut b = StrBuilder::with_capacity(len);
                for seg in segments.iter() {
                    b.push_units(seg.units());
                }
                b
            }
        }
    }

    /// Lowercases with locale-independent simple (1:1, BMP) case mapping.
    ///
    /// Returns the same handle when no unit changes. Surrogates and
    /// characters whose lowercase form needs more than one unit pass through
    /// unchanged.
    #[must_use]
    pub fn to_lowercase(&self, rt: &Runtime) -> Str {
        self.convert_case(rt, simple_lower)
    }

    /// Uppercase counterpart of [`Str::to_lowercase`].
    #[must_use]
    pub fn to_uppercase(&self, rt: &Runtime) -> Str {
        self.convert_case(rt, simple_upper)
    }

    fn convert_case(&self, rt: &Runtime, map: fn(u16) -> u16) -> Str {
        // Scan first: most strings need no conversion and keep their handle.
        let first_change = self.code_units().position(|u| map(u) != u);
        let Some(first_change) = first_change else {
            return self.clone();
        };
        let mut b = StrBuilder::with_capacity(self.len());
        for (i, unit) in self.code_units().enumerate() {
            b.push_unit(if i < first_change { unit } else { map(unit) });
        }
        b.finish(rt)
    }

    /// Lossy conversion to UTF-8; unpaired surrogates become U+FFFD.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        char::decode_utf16(self.code_units())
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }

    pub(crate) fn append_segments(&self, out: &mut Vec<Segment>) {
        if self.len == 0 {
            return;
        }
        match &*self.repr.borrow() {
            Repr::Flat { storage, offset } => out.push(Segment {
                storage: Rc::clone(storage),
                offset: *offset,
                len: self.len,
            }),
            Repr::Segmented(segments) => out.extend(segments.iter().cloned()),
        }
    }
}

fn slice_segments(segments: &Rc<[Segment]>, start: usize, len: usize) -> Str {
    let mut pieces: Vec<Segment> = Vec::new();
    let mut skip = start;
    let mut take = len;
    for seg in segments.iter() {
        let seg_len = seg.len as usize;
        if skip >= seg_len {
            skip -= seg_len;
            continue;
        }
        let avail = seg_len - skip;
        let used = usize::min(avail, take);
        pieces.push(Segment {
            storage: Rc::clone(&seg.storage),
            offset: seg.offset + to_u32(skip),
            len: to_u32(used),
        });
        take -= used;
        skip = 0;
        if take == 0 {
            break;
        }
    }
    debug_assert_eq!(take, 0);
    if pieces.len() == 1 {
        let seg = &pieces[0];
        Str::flat(Rc::clone(&seg.storage), seg.offset, seg.len)
    } else {
        Str::segmented(Rc::from(pieces), to_u32(len))
    }
}

fn is_surrogate(unit: u16) -> bool {
    (0xD800..=0xDFFF).contains(&unit)
}

fn simple_lower(unit: u16) -> u16 {
    map_case(unit, char::to_lowercase)
}

fn simple_upper(unit: u16) -> u16 {
    map_case(unit, char::to_uppercase)
}

fn map_case<I>(unit: u16, map: fn(char) -> I) -> u16
where
    I: Iterator<Item = char>,
{
    if is_surrogate(unit) {
        return unit;
    }
    let Some(c) = char::from_u32(u32::from(unit)) else {
        return unit;
    };
    let mut mapped = map(c);
    match (mapped.next(), mapped.next()) {
        (Some(m), None) if (m as u32) <= 0xFFFF => m as u16,
        _ => unit,
    }
}

impl PartialEq for Str {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        if self.len == 0 {
            return true;
        }
        let (h1, h2) = (self.hash.get(), other.hash.get());
        if h1 != 0 && h2 != 0 && h1 != h2 {
            return false;
        }
        match (self.flat_units(), other.flat_units()) {
            // Fast path: both flat, one slice compare.
            (Some(a), Some(b)) => *a == *b,
            // Segment-wise comparison; no realization.
            _ => self.code_units().eq(other.code_units()),
        }
    }
}

impl Eq for Str {}

impl Hash for Str {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_code());
    }
}

impl PartialOrd for Str {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Str {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_ordinal(other)
    }
}

impl fmt::Display for Str {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in char::decode_utf16(self.code_units()) {
            fmt::Write::write_char(f, r.unwrap_or(char::REPLACEMENT_CHARACTER))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Str {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Str({:?})", self.to_string_lossy())
    }
}

/// Shared view of a string's contiguous code units.
///
/// Holds the storage alive; dereferences to `&[u16]`.
pub struct Units {
    storage: Rc<Storage>,
    start: usize,
    len: usize,
}

impl Deref for Units {
    type Target = [u16];

    fn deref(&self) -> &[u16] {
        &self.storage.units()[self.start..self.start + self.len]
    }
}

enum IterState {
    Flat { storage: Rc<Storage>, pos: usize },
    Segmented {
        segments: Rc<[Segment]>,
        seg: usize,
        pos: usize,
    },
}

/// Iterator over a string's code units; see [`Str::code_units`].
pub struct CodeUnits {
    state: IterState,
    remaining: usize,
}

impl Iterator for CodeUnits {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        match &mut self.state {
            IterState::Flat { storage, pos } => {
                let unit = storage.units()[*pos];
                *pos += 1;
                Some(unit)
            }
            IterState::Segmented { segments, seg, pos } => {
                let current = &segments[*seg];
                let unit = current.units()[*pos];
                *pos += 1;
                if *pos == current.len as usize {
                    *seg += 1;
                    *pos = 0;
                }
                Some(unit)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for CodeUnits {}
