//! Segmented strings: many storage views stitched into one value.

use std::rc::Rc;

use super::{Str, storage::Storage, to_u32};
use crate::runtime::Runtime;

/// One contiguous piece of a segmented string.
///
/// Invariant: `len > 0`. Zero-length pieces are dropped at construction so
/// that iteration never has to skip empty segments.
#[derive(Clone, Debug)]
pub(crate) struct Segment {
    pub(crate) storage: Rc<Storage>,
    pub(crate) offset: u32,
    pub(crate) len: u32,
}

impl Segment {
    #[inline]
    pub(crate) fn units(&self) -> &[u16] {
        let start = self.offset as usize;
        &self.storage.units()[start..start + self.len as usize]
    }
}

/// Collects string pieces without copying and stitches them into one [`Str`].
///
/// Each [`push`](Rope::push) is O(1) in the piece's length: the piece's
/// storage is referenced, not copied. The finished string stays segmented
/// until an operation needs contiguous memory, at which point it is realized
/// into a single flat buffer.
///
/// # Examples
///
/// ```
/// use jsonrope::{Rope, Runtime};
///
/// let rt = Runtime::new();
/// let mut rope = Rope::new();
/// rope.push(&rt.str_from_str("foo"));
/// rope.push(&rt.str_from_str("bar"));
/// let joined = rope.finish(&rt);
/// assert_eq!(joined, rt.str_from_str("foobar"));
/// ```
#[derive(Default)]
pub struct Rope {
    segments: Vec<Segment>,
    total: usize,
}

impl Rope {
    /// Creates an empty rope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total length in code units of the pieces pushed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.total
    }

    /// Returns `true` if no pieces have been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Appends a piece. Empty strings are ignored; segmented pieces
    /// contribute their segments directly rather than nesting.
    pub fn push(&mut self, piece: &Str) {
        piece.append_segments(&mut self.segments);
        self.total += piece.len();
    }

    /// Builds the final string.
    ///
    /// Results of length ≤ 1 in the canonical range come from the intern
    /// table; a single piece covering one storage range stays a flat view.
    #[must_use]
    pub fn finish(self, rt: &Runtime) -> Str {
        match self.segments.len() {
            0 => rt.interner().empty(),
            1 => {
                let seg = &self.segments[0];
                if seg.len == 1 {
                    return rt.str_from_units(seg.units());
                }
                Str::flat(seg.storage.clone(), seg.offset, seg.len)
            }
            _ => Str::segmented(Rc::from(self.segments), to_u32(self.total)),
        }
    }
}
