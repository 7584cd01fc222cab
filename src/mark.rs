//! A `Mark` is a typed annotation over a half-open byte range of some text,
//! plus the two priority orderings the sweep engines need: `Ord_in`, the
//! order marks are opened in, and `Ord_out`, the order open marks are
//! closed in.

use std::cmp::Reverse;

/// A caller-chosen, finite tag type usable as a mark's kind.
///
/// Implementors only need to be cheaply copyable and to expose a dense,
/// zero-based discriminant (`index`) with a known upper bound (`COUNT`), so
/// that bookend and color tables can be plain arrays rather than maps.
pub trait MarkKind: Copy + Eq {
    /// Number of distinct kinds. Tables indexed by `index()` must have
    /// exactly this many entries.
    const COUNT: usize;

    /// Dense, zero-based discriminant for `self`.
    fn index(self) -> usize;
}

/// An immutable `(kind, offset, len)` triple attached to a byte range of
/// some text. `end = offset + len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark<K> {
    /// The caller-chosen tag for this span.
    pub kind: K,
    /// Start offset, in bytes, into the owning text.
    pub offset: u32,
    /// Length, in bytes, of the covered region.
    pub len: u32,
}

impl<K: MarkKind> Mark<K> {
    /// One past the last byte this mark covers.
    #[inline]
    pub fn end(&self) -> u32 {
        self.offset + self.len
    }

    /// Whether this mark covers byte position `pos` (`offset <= pos < end`).
    #[inline]
    pub fn covers(&self, pos: u32) -> bool {
        self.offset <= pos && pos < self.end()
    }

    fn apply_key(&self) -> (Reverse<u32>, u32, Reverse<usize>) {
        (Reverse(self.offset), self.len, Reverse(self.kind.index()))
    }

    fn close_key(&self) -> (Reverse<u32>, Reverse<u32>, usize) {
        (Reverse(self.end()), Reverse(self.len), self.kind.index())
    }
}

/// Wraps a [`Mark`] so it orders by `Ord_in`: `(offset asc, len desc, kind
/// asc)`. A `BinaryHeap<ApplyOrder<K>>` pops the next mark to *open*.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOrder<K>(
    /// the wrapped mark.
    pub Mark<K>,
);

impl<K: MarkKind> PartialOrd for ApplyOrder<K> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: MarkKind> Ord for ApplyOrder<K> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.apply_key().cmp(&other.0.apply_key())
    }
}

/// Wraps a [`Mark`] so it orders by `Ord_out`: `(end asc, len asc, kind
/// desc)`. A `BinaryHeap<CloseOrder<K>>` pops the next open mark to *close*.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseOrder<K>(
    /// the wrapped mark.
    pub Mark<K>,
);

impl<K: MarkKind> PartialOrd for CloseOrder<K> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: MarkKind> Ord for CloseOrder<K> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.close_key().cmp(&other.0.close_key())
    }
}
