//! Owns the borrowed text and the heap of marks attached to it.
//!
//! `MarkedText` accepts marks in any order (`mark_slice`, `mark_from`, and
//! the search/match helpers below), and hands out clones of its internal
//! heap to the sweep engines so a render never disturbs the store — callers
//! may keep adding marks and re-render afterwards.

use std::collections::BinaryHeap;

use log::{debug, warn};

use crate::errors::{Error, Result};
use crate::mark::{ApplyOrder, Mark, MarkKind};
use crate::matcher::Matcher;

/// Borrowed text plus the marks attached to it.
///
/// The text is never owned and never mutated; only the mark heap grows.
#[derive(Debug, Clone)]
pub struct MarkedText<'t, K: MarkKind> {
    text: &'t [u8],
    marks: BinaryHeap<ApplyOrder<K>>,
}

impl<'t, K: MarkKind> MarkedText<'t, K> {
    /// An empty mark store over `text`.
    pub fn init(text: &'t [u8]) -> Self {
        Self {
            text,
            marks: BinaryHeap::new(),
        }
    }

    /// Like [`Self::init`], pre-reserving room for `capacity` marks.
    pub fn init_with_capacity(text: &'t [u8], capacity: usize) -> Self {
        Self {
            text,
            marks: BinaryHeap::with_capacity(capacity),
        }
    }

    /// The underlying text.
    #[inline]
    pub fn text(&self) -> &'t [u8] {
        self.text
    }

    /// Number of marks currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Whether no marks have been added yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Attach `kind` to the half-open byte range `start..end`.
    ///
    /// Fails with [`Error::InvalidRegion`] if `start > end` or `end` exceeds
    /// the length of the text.
    pub fn mark_slice(&mut self, kind: K, start: usize, end: usize) -> Result<()> {
        if start > end || end > self.text.len() {
            return Err(Error::invalid_region(start, end, self.text.len()));
        }
        self.push_mark(kind, start, end - start)
    }

    /// Attach `kind` to `offset..offset+len`.
    ///
    /// Fails with [`Error::InvalidRegion`] if `offset + len` overflows,
    /// exceeds `u32`, or exceeds the length of the text.
    pub fn mark_from(&mut self, kind: K, offset: usize, len: usize) -> Result<()> {
        let end = offset
            .checked_add(len)
            .ok_or_else(|| Error::invalid_region(offset, usize::MAX, self.text.len()))?;
        if end > self.text.len() {
            return Err(Error::invalid_region(offset, end, self.text.len()));
        }
        self.push_mark(kind, offset, len)
    }

    /// Mark the first byte-wise occurrence of `needle`, if any.
    ///
    /// Returns the byte offset the match starts at, or `None` if `needle`
    /// does not occur in the text. Only allocation failure is an `Err`.
    pub fn find_and_mark(&mut self, kind: K, needle: &[u8]) -> Result<Option<usize>> {
        self.find_and_mark_pos(kind, needle, 0)
    }

    /// Mark the first occurrence of `needle` at or after byte `from`.
    pub fn find_and_mark_pos(
        &mut self,
        kind: K,
        needle: &[u8],
        from: usize,
    ) -> Result<Option<usize>> {
        if from > self.text.len() {
            return Ok(None);
        }
        match memchr::memmem::find(&self.text[from..], needle) {
            Some(rel) => {
                let start = from + rel;
                self.push_mark(kind, start, needle.len())?;
                Ok(Some(start))
            }
            None => {
                debug!("find_and_mark_pos: no occurrence of needle from byte {from}");
                Ok(None)
            }
        }
    }

    /// Mark the last occurrence of `needle`, if any.
    pub fn find_and_mark_last(&mut self, kind: K, needle: &[u8]) -> Result<Option<usize>> {
        match memchr::memmem::rfind(self.text, needle) {
            Some(start) => {
                self.push_mark(kind, start, needle.len())?;
                Ok(Some(start))
            }
            None => {
                debug!("find_and_mark_last: no occurrence of needle");
                Ok(None)
            }
        }
    }

    /// Mark the first match of `matcher`, if any.
    pub fn match_and_mark<M: Matcher>(&mut self, kind: K, matcher: &M) -> Result<Option<usize>> {
        self.match_and_mark_pos(kind, matcher, 0)
    }

    /// Mark the first match of `matcher` at or after byte `from`.
    pub fn match_and_mark_pos<M: Matcher>(
        &mut self,
        kind: K,
        matcher: &M,
        from: usize,
    ) -> Result<Option<usize>> {
        match matcher.find_at(self.text, from) {
            Some((start, end)) => {
                self.push_mark(kind, start, end - start)?;
                Ok(Some(start))
            }
            None => {
                debug!("match_and_mark_pos: matcher found nothing from byte {from}");
                Ok(None)
            }
        }
    }

    /// Mark every non-overlapping match of `matcher`. Returns whether any
    /// match was found.
    pub fn match_and_mark_all<M: Matcher>(&mut self, kind: K, matcher: &M) -> Result<bool> {
        let hits: Vec<(usize, usize)> = matcher.find_iter(self.text).collect();
        let any = !hits.is_empty();
        if !any {
            debug!("match_and_mark_all: matcher found no occurrences");
        }
        for (start, end) in hits {
            self.push_mark(kind, start, end - start)?;
        }
        Ok(any)
    }

    fn push_mark(&mut self, kind: K, offset: usize, len: usize) -> Result<()> {
        let invalid = || Error::invalid_region(offset, offset.saturating_add(len), self.text.len());
        let offset_u32 = u32::try_from(offset).map_err(|_| invalid())?;
        let len_u32 = u32::try_from(len).map_err(|_| invalid())?;
        // `Mark::end()` adds these as `u32`; reject here rather than let it
        // overflow later (panic in debug, wrap in release).
        offset_u32.checked_add(len_u32).ok_or_else(invalid)?;
        self.marks.try_reserve(1).map_err(|_| {
            warn!("push_mark: failed to grow the mark heap by one entry");
            Error::OutOfMemory
        })?;
        self.marks.push(ApplyOrder(Mark {
            kind,
            offset: offset_u32,
            len: len_u32,
        }));
        Ok(())
    }

    /// Clone the apply-heap for a render sweep. The store itself is
    /// untouched; callers may keep inserting marks and render again.
    pub(crate) fn clone_heap(&self) -> BinaryHeap<ApplyOrder<K>> {
        self.marks.clone()
    }

    /// All marks, in unspecified order. Intended for tests and debugging.
    pub fn marks(&self) -> impl Iterator<Item = &Mark<K>> {
        self.marks.iter().map(|a| &a.0)
    }
}
