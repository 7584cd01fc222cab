//! The minimal regex capability the mark store needs: a single match, a
//! match at-or-after a position, and an iterator over all non-overlapping
//! matches, each yielding a half-open byte range.
//!
//! Kept intentionally small — one trait, three methods, no associated
//! lifetime-infected iterator type — so any regex engine can implement it
//! with a handful of lines. `regex::Regex` does, behind the `regex` feature
//! (on by default).

/// A value that can locate byte ranges in a haystack.
pub trait Matcher {
    /// First match anywhere in `text`.
    fn find(&self, text: &[u8]) -> Option<(usize, usize)>;

    /// First match starting at or after byte `from`.
    fn find_at(&self, text: &[u8], from: usize) -> Option<(usize, usize)>;

    /// All non-overlapping matches, left to right.
    fn find_iter<'a>(&'a self, text: &'a [u8]) -> Box<dyn Iterator<Item = (usize, usize)> + 'a>;
}

#[cfg(feature = "regex")]
impl Matcher for regex::Regex {
    fn find(&self, text: &[u8]) -> Option<(usize, usize)> {
        // `regex::Regex` is a str matcher; obelizmo's text is a borrowed
        // byte slice, but marks are only ever produced from byte offsets
        // that regex itself reports on valid UTF-8 input, so round-tripping
        // through `str` here is safe for the inputs this crate documents
        // (`regex` does not support searching over raw, possibly-invalid
        // UTF-8 byte slices).
        let s = std::str::from_utf8(text).ok()?;
        self.find(s).map(|m| (m.start(), m.end()))
    }

    fn find_at(&self, text: &[u8], from: usize) -> Option<(usize, usize)> {
        let s = std::str::from_utf8(text).ok()?;
        self.find_at(s, from).map(|m| (m.start(), m.end()))
    }

    fn find_iter<'a>(&'a self, text: &'a [u8]) -> Box<dyn Iterator<Item = (usize, usize)> + 'a> {
        match std::str::from_utf8(text) {
            Ok(s) => Box::new(regex::Regex::find_iter(self, s).map(|m| (m.start(), m.end()))),
            Err(_) => Box::new(std::iter::empty()),
        }
    }
}
