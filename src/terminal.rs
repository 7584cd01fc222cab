//! Line-oriented terminal printer: drives the same heap-based sweep as
//! [`crate::sweep::stream`] but over `Color`-valued marks, one
//! logical line (`\n`, `\r`, or `\r\n`-terminated) per call, and partitions
//! `OUT` into three class stacks (foreground, background, underline) so
//! that closing an inner color restores whichever same-class mark encloses
//! it, rather than whatever happens to close next overall.

use std::collections::BinaryHeap;

use log::trace;

use crate::color::{Class, Color, ColorTable};
use crate::errors::Result;
use crate::mark::{ApplyOrder, CloseOrder, Mark, MarkKind};
use crate::store::MarkedText;
use crate::writer::BodyWriter;

/// What a call to [`LinePrinter::next_line`] reports about stream progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// A line terminator was consumed; more input remains.
    More,
    /// This call completed the final line; no terminator remains to
    /// consume and no marks remain open.
    Last,
    /// A previous call already returned `Last`; there is nothing left.
    Done,
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Event,
    Writing { target: usize },
    Last,
    Done,
}

const FOREGROUND: usize = 0;
const BACKGROUND: usize = 1;
const UNDERLINE: usize = 2;

fn class_index(color: &Color) -> Option<usize> {
    match color.class() {
        Class::Foreground => Some(FOREGROUND),
        Class::Background => Some(BACKGROUND),
        Class::Underline => Some(UNDERLINE),
        Class::Style => None,
    }
}

/// Drives a stream-sweep-shaped render over `Color`-valued marks, one
/// logical line per [`Self::next_line`] call.
pub struct LinePrinter<'t, K: MarkKind, C> {
    text: &'t [u8],
    colors: C,
    in_heap: BinaryHeap<ApplyOrder<K>>,
    out_heap: BinaryHeap<CloseOrder<K>>,
    stacks: [Vec<Mark<K>>; 3],
    cursor: usize,
    step: Step,
    // set after a call returns having consumed a terminator: the next call
    // must re-assert every still-open class's color before resuming text,
    // since a terminal repositions between lines and forgets SGR state.
    fresh_line: bool,
}

impl<'t, K: MarkKind, C: ColorTable<K>> LinePrinter<'t, K, C> {
    /// Build a printer over `marked`, using `colors` to resolve each mark's
    /// kind to its [`Color`].
    pub fn new(marked: &MarkedText<'t, K>, colors: C) -> Self {
        Self {
            text: marked.text(),
            colors,
            in_heap: marked.clone_heap(),
            out_heap: BinaryHeap::new(),
            stacks: [Vec::new(), Vec::new(), Vec::new()],
            cursor: 0,
            step: Step::Event,
            fresh_line: true,
        }
    }

    /// Rebind to a new marked text, resetting cursor, heaps, and stacks
    /// while retaining the stacks' allocated capacity.
    pub fn new_text(&mut self, marked: &MarkedText<'t, K>) {
        self.text = marked.text();
        self.in_heap = marked.clone_heap();
        self.out_heap.clear();
        for stack in &mut self.stacks {
            stack.clear();
        }
        self.cursor = 0;
        self.step = Step::Event;
        self.fresh_line = true;
    }

    /// Run the state machine until a line terminator is consumed or the
    /// stream is exhausted. Markup bookends are always written raw; literal
    /// text is routed through `writer.write_encoded`.
    pub fn next_line<W: BodyWriter>(&mut self, writer: &mut W) -> Result<LineOutcome> {
        if self.fresh_line {
            self.fresh_line = false;
            for stack in &self.stacks {
                if let Some(top) = stack.last() {
                    writer.write(&self.colors.color(top.kind).on())?;
                }
            }
        }

        loop {
            match self.step {
                Step::Done => return Ok(LineOutcome::Done),
                Step::Event => {
                    self.step = self.perform_event(writer)?;
                }
                Step::Writing { target } => {
                    // A terminator consumed by a prior call can land exactly
                    // on a mark boundary (the `\n` of a CRLF pair straddling
                    // `target`) and advance `cursor` past it; clamp so this
                    // call never re-slices backwards.
                    let target = target.max(self.cursor);
                    if self.emit_until(target, writer)? {
                        self.fresh_line = true;
                        return Ok(LineOutcome::More);
                    }
                    self.step = Step::Event;
                }
                Step::Last => {
                    let end = self.text.len();
                    let hit_terminator = self.emit_until(end, writer)?;
                    if hit_terminator {
                        if self.cursor >= end {
                            self.step = Step::Done;
                            return Ok(LineOutcome::Last);
                        }
                        self.fresh_line = true;
                        return Ok(LineOutcome::More);
                    }
                    self.step = Step::Done;
                    return Ok(LineOutcome::Last);
                }
            }
        }
    }

    /// `this_mark`/`next_mark`: perform exactly one open or close event,
    /// then compute where the following text span should stop.
    fn perform_event<W: BodyWriter>(&mut self, writer: &mut W) -> Result<Step> {
        let in_top = self.in_heap.peek().map(|a| a.0);
        let out_top = self.out_heap.peek().map(|c| c.0);

        let close_next = match (in_top, out_top) {
            (None, None) => return Ok(Step::Last),
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (Some(m), Some(o)) => (o.end() as usize) < (m.offset as usize),
        };

        if close_next {
            let o = out_top.expect("out_top is Some in the close branch");
            trace!("LinePrinter: close kind={} at {}", o.kind.index(), o.end());
            self.out_heap.pop();
            self.remove_from_class_stack(o);
            writer.write(&self.colors.color(o.kind).off())?;
            if let Some(reopen) = self.class_stack_top(o.kind) {
                writer.write(&self.colors.color(reopen.kind).on())?;
            }
        } else {
            let m = in_top.expect("in_top is Some in the open branch");
            trace!("LinePrinter: open kind={} at {}", m.kind.index(), m.offset);
            self.in_heap.pop();
            writer.write(&self.colors.color(m.kind).on())?;
            self.out_heap.push(CloseOrder(m));
            self.push_class_stack(m);
        }

        let next_in = self.in_heap.peek().map(|a| a.0.offset as usize);
        let next_out = self.out_heap.peek().map(|c| c.0.end() as usize);
        let target = match (next_in, next_out) {
            (None, None) => return Ok(Step::Last),
            (Some(o), None) => o,
            (None, Some(e)) => e,
            (Some(o), Some(e)) => o.min(e),
        };
        Ok(Step::Writing { target })
    }

    /// Emit `text[cursor..target]`, stopping (without emitting) at the first
    /// line terminator. Returns whether a terminator was consumed.
    fn emit_until<W: BodyWriter>(&mut self, target: usize, writer: &mut W) -> Result<bool> {
        match find_terminator(self.text, self.cursor, target) {
            Some((term_start, after)) => {
                writer.write_encoded(&self.text[self.cursor..term_start])?;
                self.cursor = after;
                Ok(true)
            }
            None => {
                writer.write_encoded(&self.text[self.cursor..target])?;
                self.cursor = target;
                Ok(false)
            }
        }
    }

    fn push_class_stack(&mut self, m: Mark<K>) {
        let color = self.colors.color(m.kind);
        if let Some(idx) = class_index(&color) {
            self.stacks[idx].push(m);
        }
    }

    /// Ordered removal: search from the top, since `Ord_out` guarantees an
    /// inner mark of a class sits above its same-class enclosing mark.
    fn remove_from_class_stack(&mut self, m: Mark<K>) {
        let color = self.colors.color(m.kind);
        if let Some(idx) = class_index(&color) {
            if let Some(pos) = self.stacks[idx].iter().rposition(|&entry| entry == m) {
                self.stacks[idx].remove(pos);
            }
        }
    }

    fn class_stack_top(&self, kind: K) -> Option<Mark<K>> {
        let idx = class_index(&self.colors.color(kind))?;
        self.stacks[idx].last().copied()
    }
}

/// The first line terminator in `text[from..to]` (`\n`, lone `\r`, or
/// `\r\n`), as `(start, position just past it)`.
fn find_terminator(text: &[u8], from: usize, to: usize) -> Option<(usize, usize)> {
    let rel = memchr::memchr2(b'\n', b'\r', &text[from..to])?;
    let i = from + rel;
    match text[i] {
        b'\r' if text.get(i + 1) == Some(&b'\n') => Some((i, i + 2)),
        _ => Some((i, i + 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BasicColor, ColorArrayTable, ColorValue};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum K {
        Fg,
        Bg,
        Fg2,
    }

    impl MarkKind for K {
        const COUNT: usize = 3;
        fn index(self) -> usize {
            self as usize
        }
    }

    fn colors() -> ColorArrayTable<K> {
        ColorArrayTable::new(vec![
            Color::foreground(ColorValue::Basic(BasicColor::Red)),
            Color::background(ColorValue::Basic(BasicColor::Blue)),
            Color::foreground(ColorValue::Basic(BasicColor::Green)),
        ])
    }

    fn drive(printer: &mut LinePrinter<'_, K, ColorArrayTable<K>>) -> Vec<(LineOutcome, String)> {
        let mut out = Vec::new();
        loop {
            let mut buf = Vec::new();
            let outcome = printer.next_line(&mut buf).unwrap();
            let text = String::from_utf8(buf).unwrap();
            let done = outcome == LineOutcome::Done;
            out.push((outcome, text));
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn scenario_e_style_reasserted_across_line_break() {
        let text = b"ab\ncd";
        let mut marked = MarkedText::<K>::init(text);
        marked.mark_slice(K::Fg, 0, 5).unwrap();

        let mut printer = LinePrinter::new(&marked, colors());
        let lines = drive(&mut printer);

        assert_eq!(lines[0], (LineOutcome::More, "\x1b[31mab".to_string()));
        assert_eq!(lines[1], (LineOutcome::Last, "\x1b[31mcd\x1b[39m".to_string()));
        assert_eq!(lines[2], (LineOutcome::Done, String::new()));
    }

    #[test]
    fn crlf_terminator_straddling_mark_boundary_does_not_panic() {
        // The mark ends at byte 3, the `\r` of the `\r\n` pair at bytes 2-3;
        // consuming the whole pair in one step advances `cursor` to 4,
        // past the pending `Writing { target: 3 }` from the call that
        // opened the mark. The next call must clamp to `cursor`, not
        // re-slice `text[4..3]`.
        let text = b"ab\r\ncd";
        let mut marked = MarkedText::<K>::init(text);
        marked.mark_slice(K::Fg, 0, 3).unwrap();

        let mut printer = LinePrinter::new(&marked, colors());
        let lines = drive(&mut printer);

        assert_eq!(lines[0], (LineOutcome::More, "\x1b[31mab".to_string()));
        assert_eq!(
            lines[1],
            (LineOutcome::Last, "\x1b[31m\x1b[39mcd".to_string())
        );
        assert_eq!(lines[2], (LineOutcome::Done, String::new()));
    }

    #[test]
    fn nested_same_class_marks_reopen_enclosing_color() {
        let text = b"outer inner outer";
        let mut marked = MarkedText::<K>::init(text);
        marked.mark_slice(K::Fg, 0, 17).unwrap();
        marked.mark_slice(K::Fg2, 6, 11).unwrap();

        let mut printer = LinePrinter::new(&marked, colors());
        let mut buf = Vec::new();
        let outcome = printer.next_line(&mut buf).unwrap();
        assert_eq!(outcome, LineOutcome::Last);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "\x1b[31mouter \x1b[32minner\x1b[39m\x1b[31m outer\x1b[39m"
        );
    }

    #[test]
    fn different_classes_do_not_interfere() {
        let text = b"hi";
        let mut marked = MarkedText::<K>::init(text);
        marked.mark_slice(K::Fg, 0, 2).unwrap();
        marked.mark_slice(K::Bg, 0, 2).unwrap();

        let mut printer = LinePrinter::new(&marked, colors());
        let mut buf = Vec::new();
        printer.next_line(&mut buf).unwrap();
        let rendered = String::from_utf8(buf).unwrap();
        assert!(rendered.contains("\x1b[31m"));
        assert!(rendered.contains("\x1b[44m"));
        assert!(rendered.contains("hi"));
    }

    #[test]
    fn no_marks_is_a_single_last_line() {
        let text = b"plain";
        let marked = MarkedText::<K>::init(text);
        let mut printer = LinePrinter::new(&marked, colors());
        let mut buf = Vec::new();
        assert_eq!(printer.next_line(&mut buf).unwrap(), LineOutcome::Last);
        assert_eq!(buf, b"plain");
        let mut buf2 = Vec::new();
        assert_eq!(printer.next_line(&mut buf2).unwrap(), LineOutcome::Done);
        assert!(buf2.is_empty());
    }

    #[test]
    fn new_text_resets_state() {
        let text1 = b"aaa";
        let mut marked1 = MarkedText::<K>::init(text1);
        marked1.mark_slice(K::Fg, 0, 3).unwrap();
        let mut printer = LinePrinter::new(&marked1, colors());
        let mut buf = Vec::new();
        printer.next_line(&mut buf).unwrap();

        let text2 = b"bbb";
        let marked2 = MarkedText::<K>::init(text2);
        printer.new_text(&marked2);
        let mut buf2 = Vec::new();
        assert_eq!(printer.next_line(&mut buf2).unwrap(), LineOutcome::Last);
        assert_eq!(buf2, b"bbb");
    }
}
