//! Stream sweep: produces in-band styled output correct for protocols that
//! cannot represent overlap (SGR terminal escapes). Whenever an inner span
//! closes, the enclosing outer span is re-announced; whenever two marks
//! share a boundary, a zero-width `open`-then-`close` pair is suppressed by
//! default (`skip_zero_width`).

use std::collections::BinaryHeap;

use log::{debug, trace};

use crate::bookend::Bookends;
use crate::errors::Result;
use crate::mark::{ApplyOrder, CloseOrder, Mark, MarkKind};
use crate::store::MarkedText;
use crate::writer::BodyWriter;

/// Render `marked` as a flat, re-opening stream suitable for ANSI/SGR-style
/// in-band markup. `skip_zero_width` (default: `true`) suppresses
/// `open`-immediately-`close` pairs at shared boundaries.
pub fn render_stream<K, B, W>(
    marked: &MarkedText<'_, K>,
    bookends: &B,
    writer: &mut W,
    skip_zero_width: bool,
) -> Result<()>
where
    K: MarkKind,
    B: Bookends<K>,
    W: BodyWriter,
{
    let text = marked.text();
    let mut in_heap: BinaryHeap<ApplyOrder<K>> = marked.clone_heap();
    let mut out_heap: BinaryHeap<CloseOrder<K>> = BinaryHeap::new();
    let mut cursor: usize = 0;

    loop {
        let in_top = in_heap.peek().map(|a| a.0);
        let out_top = out_heap.peek().map(|c| c.0);

        let close_next = match (in_top, out_top) {
            (None, None) => break,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (Some(m), Some(o)) => (o.end() as usize) < (m.offset as usize),
        };

        if close_next {
            let o = out_top.expect("out_top is Some in the close branch");
            trace!("render_stream: close kind={} at {}", o.kind.index(), o.end());
            close_event(
                text,
                bookends,
                writer,
                &mut cursor,
                &mut out_heap,
                o,
                skip_zero_width,
            )?;
        } else {
            let m = in_top.expect("in_top is Some in the open branch");
            trace!("render_stream: open kind={} at {}", m.kind.index(), m.offset);
            open_event(
                text,
                bookends,
                writer,
                &mut cursor,
                &mut in_heap,
                &mut out_heap,
                m,
                skip_zero_width,
            )?;
        }
    }

    writer.write_encoded(&text[cursor..])
}

/// Handles one opening event: re-closes a still-open outer span if it has
/// non-zero visible width, then either opens `m` or defers it if a
/// same-offset successor in `in_heap` will immediately supersede it.
#[allow(clippy::too_many_arguments)]
fn open_event<K, B, W>(
    text: &[u8],
    bookends: &B,
    writer: &mut W,
    cursor: &mut usize,
    in_heap: &mut BinaryHeap<ApplyOrder<K>>,
    out_heap: &mut BinaryHeap<CloseOrder<K>>,
    m: Mark<K>,
    skip_zero_width: bool,
) -> Result<()>
where
    K: MarkKind,
    B: Bookends<K>,
    W: BodyWriter,
{
    let pos = m.offset as usize;
    writer.write_encoded(&text[*cursor..pos])?;
    *cursor = pos;

    // 3a: an outer span still logically open may need re-closing before the
    // new inner span opens. It stays in `out_heap` — only the bytes are
    // re-emitted, the bookkeeping end is untouched.
    if let Some(o) = out_heap.peek().map(|c| c.0) {
        let covers = (o.end() as usize) > pos;
        let has_width = !skip_zero_width || (o.offset as usize) < *cursor;
        if covers && has_width {
            writer.write(bookends.close(o.kind))?;
        }
    }

    // 3b: pop `m` from IN; if the next IN mark shares its offset, defer —
    // a same-offset successor will immediately supersede `m`, so opening it
    // now (and closing it again before anything is written) would be
    // wasted output.
    in_heap.pop();
    let defer = skip_zero_width
        && in_heap
            .peek()
            .map(|a| a.0.offset as usize)
            .is_some_and(|next_offset| next_offset == pos);

    if defer {
        debug!(
            "render_stream: deferring zero-width open of kind={} at {pos}",
            m.kind.index()
        );
        out_heap.push(CloseOrder(m));
    } else {
        // 3c
        writer.write(bookends.open(m.kind))?;
        out_heap.push(CloseOrder(m));
    }
    Ok(())
}

/// Handles one closing event: closes `o`, then re-opens whichever span now
/// encloses the cursor, unless that span would close again immediately.
fn close_event<K, B, W>(
    text: &[u8],
    bookends: &B,
    writer: &mut W,
    cursor: &mut usize,
    out_heap: &mut BinaryHeap<CloseOrder<K>>,
    o: Mark<K>,
    skip_zero_width: bool,
) -> Result<()>
where
    K: MarkKind,
    B: Bookends<K>,
    W: BodyWriter,
{
    let pos = o.end() as usize;
    writer.write_encoded(&text[*cursor..pos])?;
    *cursor = pos;

    out_heap.pop();
    writer.write(bookends.close(o.kind))?;

    loop {
        match out_heap.peek().map(|c| c.0) {
            Some(next) if skip_zero_width && (next.end() as usize) == *cursor => {
                // it would close immediately; drop it without reopening.
                debug!(
                    "render_stream: suppressing zero-width reopen of kind={} at {}",
                    next.kind.index(),
                    *cursor
                );
                out_heap.pop();
            }
            Some(next) => {
                writer.write(bookends.open(next.kind))?;
                break;
            }
            None => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookend::BookendTable;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum K {
        Red,
        Teal,
        Green,
        Yellow,
        Blue,
        Outer,
        Inner,
    }

    impl MarkKind for K {
        const COUNT: usize = 7;
        fn index(self) -> usize {
            self as usize
        }
    }

    fn bookends() -> BookendTable<K> {
        BookendTable::new(vec![
            (b"<r>".to_vec(), b"</r>".to_vec()),
            (b"<t>".to_vec(), b"</t>".to_vec()),
            (b"<g>".to_vec(), b"</g>".to_vec()),
            (b"<y>".to_vec(), b"</y>".to_vec()),
            (b"<b>".to_vec(), b"</b>".to_vec()),
            (b"<o>".to_vec(), b"</o>".to_vec()),
            (b"<i>".to_vec(), b"</i>".to_vec()),
        ])
    }

    fn render(marked: &MarkedText<'_, K>, skip_zero_width: bool) -> String {
        let mut out = Vec::new();
        render_stream(marked, &bookends(), &mut out, skip_zero_width).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn scenario_a_shared_offset_nesting() {
        let text = b"red blue green yellow";
        let mut marked = MarkedText::<K>::init(text);
        marked.mark_slice(K::Red, 0, 3).unwrap();
        marked.mark_slice(K::Teal, 4, 14).unwrap();
        marked.mark_slice(K::Green, 9, 14).unwrap();
        marked.mark_slice(K::Yellow, 15, 21).unwrap();
        marked.mark_slice(K::Blue, 4, 8).unwrap();

        assert_eq!(
            render(&marked, true),
            "<r>red</r> <b>blue</b><t> </t><g>green</g> <y>yellow</y>"
        );
    }

    #[test]
    fn scenario_b_overlap_reopens_outer() {
        let text = b"func 10 funky 456";
        let mut marked = MarkedText::<K>::init(text);
        marked.mark_slice(K::Red, 0, 4).unwrap();
        marked.mark_slice(K::Blue, 5, 7).unwrap();
        marked.mark_slice(K::Red, 8, 13).unwrap();
        marked.mark_slice(K::Yellow, 9, 10).unwrap();
        marked.mark_slice(K::Blue, 14, 17).unwrap();

        assert_eq!(
            render(&marked, true),
            "<r>func</r> <b>10</b> <r>f</r><y>u</y><r>nky</r> <b>456</b>"
        );
    }

    #[test]
    fn scenario_f_zero_width_suppression_on() {
        let text = b"hello";
        let mut marked = MarkedText::<K>::init(text);
        marked.mark_slice(K::Outer, 0, 5).unwrap();
        marked.mark_slice(K::Inner, 0, 5).unwrap();

        assert_eq!(render(&marked, true), "<i>hello</i>");
    }

    #[test]
    fn scenario_f_zero_width_suppression_off() {
        // With skip_zero_width off, both opens are emitted — but the
        // renderer does not look ahead, so it still
        // faithfully closes-then-reopens Outer around the zero-width point
        // where Inner supersedes it, and again at the shared end.
        let text = b"hello";
        let mut marked = MarkedText::<K>::init(text);
        marked.mark_slice(K::Outer, 0, 5).unwrap();
        marked.mark_slice(K::Inner, 0, 5).unwrap();

        assert_eq!(render(&marked, false), "<o></o><i>hello</i><o></o>");
    }

    #[test]
    fn coverage_identity_strip() {
        let text = b"red blue green yellow";
        let mut marked = MarkedText::<K>::init(text);
        marked.mark_slice(K::Red, 0, 3).unwrap();
        marked.mark_slice(K::Blue, 4, 8).unwrap();

        let rendered = render(&marked, true);
        let stripped: String = rendered
            .replace("<r>", "")
            .replace("</r>", "")
            .replace("<b>", "")
            .replace("</b>", "");
        assert_eq!(stripped, std::str::from_utf8(text).unwrap());
    }

    #[test]
    fn insertion_order_does_not_affect_output() {
        let text = b"func 10 funky 456";
        let mut a = MarkedText::<K>::init(text);
        a.mark_slice(K::Red, 0, 4).unwrap();
        a.mark_slice(K::Blue, 5, 7).unwrap();
        a.mark_slice(K::Red, 8, 13).unwrap();
        a.mark_slice(K::Yellow, 9, 10).unwrap();
        a.mark_slice(K::Blue, 14, 17).unwrap();

        let mut b = MarkedText::<K>::init(text);
        b.mark_slice(K::Yellow, 9, 10).unwrap();
        b.mark_slice(K::Blue, 14, 17).unwrap();
        b.mark_slice(K::Red, 0, 4).unwrap();
        b.mark_slice(K::Blue, 5, 7).unwrap();
        b.mark_slice(K::Red, 8, 13).unwrap();

        assert_eq!(render(&a, true), render(&b, true));
    }
}
