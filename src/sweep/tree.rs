//! Tree sweep: emits every mark with exactly one `open` and one `close`,
//! nested when the marks nest. If the caller's marks do not properly nest,
//! the output is still balanced (every push is popped exactly once) but
//! may not be well-formed nested tags — that is the caller's
//! responsibility, not this crate's.

use std::collections::BinaryHeap;

use log::trace;

use crate::bookend::Bookends;
use crate::errors::Result;
use crate::mark::{ApplyOrder, CloseOrder, Mark, MarkKind};
use crate::store::MarkedText;
use crate::writer::BodyWriter;

/// Render `marked` as balanced nested open/close tags into `writer`, using
/// `bookends` to look up each kind's open/close bytes.
pub fn render_tree<K, B, W>(marked: &MarkedText<'_, K>, bookends: &B, writer: &mut W) -> Result<()>
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
            trace!("render_tree: close kind={} at {}", o.kind.index(), o.end());
            close_event(text, bookends, writer, &mut cursor, &mut out_heap, o)?;
        } else {
            let m = in_top.expect("in_top is Some in the open branch");
            trace!("render_tree: open kind={} at {}", m.kind.index(), m.offset);
            open_event(
                text,
                bookends,
                writer,
                &mut cursor,
                &mut in_heap,
                &mut out_heap,
                m,
            )?;
        }
    }

    writer.write_encoded(&text[cursor..])
}

fn open_event<K, B, W>(
    text: &[u8],
    bookends: &B,
    writer: &mut W,
    cursor: &mut usize,
    in_heap: &mut BinaryHeap<ApplyOrder<K>>,
    out_heap: &mut BinaryHeap<CloseOrder<K>>,
    m: Mark<K>,
) -> Result<()>
where
    K: MarkKind,
    B: Bookends<K>,
    W: BodyWriter,
{
    let pos = m.offset as usize;
    writer.write_encoded(&text[*cursor..pos])?;
    writer.write(bookends.open(m.kind))?;
    out_heap.push(CloseOrder(m));
    in_heap.pop();
    *cursor = pos;
    Ok(())
}

fn close_event<K, B, W>(
    text: &[u8],
    bookends: &B,
    writer: &mut W,
    cursor: &mut usize,
    out_heap: &mut BinaryHeap<CloseOrder<K>>,
    o: Mark<K>,
) -> Result<()>
where
    K: MarkKind,
    B: Bookends<K>,
    W: BodyWriter,
{
    let pos = o.end() as usize;
    writer.write_encoded(&text[*cursor..pos])?;
    writer.write(bookends.close(o.kind))?;
    out_heap.pop();
    *cursor = pos;
    Ok(())
}
