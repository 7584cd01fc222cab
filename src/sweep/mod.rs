//! The two rendering sweeps: [`tree`] emits each mark with exactly one open
//! and one close, suitable for nesting tag formats; [`stream`] re-announces
//! enclosing styles around inner ones, suitable for in-band signaling such
//! as ANSI/SGR where overlap cannot be represented directly.
//!
//! Both consume a *clone* of the mark store's heap ([`crate::MarkedText::clone_heap`]
//! through the crate-private accessor), so rendering never disturbs the
//! store itself.

pub mod stream;
pub mod tree;

pub use stream::render_stream;
pub use tree::render_tree;
