#![deny(dead_code)]
#![deny(missing_docs)]
#![deny(clippy::dbg_macro)]
#![warn(clippy::pedantic)]

//! obelizmo
//!
//! Attach typed markup spans ("marks") to immutable, borrowed text and
//! render them either as balanced nested tags (the tree sweep) or as an
//! ANSI/SGR-correct in-band stream that re-opens enclosing styles around
//! overlapping inner ones (the stream sweep). A [`terminal::LinePrinter`]
//! drives the stream sweep one logical line at a time for raw-mode
//! terminal output, tracking per-class (foreground/background/underline)
//! style stacks so an inner color's close restores its enclosing color.

mod bookend;
pub mod color;
pub mod errors;
mod mark;
mod matcher;
mod store;
mod sweep;
pub mod terminal;
mod writer;

pub use bookend::{Bookends, BookendTable};
pub use errors::{Error, Result};
pub use mark::{Mark, MarkKind};
pub use matcher::Matcher;
pub use store::MarkedText;
pub use sweep::{render_stream, render_tree};
pub use writer::{escape_html, BodyWriter, HtmlEscaper};

pub use self::color::*;
pub use self::terminal::*;
