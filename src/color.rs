//! Terminal color taxonomy and SGR escape grammar.
//!
//! [`Color`] is a tagged sum describing one terminal styling attribute —
//! an underline variant, a background, a foreground (with its bundled
//! style attributes), or a reset. Each variant knows its [`Class`] and can
//! emit the raw `on`/`off` SGR byte sequences used by [`crate::terminal`].
//! [`ColorTable`] maps a caller's [`MarkKind`] to its [`Color`], mirroring
//! [`crate::bookend::BookendTable`] for the plain-bytes case.

use std::marker::PhantomData;

use enumflags2::{bitflags, BitFlags};

use crate::mark::MarkKind;

/// The four independent channels a terminal line tracks while printing.
/// Foreground, background and underline each hold at most one open mark at a
/// time (their own class stack); `Style` marks (inverse, invisible, reset)
/// are not stacked at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// Text color and its bundled style attributes.
    Foreground,
    /// The cell background color.
    Background,
    /// The underline style and its color.
    Underline,
    /// Not stacked: inverse, invisible, and resets.
    Style,
}

/// One of the eight ANSI base colors (SGR codes `30`-`37`/`40`-`47`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicColor {
    /// SGR code 0.
    Black,
    /// SGR code 1.
    Red,
    /// SGR code 2.
    Green,
    /// SGR code 3.
    Yellow,
    /// SGR code 4.
    Blue,
    /// SGR code 5.
    Magenta,
    /// SGR code 6.
    Cyan,
    /// SGR code 7.
    White,
}

impl BasicColor {
    fn code(self) -> u8 {
        match self {
            BasicColor::Black => 0,
            BasicColor::Red => 1,
            BasicColor::Green => 2,
            BasicColor::Yellow => 3,
            BasicColor::Blue => 4,
            BasicColor::Magenta => 5,
            BasicColor::Cyan => 6,
            BasicColor::White => 7,
        }
    }
}

/// A color value usable as a foreground, background, or underline color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorValue {
    /// The terminal's default color for this channel.
    Default,
    /// One of the eight basic ANSI colors.
    Basic(BasicColor),
    /// An index into the 256-color palette.
    Palette(u8),
    /// A 24-bit true color.
    Rgb(u8, u8, u8),
}

impl ColorValue {
    fn fg_on(&self) -> Vec<u8> {
        match self {
            ColorValue::Default => csi("39"),
            ColorValue::Basic(b) => csi(format!("3{}", b.code())),
            ColorValue::Palette(d) => csi(format!("38:5:{d}")),
            ColorValue::Rgb(r, g, b) => csi(format!("38:2::{r}:{g}:{b}")),
        }
    }

    fn bg_on(&self) -> Vec<u8> {
        match self {
            ColorValue::Default => csi("49"),
            ColorValue::Basic(b) => csi(format!("4{}", b.code())),
            ColorValue::Palette(d) => csi(format!("48:5:{d}")),
            ColorValue::Rgb(r, g, b) => csi(format!("48:2::{r}:{g}:{b}")),
        }
    }

    /// Underline color shares the `58`/`59` prefix; basic colors have no
    /// dedicated underline-color SGR code and are emulated through the
    /// 256-color palette indices `0`-`7`.
    fn underline_on(&self) -> Vec<u8> {
        match self {
            ColorValue::Default => csi("59"),
            ColorValue::Basic(b) => csi(format!("58:5:{}", b.code())),
            ColorValue::Palette(d) => csi(format!("58:5:{d}")),
            ColorValue::Rgb(r, g, b) => csi(format!("58:2::{r}:{g}:{b}")),
        }
    }
}

/// The style attributes and color bundled with a foreground, superscript or
/// subscript mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Foreground {
    /// The text color, if overridden from the terminal default.
    pub color: Option<ColorValue>,
    /// SGR bold (`1`).
    pub bold: bool,
    /// SGR faint (`2`).
    pub faint: bool,
    /// SGR italic (`3`).
    pub italic: bool,
    /// SGR blink (`5`).
    pub blink: bool,
    /// SGR rapid blink (`6`).
    pub rapid_blink: bool,
    /// SGR strikethrough (`9`).
    pub strikethrough: bool,
    /// SGR overline (`53`).
    pub overline: bool,
}

impl Foreground {
    fn on_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if let Some(c) = &self.color {
            out.extend(c.fg_on());
        }
        if self.bold {
            out.extend(csi("1"));
        }
        if self.faint {
            out.extend(csi("2"));
        }
        if self.italic {
            out.extend(csi("3"));
        }
        if self.blink {
            out.extend(csi("5"));
        }
        if self.rapid_blink {
            out.extend(csi("6"));
        }
        if self.strikethrough {
            out.extend(csi("9"));
        }
        if self.overline {
            out.extend(csi("53"));
        }
        out
    }

    fn off_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if self.color.is_some() {
            out.extend(csi("39"));
        }
        if self.bold || self.faint {
            out.extend(csi("22"));
        }
        if self.italic {
            out.extend(csi("23"));
        }
        if self.blink || self.rapid_blink {
            out.extend(csi("25"));
        }
        if self.strikethrough {
            out.extend(csi("29"));
        }
        if self.overline {
            out.extend(csi("55"));
        }
        out
    }
}

/// Which attribute categories a [`Color::Reset`] mark clears. `all` implies
/// every other bit and is emitted alone as the single SGR full reset.
#[bitflags]
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetFlag {
    /// Full reset (`\e[0m`); implies every other bit.
    All,
    /// Clears bold/faint (`\e[22m`).
    Neutral,
    /// Clears italic (`\e[23m`).
    Upright,
    /// Clears blink/rapid blink (`\e[25m`).
    Steady,
    /// Clears superscript/subscript (`\e[75m`).
    Baseline,
    /// Clears the foreground color (`\e[39m`).
    Foreground,
    /// Clears the background color (`\e[49m`).
    Background,
    /// Clears the underline style (`\e[24m`).
    Underline,
    /// Clears the underline color (`\e[59m`).
    UnderlineColor,
}

/// A combination of [`ResetFlag`] bits, the payload of [`Color::Reset`].
pub type Resets = BitFlags<ResetFlag>;

fn default_resets() -> Resets {
    ResetFlag::All.into()
}

fn reset_on_bytes(resets: Resets) -> Vec<u8> {
    if resets.contains(ResetFlag::All) {
        return csi("0");
    }
    let mut out = Vec::new();
    if resets.contains(ResetFlag::Neutral) {
        out.extend(csi("22"));
    }
    if resets.contains(ResetFlag::Upright) {
        out.extend(csi("23"));
    }
    if resets.contains(ResetFlag::Steady) {
        out.extend(csi("25"));
    }
    if resets.contains(ResetFlag::Baseline) {
        out.extend(csi("75"));
    }
    if resets.contains(ResetFlag::Foreground) {
        out.extend(csi("39"));
    }
    if resets.contains(ResetFlag::Background) {
        out.extend(csi("49"));
    }
    if resets.contains(ResetFlag::Underline) {
        out.extend(csi("24"));
    }
    if resets.contains(ResetFlag::UnderlineColor) {
        out.extend(csi("59"));
    }
    out
}

fn csi(code: impl AsRef<str>) -> Vec<u8> {
    format!("\x1b[{}m", code.as_ref()).into_bytes()
}

/// One terminal styling attribute. Every variant belongs to a [`Class`] and
/// knows its own `on`/`off` SGR bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// A single underline in the given color.
    Underline(ColorValue),
    /// A double underline in the given color.
    DoubleUnderline(ColorValue),
    /// A curly underline in the given color.
    CurlyUnderline(ColorValue),
    /// A dotted underline in the given color.
    DottedUnderline(ColorValue),
    /// A dashed underline in the given color.
    DashedUnderline(ColorValue),
    /// The cell background color.
    Background(ColorValue),
    /// Text color plus bundled style attributes.
    Foreground(Foreground),
    /// Superscript, with its own color and style attributes.
    Superscript(Foreground),
    /// Subscript, with its own color and style attributes.
    Subscript(Foreground),
    /// Swap foreground and background.
    Inverse,
    /// Hide the text entirely.
    Invisible,
    /// Clear some combination of attribute categories.
    Reset(Resets),
}

impl Color {
    /// A plain foreground color, no style attributes set.
    pub fn foreground(color: ColorValue) -> Self {
        Color::Foreground(Foreground {
            color: Some(color),
            ..Default::default()
        })
    }

    /// A background color.
    pub fn background(color: ColorValue) -> Self {
        Color::Background(color)
    }

    /// A single underline in `color`.
    pub fn underline(color: ColorValue) -> Self {
        Color::Underline(color)
    }

    /// A double underline in `color`.
    pub fn double_underline(color: ColorValue) -> Self {
        Color::DoubleUnderline(color)
    }

    /// A curly underline in `color`.
    pub fn curly_underline(color: ColorValue) -> Self {
        Color::CurlyUnderline(color)
    }

    /// A dotted underline in `color`.
    pub fn dotted_underline(color: ColorValue) -> Self {
        Color::DottedUnderline(color)
    }

    /// A dashed underline in `color`.
    pub fn dashed_underline(color: ColorValue) -> Self {
        Color::DashedUnderline(color)
    }

    /// A plain superscript in `color`, no style attributes set.
    pub fn superscript(color: ColorValue) -> Self {
        Color::Superscript(Foreground {
            color: Some(color),
            ..Default::default()
        })
    }

    /// A plain subscript in `color`, no style attributes set.
    pub fn subscript(color: ColorValue) -> Self {
        Color::Subscript(Foreground {
            color: Some(color),
            ..Default::default()
        })
    }

    /// Swap foreground and background.
    pub fn inverse() -> Self {
        Color::Inverse
    }

    /// Hide the text entirely.
    pub fn invisible() -> Self {
        Color::Invisible
    }

    /// A full reset (`\e[0m`).
    pub fn reset() -> Self {
        Color::Reset(default_resets())
    }

    /// Which stack this color belongs to in the terminal printer.
    pub fn class(&self) -> Class {
        match self {
            Color::Underline(_)
            | Color::DoubleUnderline(_)
            | Color::CurlyUnderline(_)
            | Color::DottedUnderline(_)
            | Color::DashedUnderline(_) => Class::Underline,
            Color::Background(_) => Class::Background,
            Color::Foreground(_) | Color::Superscript(_) | Color::Subscript(_) => {
                Class::Foreground
            }
            Color::Inverse | Color::Invisible | Color::Reset(_) => Class::Style,
        }
    }

    /// Bytes written when a mark of this color opens.
    pub fn on(&self) -> Vec<u8> {
        match self {
            Color::Underline(uc) => concat(csi("4"), uc.underline_on()),
            Color::DoubleUnderline(uc) => concat(csi("4:2"), uc.underline_on()),
            Color::CurlyUnderline(uc) => concat(csi("4:3"), uc.underline_on()),
            Color::DottedUnderline(uc) => concat(csi("4:4"), uc.underline_on()),
            Color::DashedUnderline(uc) => concat(csi("4:5"), uc.underline_on()),
            Color::Background(uc) => uc.bg_on(),
            Color::Foreground(fg) => fg.on_bytes(),
            Color::Superscript(fg) => concat(csi("73"), fg.on_bytes()),
            Color::Subscript(fg) => concat(csi("74"), fg.on_bytes()),
            Color::Inverse => csi("7"),
            Color::Invisible => csi("8"),
            Color::Reset(resets) => reset_on_bytes(*resets),
        }
    }

    /// Bytes written when a mark of this color closes.
    pub fn off(&self) -> Vec<u8> {
        match self {
            Color::Underline(_)
            | Color::DoubleUnderline(_)
            | Color::CurlyUnderline(_)
            | Color::DottedUnderline(_)
            | Color::DashedUnderline(_) => concat(csi("24"), csi("59")),
            Color::Background(_) => csi("49"),
            Color::Foreground(fg) => fg.off_bytes(),
            Color::Superscript(fg) => concat(csi("75"), fg.off_bytes()),
            Color::Subscript(fg) => concat(csi("75"), fg.off_bytes()),
            Color::Inverse => csi("27"),
            Color::Invisible => csi("28"),
            // a reset is an action, not a span; it has nothing to undo.
            Color::Reset(_) => Vec::new(),
        }
    }

    fn fg_mut(&mut self) -> &mut Foreground {
        match self {
            Color::Foreground(fg) | Color::Superscript(fg) | Color::Subscript(fg) => fg,
            _ => panic!("style modifiers apply only to foreground-class Color variants"),
        }
    }

    /// Set bold. Panics if `self` is not a foreground-class variant.
    pub fn bold(mut self) -> Self {
        self.fg_mut().bold = true;
        self
    }

    /// Set faint. Panics if `self` is not a foreground-class variant.
    pub fn faint(mut self) -> Self {
        self.fg_mut().faint = true;
        self
    }

    /// Set italic. Panics if `self` is not a foreground-class variant.
    pub fn italic(mut self) -> Self {
        self.fg_mut().italic = true;
        self
    }

    /// Set blink. Panics if `self` is not a foreground-class variant.
    pub fn blink(mut self) -> Self {
        self.fg_mut().blink = true;
        self
    }

    /// Set rapid blink. Panics if `self` is not a foreground-class variant.
    pub fn rapid_blink(mut self) -> Self {
        self.fg_mut().rapid_blink = true;
        self
    }

    /// Set strikethrough. Panics if `self` is not a foreground-class variant.
    pub fn strikethrough(mut self) -> Self {
        self.fg_mut().strikethrough = true;
        self
    }

    /// Set overline. Panics if `self` is not a foreground-class variant.
    pub fn overline(mut self) -> Self {
        self.fg_mut().overline = true;
        self
    }
}

fn concat(mut a: Vec<u8>, b: Vec<u8>) -> Vec<u8> {
    a.extend(b);
    a
}

/// A total function `K -> Color`, the color-table analogue of
/// [`crate::bookend::BookendTable`] used by [`crate::terminal::LinePrinter`].
pub trait ColorTable<K: MarkKind> {
    /// The color a mark of `kind` renders as.
    fn color(&self, kind: K) -> Color;
}

/// An array-backed [`ColorTable`], indexed by [`MarkKind::index`].
pub struct ColorArrayTable<K: MarkKind> {
    entries: Vec<Color>,
    _kind: PhantomData<K>,
}

impl<K: MarkKind> ColorArrayTable<K> {
    /// Panics if `entries.len() != K::COUNT`.
    pub fn new(entries: Vec<Color>) -> Self {
        assert_eq!(
            entries.len(),
            K::COUNT,
            "color table must have exactly one entry per mark kind"
        );
        Self {
            entries,
            _kind: PhantomData,
        }
    }
}

impl<K: MarkKind> ColorTable<K> for ColorArrayTable<K> {
    fn color(&self, kind: K) -> Color {
        self.entries[kind.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_foreground_on_off() {
        let c = Color::foreground(ColorValue::Basic(BasicColor::Red));
        assert_eq!(c.on(), b"\x1b[31m");
        assert_eq!(c.off(), b"\x1b[39m");
        assert_eq!(c.class(), Class::Foreground);
    }

    #[test]
    fn palette_background() {
        let c = Color::background(ColorValue::Palette(214));
        assert_eq!(c.on(), b"\x1b[48:5:214m");
        assert_eq!(c.off(), b"\x1b[49m");
        assert_eq!(c.class(), Class::Background);
    }

    #[test]
    fn rgb_foreground_with_bold() {
        let c = Color::foreground(ColorValue::Rgb(10, 20, 30)).bold();
        assert_eq!(c.on(), b"\x1b[38:2::10:20:30m\x1b[1m");
        assert_eq!(c.off(), b"\x1b[39m\x1b[22m");
    }

    #[test]
    fn double_underline_with_basic_color() {
        let c = Color::double_underline(ColorValue::Basic(BasicColor::Cyan));
        assert_eq!(c.on(), b"\x1b[4:2m\x1b[58:5:6m");
        assert_eq!(c.off(), b"\x1b[24m\x1b[59m");
        assert_eq!(c.class(), Class::Underline);
    }

    #[test]
    fn curly_underline_default_color() {
        let c = Color::curly_underline(ColorValue::Default);
        assert_eq!(c.on(), b"\x1b[4:3m\x1b[59m");
    }

    #[test]
    fn superscript_and_subscript() {
        let sup = Color::superscript(ColorValue::Basic(BasicColor::Green));
        assert_eq!(sup.on(), b"\x1b[73m\x1b[32m");
        assert_eq!(sup.off(), b"\x1b[75m\x1b[39m");

        let sub = Color::subscript(ColorValue::Default);
        assert_eq!(sub.on(), b"\x1b[74m");
        assert_eq!(sub.off(), b"\x1b[75m");
    }

    #[test]
    fn inverse_and_invisible() {
        assert_eq!(Color::inverse().on(), b"\x1b[7m");
        assert_eq!(Color::inverse().off(), b"\x1b[27m");
        assert_eq!(Color::invisible().on(), b"\x1b[8m");
        assert_eq!(Color::invisible().off(), b"\x1b[28m");
        assert_eq!(Color::inverse().class(), Class::Style);
    }

    #[test]
    fn full_reset_wins_over_other_bits() {
        let resets = ResetFlag::All | ResetFlag::Foreground;
        assert_eq!(Color::Reset(resets).on(), b"\x1b[0m");
        assert_eq!(Color::Reset(resets).off(), b"");
    }

    #[test]
    fn partial_reset_combines_bits() {
        let resets = ResetFlag::Foreground | ResetFlag::Underline;
        assert_eq!(Color::Reset(resets).on(), b"\x1b[39m\x1b[24m");
    }

    #[test]
    #[should_panic(expected = "foreground-class")]
    fn modifier_on_background_panics() {
        let _ = Color::background(ColorValue::Default).bold();
    }

    #[test]
    fn color_table_is_total_and_ordered_by_index() {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum K {
            Err,
            Warn,
        }
        impl MarkKind for K {
            const COUNT: usize = 2;
            fn index(self) -> usize {
                self as usize
            }
        }

        let table = ColorArrayTable::<K>::new(vec![
            Color::foreground(ColorValue::Basic(BasicColor::Red)),
            Color::foreground(ColorValue::Basic(BasicColor::Yellow)),
        ]);
        assert_eq!(table.color(K::Err).on(), b"\x1b[31m");
        assert_eq!(table.color(K::Warn).on(), b"\x1b[33m");
    }
}
