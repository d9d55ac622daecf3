use embedded_graphics::{
    mono_font::{
        ascii::{FONT_5X8, FONT_6X10, FONT_8X13},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use profont::{PROFONT_14_POINT, PROFONT_18_POINT};

/// Fonts available to screens. All are monospaced, so text width is
/// `chars * advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// Axis labels.
    Tiny,
    /// Graph header row.
    Small,
    Body,
    /// Header time and date, status messages.
    Heading,
    /// Site name in the header.
    Title,
}

impl Font {
    pub fn mono(self) -> &'static MonoFont<'static> {
        match self {
            Font::Tiny => &FONT_5X8,
            Font::Small => &FONT_6X10,
            Font::Body => &FONT_8X13,
            Font::Heading => &PROFONT_14_POINT,
            Font::Title => &PROFONT_18_POINT,
        }
    }

    pub fn advance(self) -> i32 {
        let f = self.mono();
        (f.character_size.width + f.character_spacing) as i32
    }

    pub fn height(self) -> i32 {
        self.mono().character_size.height as i32
    }

    pub fn text_width(self, text: &str) -> i32 {
        text.chars().count() as i32 * self.advance()
    }
}

/// Monochrome drawing primitives used by every screen. Ink is implied:
/// everything is drawn in the foreground colour on a cleared background.
/// Text is positioned by its top-left corner.
pub trait Canvas {
    fn size(&self) -> Size;
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: Rectangle);
    /// Reset `rect` to background.
    fn erase_rect(&mut self, rect: Rectangle);
    fn stroke_rect(&mut self, rect: Rectangle);
    fn line(&mut self, from: Point, to: Point);
    fn fill_circle(&mut self, center: Point, radius: u32);
    fn text(&mut self, at: Point, text: &str, font: Font);

    fn width(&self) -> i32 {
        self.size().width as i32
    }

    /// Draw `text` horizontally centred on the canvas.
    fn text_centered(&mut self, y: i32, text: &str, font: Font) {
        let x = (self.width() - font.text_width(text)) / 2;
        self.text(Point::new(x, y), text, font);
    }
}

// ── embedded-graphics adapter ───────────────────────────────────────

/// Canvas over any binary embedded-graphics target (the e-paper buffer,
/// a mock display in tests).
pub struct DrawTargetCanvas<D> {
    target: D,
}

impl<D> DrawTargetCanvas<D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    pub fn new(target: D) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn into_inner(self) -> D {
        self.target
    }
}

impl<D> Canvas for DrawTargetCanvas<D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    fn size(&self) -> Size {
        self.target.bounding_box().size
    }

    fn clear(&mut self) {
        self.target.clear(BinaryColor::Off).ok();
    }

    fn fill_rect(&mut self, rect: Rectangle) {
        rect.into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut self.target)
            .ok();
    }

    fn erase_rect(&mut self, rect: Rectangle) {
        rect.into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
            .draw(&mut self.target)
            .ok();
    }

    fn stroke_rect(&mut self, rect: Rectangle) {
        rect.into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut self.target)
            .ok();
    }

    fn line(&mut self, from: Point, to: Point) {
        Line::new(from, to)
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut self.target)
            .ok();
    }

    fn fill_circle(&mut self, center: Point, radius: u32) {
        Circle::with_center(center, radius * 2 + 1)
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut self.target)
            .ok();
    }

    fn text(&mut self, at: Point, text: &str, font: Font) {
        let style = MonoTextStyle::new(font.mono(), BinaryColor::On);
        Text::with_baseline(text, at, style, Baseline::Top)
            .draw(&mut self.target)
            .ok();
    }
}

// ── Recording canvas ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    FillRect(Rectangle),
    EraseRect(Rectangle),
    StrokeRect(Rectangle),
    Line(Point, Point),
    FillCircle(Point, u32),
    Text(Point, String, Font),
}

/// Canvas that keeps the primitive stream instead of pixels.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    size: Size,
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            ops: Vec::new(),
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(_, s, _) => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t == needle)
    }

    pub fn filled_rects(&self) -> impl Iterator<Item = &Rectangle> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::FillRect(r) => Some(r),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Line(a, b) => Some((*a, *b)),
            _ => None,
        })
    }

    pub fn circles(&self) -> impl Iterator<Item = (Point, u32)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::FillCircle(c, r) => Some((*c, *r)),
            _ => None,
        })
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn fill_rect(&mut self, rect: Rectangle) {
        self.ops.push(DrawOp::FillRect(rect));
    }

    fn erase_rect(&mut self, rect: Rectangle) {
        self.ops.push(DrawOp::EraseRect(rect));
    }

    fn stroke_rect(&mut self, rect: Rectangle) {
        self.ops.push(DrawOp::StrokeRect(rect));
    }

    fn line(&mut self, from: Point, to: Point) {
        self.ops.push(DrawOp::Line(from, to));
    }

    fn fill_circle(&mut self, center: Point, radius: u32) {
        self.ops.push(DrawOp::FillCircle(center, radius));
    }

    fn text(&mut self, at: Point, text: &str, font: Font) {
        self.ops.push(DrawOp::Text(at, text.into(), font));
    }
}
