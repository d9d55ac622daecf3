//! 24-bar hourly chart.
//!
//! A graph box is a double frame, a title row (`Max/Min`, title, current
//! value), a separator, the bar body and an hour label row. Bars are
//! indexed oldest (0) to current hour (23); labels count hours back from
//! now and are drawn under even indices only, so the current hour itself
//! carries no label.

pub mod layout;
pub mod scale;

use core::fmt::Write;

use embedded_graphics::{prelude::*, primitives::Rectangle};
use heapless::String;
use log::debug;

use crate::aggregate::{HourlySeries, HOURS};
use crate::canvas::{Canvas, Font};

pub use layout::BarLayout;
pub use scale::Scale;

/// One graph box to draw.
#[derive(Debug, Clone, Copy)]
pub struct Graph<'a> {
    pub bounds: Rectangle,
    pub title: &'a str,
    /// Range used when not auto-scaling, or when nothing is present.
    pub range: (f32, f32),
    pub auto_scale: bool,
}

impl Graph<'_> {
    pub fn scale(&self, series: &HourlySeries) -> Scale {
        if self.auto_scale {
            Scale::auto(series, self.range)
        } else {
            Scale::fixed(self.range.0, self.range.1)
        }
    }
}

/// Draw `graph` for `series`. `readings` is the raw sample count behind the
/// series; with none, only the frame and title row are drawn.
pub fn render<C: Canvas + ?Sized>(
    canvas: &mut C,
    graph: &Graph<'_>,
    series: &HourlySeries,
    readings: usize,
) -> Scale {
    let scale = if readings > 0 {
        graph.scale(series)
    } else {
        Scale::fixed(graph.range.0, graph.range.1)
    };

    draw_frame(canvas, graph, &scale, series.current());

    if readings == 0 {
        return scale;
    }

    let body = layout::body(&graph.bounds);
    let body_h = body.size.height as i32;
    let bars = BarLayout::fit(body.top_left.x, body.size.width as i32);
    let bottom = body.top_left.y + body_h;
    let mid_y = body.top_left.y + body_h / 2;
    let label_y = bottom + layout::LABEL_ROW_OFFSET;

    debug!(
        "graph {:?}: scale {:.1}..{:.1}, bar {}px gap {}px, {} present",
        graph.title,
        scale.min,
        scale.max,
        bars.bar_width,
        bars.spacing,
        series.present_count()
    );

    for (i, bucket) in series.buckets().iter().enumerate() {
        let x = bars.bar_x(i);
        let cx = bars.center_x(i);

        if bucket.present {
            let h = scale.bar_height(bucket.value, body_h);
            let top = bottom - h;
            if h > 0 {
                canvas.fill_rect(Rectangle::new(
                    Point::new(x, top),
                    Size::new(bars.bar_width as u32, h as u32),
                ));
            }
            if i == HOURS - 1 {
                let r = layout::MARKER_RADIUS;
                canvas.fill_circle(Point::new(cx, top - r as i32 - 1), r);
            }
        } else {
            let d = bars.cross_half();
            canvas.line(Point::new(cx - d, mid_y - d), Point::new(cx + d, mid_y + d));
            canvas.line(Point::new(cx - d, mid_y + d), Point::new(cx + d, mid_y - d));
        }

        if i % 2 == 0 {
            let mut label: String<4> = String::new();
            write!(label, "{}", HOURS - 1 - i).ok();
            let w = Font::Tiny.text_width(&label);
            canvas.text(Point::new(cx - w / 2, label_y), &label, Font::Tiny);
        }
    }

    scale
}

fn draw_frame<C: Canvas + ?Sized>(canvas: &mut C, graph: &Graph<'_>, scale: &Scale, current: f32) {
    let b = graph.bounds;
    let (x, y) = (b.top_left.x, b.top_left.y);
    let w = b.size.width as i32;

    canvas.stroke_rect(b);
    canvas.stroke_rect(Rectangle::new(
        b.top_left + Point::new(1, 1),
        b.size.saturating_sub(Size::new(2, 2)),
    ));

    let font = Font::Small;
    let text_y = y + layout::TITLE_ROW_OFFSET;

    let mut range: String<32> = String::new();
    write!(range, "Max:{:.1} Min:{:.1}", scale.max, scale.min).ok();
    canvas.text(Point::new(x + 4, text_y), &range, font);

    let title_x = x + (w - font.text_width(graph.title)) / 2;
    canvas.text(Point::new(title_x, text_y), graph.title, font);

    let mut now: String<16> = String::new();
    write!(now, "{:.1}", current).ok();
    canvas.text(Point::new(x + w - font.text_width(&now) - 4, text_y), &now, font);

    let sep_y = y + layout::MARGIN_TOP - 2;
    canvas.line(Point::new(x + 2, sep_y), Point::new(x + w - 3, sep_y));
}
