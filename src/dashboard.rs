use embedded_graphics::{prelude::*, primitives::Rectangle};

use crate::aggregate::{aggregate_metric, Metric};
use crate::canvas::{Canvas, Font};
use crate::clock::{short_date, short_time};
use crate::graph::{self, Graph};
use crate::site::Reading;

// ── Layout constants ────────────────────────────────────────────────

pub const HEADER_RULE_Y: i32 = 26;
pub const HEADER_MARGIN_X: i32 = 4;

pub const GRAPH_X: i32 = 5;
pub const GRAPH_TOP: i32 = 32;
pub const GRAPH_H: i32 = 86;
pub const GRAPH_SPACING: i32 = 4;
/// Total horizontal inset of a graph box.
pub const GRAPH_INSET_W: i32 = 12;

const BANNER_INSET_X: i32 = 40;
const BANNER_H: i32 = 40;

struct GraphDef {
    title: &'static str,
    metric: Metric,
    range: (f32, f32),
}

const GRAPHS: [GraphDef; 3] = [
    GraphDef {
        title: "Air Temp",
        metric: Metric::Temperature,
        range: (-10.0, 10.0),
    },
    GraphDef {
        title: "Water Temp",
        metric: Metric::SecondaryTemperature,
        range: (0.0, 10.0),
    },
    GraphDef {
        title: "Pressure",
        metric: Metric::Pressure,
        range: (0.0, 2.0),
    },
];

/// What the header row shows. `time`/`date` are full stamp strings and
/// are shortened for display.
#[derive(Debug, Clone, Copy)]
pub struct Header<'a> {
    pub site: &'a str,
    pub region: &'a str,
    pub time: &'a str,
    pub date: &'a str,
}

/// A site dashboard. `readings` must be oldest first.
#[derive(Debug, Clone, Copy)]
pub struct DashboardView<'a> {
    pub header: Header<'a>,
    pub readings: &'a [Reading],
}

pub fn draw_header<C: Canvas + ?Sized>(canvas: &mut C, header: &Header<'_>) {
    let w = canvas.width();

    let time_y = HEADER_RULE_Y - Font::Heading.height() - 3;
    canvas.text(
        Point::new(HEADER_MARGIN_X, time_y),
        short_time(header.time),
        Font::Heading,
    );

    let title = format!("{}, {}", header.site, header.region);
    canvas.text_centered(HEADER_RULE_Y - Font::Title.height() - 1, &title, Font::Title);

    let date = short_date(header.date);
    let date_x = w - Font::Heading.text_width(&date) - HEADER_MARGIN_X;
    canvas.text(Point::new(date_x, time_y), &date, Font::Heading);

    canvas.line(Point::new(0, HEADER_RULE_Y), Point::new(w - 1, HEADER_RULE_Y));
    canvas.line(
        Point::new(0, HEADER_RULE_Y + 2),
        Point::new(w - 1, HEADER_RULE_Y + 2),
    );
}

pub fn draw_dashboard<C: Canvas + ?Sized>(canvas: &mut C, view: &DashboardView<'_>) {
    canvas.clear();
    draw_header(canvas, &view.header);

    let width = (canvas.width() - GRAPH_INSET_W).max(0) as u32;
    for (i, def) in GRAPHS.iter().enumerate() {
        let y = GRAPH_TOP + i as i32 * (GRAPH_H + GRAPH_SPACING);
        let series = aggregate_metric(view.readings, def.metric);
        let g = Graph {
            bounds: Rectangle::new(Point::new(GRAPH_X, y), Size::new(width, GRAPH_H as u32)),
            title: def.title,
            range: def.range,
            auto_scale: true,
        };
        graph::render(canvas, &g, &series, view.readings.len());
    }
}

pub fn draw_no_data<C: Canvas + ?Sized>(canvas: &mut C, header: &Header<'_>) {
    canvas.clear();
    draw_header(canvas, header);
    canvas.text_centered(120, "Press button to", Font::Heading);
    canvas.text_centered(150, "fetch data", Font::Heading);
}

pub fn draw_wifi_error<C: Canvas + ?Sized>(canvas: &mut C, header: &Header<'_>, ssid: &str) {
    canvas.clear();
    draw_header(canvas, header);
    canvas.text_centered(100, "WiFi Error", Font::Heading);
    canvas.text_centered(135, "Connect to:", Font::Body);
    canvas.text_centered(160, ssid, Font::Heading);
}

/// Boxed one-line message over whatever is already drawn.
pub fn draw_error_banner<C: Canvas + ?Sized>(canvas: &mut C, message: &str) {
    let size = canvas.size();
    let (w, h) = (size.width as i32, size.height as i32);
    let outer = Rectangle::new(
        Point::new(BANNER_INSET_X, (h - BANNER_H) / 2),
        Size::new((w - 2 * BANNER_INSET_X).max(0) as u32, BANNER_H as u32),
    );
    canvas.erase_rect(outer);
    canvas.stroke_rect(outer);
    canvas.stroke_rect(Rectangle::new(
        outer.top_left + Point::new(2, 2),
        outer.size.saturating_sub(Size::new(4, 4)),
    ));
    let text_y = outer.top_left.y + (BANNER_H - Font::Heading.height()) / 2;
    canvas.text_centered(text_y, message, Font::Heading);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};

    fn header() -> Header<'static> {
        Header {
            site: "Likir",
            region: "Ladakh",
            time: "05:30:12",
            date: "Sun, 23. Nov 2025",
        }
    }

    #[test]
    fn header_shows_short_time_site_and_date() {
        let mut canvas = RecordingCanvas::new(400, 300);
        draw_header(&mut canvas, &header());
        assert!(canvas.has_text("05:30"));
        assert!(canvas.has_text("Likir, Ladakh"));
        assert!(canvas.has_text("23-Nov"));
        let rules: Vec<_> = canvas.lines().map(|(a, _)| a.y).collect();
        assert_eq!(rules, [26, 28]);
    }

    #[test]
    fn header_text_stays_above_rule() {
        let mut canvas = RecordingCanvas::new(400, 300);
        draw_header(&mut canvas, &header());
        for op in &canvas.ops {
            if let DrawOp::Text(at, _, font) = op {
                assert!(at.y >= 0);
                assert!(at.y + font.height() <= HEADER_RULE_Y);
            }
        }
    }

    #[test]
    fn dashboard_stacks_three_graphs() {
        let readings: Vec<Reading> = (0..288)
            .map(|i| Reading {
                temperature: i as f32 / 10.0,
                secondary_temperature: 4.0,
                pressure: 0.9,
                ..Default::default()
            })
            .collect();
        let mut canvas = RecordingCanvas::new(400, 300);
        draw_dashboard(
            &mut canvas,
            &DashboardView {
                header: header(),
                readings: &readings,
            },
        );
        assert_eq!(canvas.ops[0], DrawOp::Clear);
        for title in ["Air Temp", "Water Temp", "Pressure"] {
            assert!(canvas.has_text(title));
        }
        assert_eq!(canvas.filled_rects().count(), 3 * 24);
        assert_eq!(canvas.circles().count(), 3);

        let frames: Vec<_> = canvas
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::StrokeRect(r) if r.top_left.x == GRAPH_X => Some(r.top_left.y),
                _ => None,
            })
            .collect();
        assert_eq!(frames, [32, 122, 212]);
    }

    #[test]
    fn no_data_screen_prompts_for_fetch() {
        let mut canvas = RecordingCanvas::new(400, 300);
        draw_no_data(&mut canvas, &header());
        assert!(canvas.has_text("Press button to"));
        assert!(canvas.has_text("fetch data"));
        assert_eq!(canvas.filled_rects().count(), 0);
    }

    #[test]
    fn wifi_error_names_the_network() {
        let mut canvas = RecordingCanvas::new(400, 300);
        draw_wifi_error(&mut canvas, &header(), "field-ap");
        assert!(canvas.has_text("WiFi Error"));
        assert!(canvas.has_text("Connect to:"));
        assert!(canvas.has_text("field-ap"));
    }

    #[test]
    fn banner_draws_over_without_clearing() {
        let mut canvas = RecordingCanvas::new(400, 300);
        draw_error_banner(&mut canvas, "Fetch failed");
        assert!(!canvas.ops.contains(&DrawOp::Clear));
        assert!(matches!(canvas.ops[0], DrawOp::EraseRect(_)));
        assert!(canvas.has_text("Fetch failed"));
    }
}
