use embedded_graphics::{prelude::*, primitives::Rectangle};

use crate::aggregate::HOURS;

// ── Graph box margins ───────────────────────────────────────────────

pub const MARGIN_LEFT: i32 = 4;
/// Title row height, including the separator.
pub const MARGIN_TOP: i32 = 18;
pub const MARGIN_RIGHT: i32 = 4;
/// Hour label row height.
pub const MARGIN_BOTTOM: i32 = 12;

pub const TITLE_ROW_OFFSET: i32 = 6;
pub const LABEL_ROW_OFFSET: i32 = 2;

pub const BAR_SPACING: i32 = 3;
pub const MIN_BAR_WIDTH: i32 = 6;
pub const MARKER_RADIUS: u32 = 2;

/// Body area of a graph box: everything inside the margins.
pub fn body(bounds: &Rectangle) -> Rectangle {
    let w = bounds.size.width as i32 - MARGIN_LEFT - MARGIN_RIGHT;
    let h = bounds.size.height as i32 - MARGIN_TOP - MARGIN_BOTTOM;
    Rectangle::new(
        bounds.top_left + Point::new(MARGIN_LEFT, MARGIN_TOP),
        Size::new(w.max(0) as u32, h.max(0) as u32),
    )
}

/// Horizontal placement of the 24 bars inside a body of a given width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarLayout {
    pub x_start: i32,
    pub bar_width: i32,
    pub spacing: i32,
}

impl BarLayout {
    /// Spread 24 bars evenly with `BAR_SPACING` gaps (one at each edge). When
    /// that leaves bars narrower than `MIN_BAR_WIDTH`, bars are widened to the
    /// minimum and the gap shrinks to fit, never below 1. The row is then
    /// centred, which may push it past the body edges on very narrow boxes.
    pub fn fit(body_x: i32, body_w: i32) -> BarLayout {
        let n = HOURS as i32;
        let mut spacing = BAR_SPACING;
        let mut bar_width = (body_w - (n + 1) * spacing) / n;

        if bar_width < MIN_BAR_WIDTH {
            bar_width = MIN_BAR_WIDTH;
            spacing = ((body_w - bar_width * n) / (n + 1)).max(1);
        }

        let total = n * bar_width + (n - 1) * spacing;
        BarLayout {
            x_start: body_x + (body_w - total) / 2,
            bar_width,
            spacing,
        }
    }

    pub fn total_width(&self) -> i32 {
        let n = HOURS as i32;
        n * self.bar_width + (n - 1) * self.spacing
    }

    pub fn bar_x(&self, i: usize) -> i32 {
        self.x_start + i as i32 * (self.bar_width + self.spacing)
    }

    pub fn center_x(&self, i: usize) -> i32 {
        self.bar_x(i) + self.bar_width / 2
    }

    /// Half-size of the "no data" cross for this bar width.
    pub fn cross_half(&self) -> i32 {
        (self.bar_width / 2).clamp(4, 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_body_keeps_default_spacing() {
        let l = BarLayout::fit(9, 380);
        assert_eq!(l.bar_width, 12);
        assert_eq!(l.spacing, 3);
        assert_eq!(l.total_width(), 357);
        assert_eq!(l.x_start, 9 + 11);
        assert_eq!(l.bar_x(23) + l.bar_width, l.x_start + l.total_width());
    }

    #[test]
    fn narrow_body_clamps_bar_width_and_spacing() {
        let l = BarLayout::fit(0, 150);
        assert_eq!(l.bar_width, MIN_BAR_WIDTH);
        assert_eq!(l.spacing, 1);
        assert_eq!(l.total_width(), 167);
        assert_eq!(l.x_start, -8);
    }

    #[test]
    fn clamped_width_recomputes_spacing_when_room_allows() {
        // 180 - 75 leaves 4px bars; at 6px there is room for 1px gaps.
        let l = BarLayout::fit(0, 180);
        assert_eq!(l.bar_width, 6);
        assert_eq!(l.spacing, 1);
        let l = BarLayout::fit(0, 219);
        assert_eq!(l.bar_width, 6);
        assert_eq!(l.spacing, 3);
    }

    #[test]
    fn cross_size_is_bounded() {
        assert_eq!(BarLayout::fit(0, 150).cross_half(), 4);
        assert_eq!(BarLayout::fit(0, 380).cross_half(), 6);
        assert_eq!(BarLayout::fit(0, 1000).cross_half(), 8);
    }

    #[test]
    fn body_is_inside_margins() {
        let b = body(&Rectangle::new(Point::new(5, 32), Size::new(388, 86)));
        assert_eq!(b.top_left, Point::new(9, 50));
        assert_eq!(b.size, Size::new(380, 56));
    }
}
