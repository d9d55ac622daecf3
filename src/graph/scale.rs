use itertools::{Itertools, MinMaxResult};

use crate::aggregate::HourlySeries;

/// Vertical value range of a graph body. `max > min` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub min: f32,
    pub max: f32,
}

impl Scale {
    pub fn fixed(min: f32, max: f32) -> Scale {
        Scale { min, max }.widened()
    }

    /// Fit the range to the present slots, padded by half a unit and
    /// rounded outward. Absent slots never take part. With nothing
    /// present the `fallback` range is used.
    pub fn auto(series: &HourlySeries, fallback: (f32, f32)) -> Scale {
        let (lo, hi) = match series.present_values().filter(|v| v.is_finite()).minmax() {
            MinMaxResult::NoElements => return Scale::fixed(fallback.0, fallback.1),
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };
        Scale {
            min: (lo - 0.5).floor(),
            max: (hi + 0.5).ceil(),
        }
        .widened()
    }

    fn widened(self) -> Scale {
        if self.max <= self.min {
            Scale {
                min: self.min,
                max: self.min + 1.0,
            }
        } else {
            self
        }
    }

    /// Bar height in pixels for `value` in a body `body_h` tall. Values are
    /// clamped into range; anything strictly above `min` is at least 1px.
    pub fn bar_height(&self, value: f32, body_h: i32) -> i32 {
        let v = value.clamp(self.min, self.max);
        let h = ((v - self.min) / (self.max - self.min) * body_h as f32) as i32;
        if h < 1 && v > self.min {
            1
        } else {
            h
        }
    }
}
