use crate::site::{Reading, MAX_READINGS};

pub const HOURS: usize = 24;
pub const SAMPLES_PER_HOUR: usize = 12;

/// One hourly slot. `value` is only meaningful when `present` is set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HourlyBucket {
    pub value: f32,
    pub present: bool,
}

/// 24 hourly slots, oldest at index 0, current hour at index 23.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HourlySeries(pub [HourlyBucket; HOURS]);

impl HourlySeries {
    pub fn buckets(&self) -> &[HourlyBucket; HOURS] {
        &self.0
    }

    pub fn present_count(&self) -> usize {
        self.0.iter().filter(|b| b.present).count()
    }

    /// Value at the newest slot, whether or not it holds data.
    pub fn current(&self) -> f32 {
        self.0[HOURS - 1].value
    }

    pub fn present_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.0.iter().filter(|b| b.present).map(|b| b.value)
    }
}

/// Reading fields that can be plotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    SecondaryTemperature,
    Pressure,
}

impl Metric {
    pub fn select(self, r: &Reading) -> f32 {
        match self {
            Metric::Temperature => r.temperature,
            Metric::SecondaryTemperature => r.secondary_temperature,
            Metric::Pressure => r.pressure,
        }
    }
}

/// Average an **oldest-first** series into hourly slots.
///
/// Slots are positional: sample `i` belongs to group `i / 12`. Fewer than
/// 12 samples yields no data at all. A trailing short group is averaged
/// over what it has and takes the newest slot. Groups are written
/// right-aligned, so the newest group always lands in slot 23.
///
/// The number of present slots is `min(ceil(len / 12), 24)` once `len`
/// reaches 12, which equals `min(len / 12, 24)` for whole hours.
pub fn aggregate<F>(series: &[Reading], select: F) -> HourlySeries
where
    F: Fn(&Reading) -> f32,
{
    let mut out = HourlySeries::default();
    if series.len() < SAMPLES_PER_HOUR {
        return out;
    }

    let series = &series[series.len().saturating_sub(MAX_READINGS)..];
    let hours = series.len().div_ceil(SAMPLES_PER_HOUR).min(HOURS);
    let first = HOURS - hours;

    for (slot, group) in out.0[first..]
        .iter_mut()
        .zip(series.chunks(SAMPLES_PER_HOUR))
    {
        let sum: f32 = group.iter().map(&select).sum();
        *slot = HourlyBucket {
            value: sum / group.len() as f32,
            present: true,
        };
    }
    out
}

pub fn aggregate_metric(series: &[Reading], metric: Metric) -> HourlySeries {
    aggregate(series, |r| metric.select(r))
}
